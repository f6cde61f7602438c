// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Production stage transitions.
//!
//! Both transitions are pure: they take an order by reference and return
//! the resulting order. Persisting the result, and detecting concurrent
//! writers, is left to the caller.

use crate::error::CoreError;
use promo_ops_domain::{Order, StageCatalog, StageId};

/// The outcome of a `complete` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub order: Order,
    /// False when the stage had already been completed and nothing changed.
    pub changed: bool,
}

/// Derived production progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `completed / total`, in `[0, 1]`.
    pub ratio: f64,
    /// The ratio as a whole percentage, rounded half up.
    pub percent: u8,
}

fn invalid(order: &Order, catalog: &StageCatalog, requested: StageId, reason: &str) -> CoreError {
    CoreError::InvalidTransition {
        requested,
        current_stage: order.current_stage,
        stages_completed: catalog.sorted(&order.stages_completed),
        reason: reason.to_string(),
    }
}

/// Moves the order's current stage to `target`.
///
/// Completed stages are left untouched.
///
/// # Errors
///
/// Returns `CoreError::InvalidTransition` if the target is not in the
/// catalog, has already been completed, or lies before a completed stage.
pub fn advance(order: &Order, target: StageId, catalog: &StageCatalog) -> Result<Order, CoreError> {
    if !catalog.contains(target) {
        return Err(invalid(
            order,
            catalog,
            target,
            "stage is not part of the configured catalog",
        ));
    }
    if order.stages_completed.contains(&target) {
        return Err(invalid(
            order,
            catalog,
            target,
            "stage has already been completed",
        ));
    }
    if order
        .stages_completed
        .iter()
        .any(|done| catalog.is_after(*done, target))
    {
        return Err(invalid(
            order,
            catalog,
            target,
            "a later stage has already been completed",
        ));
    }

    let mut next: Order = order.clone();
    next.current_stage = target;
    Ok(next)
}

/// Marks `stage` complete and moves to the next catalog stage.
///
/// The current stage stays put when `stage` is the last one. Completing a
/// stage that is already complete returns the order unchanged.
///
/// # Errors
///
/// Returns `CoreError::InvalidTransition` if `stage` is neither the
/// current stage nor already complete.
pub fn complete(
    order: &Order,
    stage: StageId,
    catalog: &StageCatalog,
) -> Result<Completion, CoreError> {
    if order.stages_completed.contains(&stage)
        && (stage != order.current_stage || catalog.next_after(stage).is_none())
    {
        return Ok(Completion {
            order: order.clone(),
            changed: false,
        });
    }
    if stage != order.current_stage {
        return Err(invalid(
            order,
            catalog,
            stage,
            "only the current stage can be completed",
        ));
    }
    catalog.require(stage)?;

    let mut next: Order = order.clone();
    next.stages_completed.insert(stage);
    if let Some(following) = catalog.next_after(stage) {
        next.current_stage = following;
    }
    Ok(Completion {
        order: next,
        changed: true,
    })
}

/// Computes production progress against the catalog.
///
/// Completed stages that are not in the catalog are not counted.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress(order: &Order, catalog: &StageCatalog) -> Progress {
    let total: usize = catalog.len();
    let completed: usize = order
        .stages_completed
        .iter()
        .filter(|s| catalog.contains(**s))
        .count();
    if total == 0 {
        return Progress {
            completed,
            total,
            ratio: 0.0,
            percent: 0,
        };
    }
    let percent: usize = (completed * 100 + total / 2) / total;
    Progress {
        completed,
        total,
        ratio: completed as f64 / total as f64,
        percent: u8::try_from(percent).unwrap_or(100),
    }
}
