// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::ProductionCommand;
use crate::error::CoreError;
use crate::stage_machine::{Completion, advance, complete};
use crate::state::{PatchOutcome, ProductionPatch, ProductionTransition};
use promo_ops_audit::{Action, Actor, AuditEvent, Cause, OrderSnapshot};
use promo_ops_domain::{Order, StageCatalog, StageId};
use std::collections::BTreeSet;

fn audit_event(
    before: &Order,
    after: &Order,
    actor: Actor,
    cause: Cause,
    name: &str,
    details: String,
) -> AuditEvent {
    AuditEvent::new(
        before.order_id,
        actor,
        cause,
        Action::new(name.to_string(), Some(details)),
        OrderSnapshot::of(before),
        OrderSnapshot::of(after),
    )
}

/// Applies a single production command to an order.
///
/// # Arguments
///
/// * `order` - The order as last read from the store
/// * `catalog` - The configured stage catalog
/// * `command` - The step to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// The new order and, when the order changed, the audit event for the
/// step. Replaying a completion that already happened yields
/// `changed = false` and no event.
///
/// # Errors
///
/// Returns an error if the step violates the stage machine.
pub fn apply_production(
    order: &Order,
    catalog: &StageCatalog,
    command: ProductionCommand,
    actor: Actor,
    cause: Cause,
) -> Result<ProductionTransition, CoreError> {
    let (new_order, changed, details): (Order, bool, String) = match command {
        ProductionCommand::Advance { target } => {
            let next: Order = advance(order, target, catalog)?;
            let changed: bool = next.current_stage != order.current_stage;
            (
                next,
                changed,
                format!("Moved from '{}' to '{target}'", order.current_stage),
            )
        }
        ProductionCommand::Complete { stage } => {
            let Completion { order: next, changed } = complete(order, stage, catalog)?;
            let details: String = format!(
                "Completed '{stage}', current stage now '{}'",
                next.current_stage
            );
            (next, changed, details)
        }
    };

    new_order.validate_against(catalog)?;

    let audit_event: Option<AuditEvent> = changed.then(|| {
        audit_event(
            order,
            &new_order,
            actor,
            cause,
            command.action_name(),
            details,
        )
    });

    Ok(ProductionTransition {
        new_order,
        audit_event,
        changed,
    })
}

/// Applies a client production patch as a sequence of steps.
///
/// Newly completed stages are applied as completions in catalog order,
/// then a differing `current_stage` is applied as an advance, then any
/// stage data is merged.
///
/// # Errors
///
/// Returns `CoreError::InvalidTransition` if the patch drops a completed
/// stage or any individual step is rejected.
pub fn apply_production_patch(
    order: &Order,
    catalog: &StageCatalog,
    patch: ProductionPatch,
    actor: &Actor,
    cause: &Cause,
) -> Result<PatchOutcome, CoreError> {
    let mut working: Order = order.clone();
    let mut audit_events: Vec<AuditEvent> = Vec::new();

    if let Some(requested) = &patch.stages_completed {
        if let Some(removed) = order.stages_completed.difference(requested).next() {
            return Err(CoreError::InvalidTransition {
                requested: *removed,
                current_stage: order.current_stage,
                stages_completed: catalog.sorted(&order.stages_completed),
                reason: String::from("completed stages cannot be removed"),
            });
        }

        let added: BTreeSet<StageId> = requested
            .difference(&order.stages_completed)
            .copied()
            .collect();
        for stage in &added {
            if !catalog.contains(*stage) {
                return Err(CoreError::InvalidTransition {
                    requested: *stage,
                    current_stage: working.current_stage,
                    stages_completed: catalog.sorted(&working.stages_completed),
                    reason: String::from("stage is not part of the configured catalog"),
                });
            }
        }

        for stage in catalog.sorted(&added) {
            let step = apply_production(
                &working,
                catalog,
                ProductionCommand::Complete { stage },
                actor.clone(),
                cause.clone(),
            )?;
            audit_events.extend(step.audit_event);
            working = step.new_order;
        }
    }

    if let Some(target) = patch.current_stage.filter(|t| *t != working.current_stage) {
        let step = apply_production(
            &working,
            catalog,
            ProductionCommand::Advance { target },
            actor.clone(),
            cause.clone(),
        )?;
        audit_events.extend(step.audit_event);
        working = step.new_order;
    }

    if let Some(data) = patch.stage_data {
        let stage: StageId = data.stage();
        let before: Order = working.clone();
        working.set_stage_data(catalog, data)?;
        if working != before {
            audit_events.push(audit_event(
                &before,
                &working,
                actor.clone(),
                cause.clone(),
                "RecordStageData",
                format!("Recorded data for '{stage}'"),
            ));
        }
    }

    Ok(PatchOutcome {
        new_order: working,
        audit_events,
    })
}
