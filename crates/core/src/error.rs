// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use promo_ops_domain::{DomainError, StageId};

/// Errors that can occur during production transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The requested step is not permitted from the order's current state.
    InvalidTransition {
        /// The stage the step targeted.
        requested: StageId,
        /// The order's current stage when the step was rejected.
        current_stage: StageId,
        /// The order's completed stages, in catalog order.
        stages_completed: Vec<StageId>,
        /// Why the step was rejected.
        reason: String,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::InvalidTransition {
                requested,
                current_stage,
                reason,
                ..
            } => write!(
                f,
                "Invalid transition to '{requested}' from current stage '{current_stage}': {reason}"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
