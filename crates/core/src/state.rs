// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use promo_ops_audit::AuditEvent;
use promo_ops_domain::{Order, StageData, StageId};
use std::collections::BTreeSet;

/// The result of applying one production command.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionTransition {
    /// The order after the transition.
    pub new_order: Order,
    /// The audit event recording this transition. Present only when the
    /// order changed.
    pub audit_event: Option<AuditEvent>,
    pub changed: bool,
}

/// A requested production update, as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionPatch {
    pub current_stage: Option<StageId>,
    /// The full completed set the client wants to see.
    pub stages_completed: Option<BTreeSet<StageId>>,
    pub stage_data: Option<StageData>,
}

/// The result of applying a production patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub new_order: Order,
    /// One event per applied step, in application order.
    pub audit_events: Vec<AuditEvent>,
}

impl PatchOutcome {
    /// Returns true if any step or stage data changed the order.
    #[must_use]
    pub fn changed(&self, original: &Order) -> bool {
        !self.audit_events.is_empty() || self.new_order != *original
    }
}
