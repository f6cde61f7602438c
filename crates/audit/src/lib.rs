// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

//! Order activity records.
//!
//! Every applied production step produces exactly one [`AuditEvent`],
//! which the store appends to the order's activity log. Events are never
//! updated once written.

use promo_ops_domain::{Order, StageId};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Represents the entity performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (`user` or `system`).
    pub actor_type: String,
}

impl Actor {
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// An actor acting through the HTTP API.
    #[must_use]
    pub fn user(id: &str) -> Self {
        Self::new(id.to_string(), String::from("user"))
    }

    /// A background process such as the notification scheduler.
    #[must_use]
    pub fn system(name: &str) -> Self {
        Self::new(name.to_string(), String::from("system"))
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, event ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`CompleteStage`", "`AdvanceStage`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The production-relevant state of an order at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub status: String,
    pub current_stage: StageId,
    /// Completed stages, in identifier order.
    pub stages_completed: Vec<StageId>,
}

impl OrderSnapshot {
    #[must_use]
    pub fn of(order: &Order) -> Self {
        Self {
            status: order.status.as_str().to_string(),
            current_stage: order.current_stage,
            stages_completed: order.stages_completed.iter().copied().collect(),
        }
    }

    /// The JSON form stored in the activity log.
    #[must_use]
    pub fn to_json(&self) -> String {
        // A struct of strings and unit enums always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// An immutable audit event representing a state transition.
///
/// Audit events capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The order state before and after the transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// The order the event belongs to, once persisted.
    pub order_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: OrderSnapshot,
    pub after: OrderSnapshot,
}

impl AuditEvent {
    #[must_use]
    pub const fn new(
        order_id: Option<i64>,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: OrderSnapshot,
        after: OrderSnapshot,
    ) -> Self {
        Self {
            order_id,
            actor,
            cause,
            action,
            before,
            after,
        }
    }
}
