// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::Order;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use time::Date;

/// The kind of in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// An order's next action falls due today.
    NextActionDue,
}

impl NotificationType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NextActionDue => "next_action_due",
        }
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next_action_due" => Ok(Self::NextActionDue),
            _ => Err(DomainError::InvalidNotificationType(s.to_string())),
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An in-app notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub notification_id: Option<i64>,
    pub recipient_id: i64,
    pub order_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    /// The calendar day the notification was dispatched for.
    pub dispatch_date: Date,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Returns true if the order's next action falls on `today`.
#[must_use]
pub fn is_next_action_due(order: &Order, today: Date) -> bool {
    order.next_action_date == Some(today)
}

/// The users to notify about an order's next action.
///
/// A user holding both the assignee and production manager roles is
/// returned once.
#[must_use]
pub fn next_action_recipients(order: &Order) -> BTreeSet<i64> {
    [order.assigned_user_id, order.production_manager_id]
        .into_iter()
        .flatten()
        .collect()
}

/// Builds the title and body of a next-action notification.
#[must_use]
pub fn next_action_message(order: &Order) -> (String, String) {
    let title: String = format!("Next action due for order {}", order.order_number);
    let message: String = match order.next_action_notes.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => notes.to_string(),
        _ => format!(
            "Order {} has a follow-up scheduled for today.",
            order.order_number
        ),
    };
    (title, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageCatalog;
    use crate::types::OrderNumber;
    use time::macros::date;

    fn order() -> Order {
        Order::new(
            OrderNumber::new("SO-7").unwrap(),
            &StageCatalog::standard(),
        )
    }

    #[test]
    fn test_recipient_holding_both_roles_counted_once() {
        let mut o = order();
        o.assigned_user_id = Some(11);
        o.production_manager_id = Some(11);
        o.csr_user_id = Some(12);
        assert_eq!(next_action_recipients(&o), BTreeSet::from([11]));
    }

    #[test]
    fn test_due_is_date_only() {
        let mut o = order();
        assert!(!is_next_action_due(&o, date!(2026 - 03 - 04)));
        o.next_action_date = Some(date!(2026 - 03 - 04));
        assert!(is_next_action_due(&o, date!(2026 - 03 - 04)));
        assert!(!is_next_action_due(&o, date!(2026 - 03 - 05)));
    }

    #[test]
    fn test_message_prefers_notes() {
        let mut o = order();
        let (title, message) = next_action_message(&o);
        assert_eq!(title, "Next action due for order SO-7");
        assert!(message.contains("SO-7"));

        o.next_action_notes = Some(String::from("Call the vendor about proofs"));
        assert_eq!(next_action_message(&o).1, "Call the vendor about proofs");
    }
}
