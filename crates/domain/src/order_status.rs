// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commercial order status and transition logic.
//!
//! Status is independent of the production stage: it records where the
//! order stands commercially, while the stage records production work.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Commercial status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order was entered as a quote
    #[default]
    Quote,
    /// Quote was sent and awaits the client's decision
    PendingApproval,
    /// Client approved the quote
    Approved,
    /// Vendors are producing the goods
    InProduction,
    /// Goods left the vendor
    Shipped,
    /// Goods reached the client
    Delivered,
    /// Order was abandoned
    Cancelled,
}

impl OrderStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::InProduction => "in_production",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            Self::Quote => matches!(new_status, Self::PendingApproval | Self::Cancelled),
            Self::PendingApproval => matches!(
                new_status,
                Self::Approved | Self::Quote | Self::Cancelled
            ),
            Self::Approved => matches!(new_status, Self::InProduction | Self::Cancelled),
            Self::InProduction => matches!(new_status, Self::Shipped | Self::Cancelled),
            Self::Shipped => matches!(new_status, Self::Delivered),
            Self::Delivered | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by order lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quote" => Ok(Self::Quote),
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "in_production" => Ok(Self::InProduction),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidOrderStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 7] = [
        OrderStatus::Quote,
        OrderStatus::PendingApproval,
        OrderStatus::Approved,
        OrderStatus::InProduction,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn test_status_string_round_trip() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("draft".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            OrderStatus::Quote,
            OrderStatus::PendingApproval,
            OrderStatus::Approved,
            OrderStatus::InProduction,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].validate_transition(pair[1]).is_ok(), "{pair:?}");
        }
    }

    #[test]
    fn test_declined_quote_returns_to_quote() {
        assert!(
            OrderStatus::PendingApproval
                .validate_transition(OrderStatus::Quote)
                .is_ok()
        );
    }

    #[test]
    fn test_shipped_order_cannot_be_cancelled() {
        assert!(
            OrderStatus::Shipped
                .validate_transition(OrderStatus::Cancelled)
                .is_err()
        );
    }

    #[test]
    fn test_no_transitions_from_terminal_states() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            for target in ALL {
                assert!(terminal.validate_transition(target).is_err());
            }
        }
    }

    #[test]
    fn test_skipping_approval_rejected() {
        let err = OrderStatus::Quote
            .validate_transition(OrderStatus::InProduction)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatusTransition { .. }));
    }
}
