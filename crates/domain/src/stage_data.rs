// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::stage::StageId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-stage metadata recorded on an order.
///
/// Each stage carries its own payload shape; the `stage` tag must match
/// the key the payload is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StageData {
    SalesBooked {
        booked_by: Option<String>,
    },
    PoPlaced {
        po_number: String,
    },
    ConfirmationReceived {
        confirmation_number: Option<String>,
        expected_ship_date: Option<String>,
    },
    ProofReceived {
        proof_ref: Option<String>,
        #[serde(default)]
        revision: u32,
    },
    ProofApproved {
        approval_token: Option<String>,
        approved_by: Option<String>,
    },
    OrderPlaced {
        vendor_order_number: Option<String>,
    },
    OrderShipped {
        carrier: Option<String>,
        tracking_number: Option<String>,
    },
    OrderDelivered {
        received_by: Option<String>,
    },
    Invoiced {
        invoice_number: String,
    },
}

impl StageData {
    /// The stage this payload belongs to.
    #[must_use]
    pub const fn stage(&self) -> StageId {
        match self {
            Self::SalesBooked { .. } => StageId::SalesBooked,
            Self::PoPlaced { .. } => StageId::PoPlaced,
            Self::ConfirmationReceived { .. } => StageId::ConfirmationReceived,
            Self::ProofReceived { .. } => StageId::ProofReceived,
            Self::ProofApproved { .. } => StageId::ProofApproved,
            Self::OrderPlaced { .. } => StageId::OrderPlaced,
            Self::OrderShipped { .. } => StageId::OrderShipped,
            Self::OrderDelivered { .. } => StageId::OrderDelivered,
            Self::Invoiced { .. } => StageId::Invoiced,
        }
    }
}

/// Validates that every payload in a stage data map sits under its own stage.
///
/// # Errors
///
/// Returns `DomainError::StageDataMismatch` for the first misplaced payload.
pub fn validate_stage_data(data: &BTreeMap<StageId, StageData>) -> Result<(), DomainError> {
    for (key, payload) in data {
        if payload.stage() != *key {
            return Err(DomainError::StageDataMismatch {
                key: *key,
                payload: payload.stage(),
            });
        }
    }
    Ok(())
}
