// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::stage::StageId;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A stage identifier is not one of the known stages.
    UnknownStage(String),
    /// A stage catalog must contain at least one stage.
    EmptyStageCatalog,
    /// The same stage appears twice in a catalog.
    DuplicateStageId(StageId),
    /// Two catalog entries share the same order rank.
    DuplicateStageOrder {
        /// The shared rank.
        order: i32,
        /// The first stage holding the rank.
        first: StageId,
        /// The second stage holding the rank.
        second: StageId,
    },
    /// A stage exists but is not part of the configured catalog.
    StageNotInCatalog(StageId),
    /// A completed stage lies beyond the order's current stage.
    StageBeyondCurrent {
        /// The completed stage.
        stage: StageId,
        /// The order's current stage.
        current: StageId,
    },
    /// A stage data payload was stored under a different stage key.
    StageDataMismatch {
        /// The key the payload was stored under.
        key: StageId,
        /// The stage the payload describes.
        payload: StageId,
    },
    /// Order number is empty or malformed.
    InvalidOrderNumber(String),
    /// Order status string is not recognized.
    InvalidOrderStatus(String),
    /// A status transition is not permitted by the lifecycle rules.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },
    /// Approval subject type is not recognized.
    InvalidSubjectType(String),
    /// Approval subject identifier is empty or malformed.
    InvalidSubjectId(String),
    /// Approval status string is not recognized.
    InvalidApprovalStatus(String),
    /// Approval decision is not `approved` or `declined`.
    InvalidDecision(String),
    /// Approval token is malformed.
    InvalidToken,
    /// Client email address is malformed.
    InvalidEmail(String),
    /// A required name is empty.
    InvalidName(String),
    /// Document type string is not recognized.
    InvalidDocumentType(String),
    /// Document status string is not recognized.
    InvalidDocumentStatus(String),
    /// A purchase order was requested without a vendor.
    VendorRequired,
    /// A quote was requested with a vendor.
    VendorNotAllowed,
    /// Vendor identifiers must be positive.
    InvalidVendorId(i64),
    /// Notification type string is not recognized.
    InvalidNotificationType(String),
    /// A monetary amount is negative or unparseable.
    InvalidAmount {
        /// The field holding the amount.
        field: String,
        /// The offending value.
        value: String,
    },
    /// A quantity is negative.
    InvalidQuantity {
        /// The line holding the quantity, if known.
        line_id: Option<i64>,
        /// The offending value.
        value: i64,
    },
    /// An edit references a line that is not part of the order.
    UnknownLine(i64),
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStage(id) => write!(f, "Unknown stage '{id}'"),
            Self::EmptyStageCatalog => write!(f, "Stage catalog must contain at least one stage"),
            Self::DuplicateStageId(id) => {
                write!(f, "Stage '{id}' appears more than once in the catalog")
            }
            Self::DuplicateStageOrder {
                order,
                first,
                second,
            } => write!(
                f,
                "Stages '{first}' and '{second}' share catalog order {order}"
            ),
            Self::StageNotInCatalog(id) => {
                write!(f, "Stage '{id}' is not part of the configured catalog")
            }
            Self::StageBeyondCurrent { stage, current } => write!(
                f,
                "Stage '{stage}' is marked complete but lies beyond current stage '{current}'"
            ),
            Self::StageDataMismatch { key, payload } => write!(
                f,
                "Stage data for '{payload}' cannot be stored under stage '{key}'"
            ),
            Self::InvalidOrderNumber(msg) => write!(f, "Invalid order number: {msg}"),
            Self::InvalidOrderStatus(status) => write!(f, "Invalid order status: '{status}'"),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid status transition from '{from}' to '{to}': {reason}")
            }
            Self::InvalidSubjectType(value) => write!(f, "Invalid approval subject type: '{value}'"),
            Self::InvalidSubjectId(msg) => write!(f, "Invalid approval subject id: {msg}"),
            Self::InvalidApprovalStatus(value) => write!(f, "Invalid approval status: '{value}'"),
            Self::InvalidDecision(value) => write!(
                f,
                "Invalid decision '{value}'. Must be 'approved' or 'declined'"
            ),
            Self::InvalidToken => write!(f, "Malformed approval token"),
            Self::InvalidEmail(value) => write!(f, "Invalid email address: '{value}'"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidDocumentType(value) => write!(f, "Invalid document type: '{value}'"),
            Self::InvalidDocumentStatus(value) => write!(f, "Invalid document status: '{value}'"),
            Self::VendorRequired => write!(f, "A purchase order requires a vendor"),
            Self::VendorNotAllowed => write!(f, "A quote cannot be generated for a vendor"),
            Self::InvalidVendorId(id) => write!(f, "Invalid vendor id {id}. Must be positive"),
            Self::InvalidNotificationType(value) => {
                write!(f, "Invalid notification type: '{value}'")
            }
            Self::InvalidAmount { field, value } => {
                write!(f, "Invalid amount for '{field}': '{value}'")
            }
            Self::InvalidQuantity { line_id, value } => match line_id {
                Some(id) => write!(f, "Invalid quantity {value} on line {id}"),
                None => write!(f, "Invalid quantity {value}"),
            },
            Self::UnknownLine(id) => write!(f, "Line {id} is not part of the order"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
