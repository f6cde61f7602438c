// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use promo_ops::CoreError;
use promo_ops_domain::{ApprovalStatus, DomainError};
use promo_ops_persistence::PersistenceError;

use crate::request_response::ProductionStateView;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The request is not permitted from the current state.
    InvalidTransition {
        /// A human-readable description of the rejection.
        message: String,
        /// The production state the request was checked against.
        current: Option<ProductionStateView>,
    },
    /// The state changed underneath the request; refetch and retry.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
        /// The refreshed production state, when the conflict is on an order.
        current: Option<ProductionStateView>,
    },
    /// The approval was decided before this request.
    AlreadyDecided {
        /// The status the approval already holds.
        status: ApprovalStatus,
        /// When it was decided.
        decided_at: Option<String>,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A collaborator (renderer, blob store, email gateway) failed.
    ExternalService {
        /// The collaborator that failed.
        service: String,
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidTransition { message, .. } => write!(f, "Invalid transition: {message}"),
            Self::Conflict { message, .. } => write!(f, "Conflict: {message}"),
            Self::AlreadyDecided { status, .. } => {
                write!(f, "Approval has already been {status}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::ExternalService { service, message } => {
                write!(f, "External service '{service}' failed: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub(crate) fn not_found(resource_type: &str, message: String) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message,
        }
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(message) => Self::ResourceNotFound {
                resource_type: String::from("Record"),
                message,
            },
            PersistenceError::DuplicateOrderNumber(number) => Self::DomainRuleViolation {
                rule: String::from("unique_order_number"),
                message: format!("Order number '{number}' already exists"),
            },
            PersistenceError::ForeignKeyViolation(message) => Self::InvalidInput {
                field: String::from("reference"),
                message,
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::UnknownStage(_) | DomainError::StageNotInCatalog(_) => {
            ApiError::invalid("stage", message)
        }
        DomainError::EmptyStageCatalog
        | DomainError::DuplicateStageId(_)
        | DomainError::DuplicateStageOrder { .. } => ApiError::invalid("stage_catalog", message),
        DomainError::StageBeyondCurrent { .. } => ApiError::InvalidTransition {
            message,
            current: None,
        },
        DomainError::StageDataMismatch { .. } => ApiError::invalid("stage_data", message),
        DomainError::InvalidOrderNumber(_) => ApiError::invalid("order_number", message),
        DomainError::InvalidOrderStatus(_) => ApiError::invalid("status", message),
        DomainError::InvalidStatusTransition { .. } => ApiError::InvalidTransition {
            message,
            current: None,
        },
        DomainError::InvalidSubjectType(_) => ApiError::invalid("subject_type", message),
        DomainError::InvalidSubjectId(_) => ApiError::invalid("subject_id", message),
        DomainError::InvalidApprovalStatus(_) => ApiError::Internal { message },
        DomainError::InvalidDecision(_) => ApiError::invalid("decision", message),
        DomainError::InvalidToken => ApiError::invalid("token", message),
        DomainError::InvalidEmail(_) => ApiError::invalid("email", message),
        DomainError::InvalidName(_) => ApiError::invalid("name", message),
        DomainError::InvalidDocumentType(_) => ApiError::invalid("document_type", message),
        DomainError::InvalidDocumentStatus(_) => ApiError::invalid("status", message),
        DomainError::VendorRequired
        | DomainError::VendorNotAllowed
        | DomainError::InvalidVendorId(_) => ApiError::invalid("vendor_id", message),
        DomainError::InvalidNotificationType(_) => ApiError::Internal { message },
        DomainError::InvalidAmount { field, .. } => ApiError::InvalidInput { field, message },
        DomainError::InvalidQuantity { .. } => ApiError::invalid("quantity", message),
        DomainError::UnknownLine(_) => ApiError::invalid("line_id", message),
        DomainError::DateParseError { .. } => ApiError::invalid("date", message),
    }
}

/// Translates a core error into an API error.
///
/// Rejected transitions carry the state they were checked against.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvalidTransition {
            requested,
            current_stage,
            stages_completed,
            reason,
        } => ApiError::InvalidTransition {
            message: format!("cannot move to '{requested}': {reason}"),
            current: Some(ProductionStateView {
                current_stage,
                stages_completed,
            }),
        },
    }
}
