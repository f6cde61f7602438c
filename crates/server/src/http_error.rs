// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mapping of `ApiError` onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use promo_ops_api::{ApiError, ProductionStateView};
use promo_ops_domain::ApprovalStatus;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error indicator.
    pub error: bool,
    /// Machine-readable error kind.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// The offending input field, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field: Option<String>,
    /// The production state the request ran into.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current: Option<ProductionStateView>,
    /// The recorded outcome of an already decided approval.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub decided_at: Option<String>,
}

impl ErrorResponse {
    fn new(kind: &str, message: String) -> Self {
        Self {
            error: true,
            kind: kind.to_string(),
            message,
            field: None,
            current: None,
            approval_status: None,
            decided_at: None,
        }
    }
}

/// HTTP error wrapper that implements `IntoResponse`.
pub struct HttpError {
    /// The HTTP status code.
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let message: String = err.to_string();
        match err {
            ApiError::InvalidInput { field, .. } => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorResponse {
                    field: Some(field),
                    ..ErrorResponse::new("invalid_input", message)
                },
            },
            ApiError::DomainRuleViolation { .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: ErrorResponse::new("domain_rule_violation", message),
            },
            ApiError::InvalidTransition { current, .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: ErrorResponse {
                    current,
                    ..ErrorResponse::new("invalid_transition", message)
                },
            },
            ApiError::Conflict { current, .. } => Self {
                status: StatusCode::CONFLICT,
                body: ErrorResponse {
                    current,
                    ..ErrorResponse::new("conflict", message)
                },
            },
            ApiError::AlreadyDecided { status, decided_at } => Self {
                status: StatusCode::CONFLICT,
                body: ErrorResponse {
                    approval_status: Some(status),
                    decided_at,
                    ..ErrorResponse::new("already_decided", message)
                },
            },
            ApiError::ResourceNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                body: ErrorResponse::new("not_found", message),
            },
            ApiError::ExternalService { ref service, .. } => {
                error!(service = %service, error = %message, "External service failed");
                Self {
                    status: StatusCode::BAD_GATEWAY,
                    body: ErrorResponse::new("external_service", message),
                }
            }
            ApiError::Internal { .. } => {
                error!(error = %message, "Internal error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorResponse::new("internal", message),
                }
            }
        }
    }
}
