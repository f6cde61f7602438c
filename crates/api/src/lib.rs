// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request-level workflows of the order lifecycle core.
//!
//! - `production`: order creation, production steps and patches, status
//!   and follow-up changes
//! - `approvals`: the token-based `ApprovalWorkflow`
//! - `documents`: the quote/purchase order `DocumentLifecycle`
//! - `notifications`: the `NotificationScheduler` and notification inbox
//!
//! Lower-layer errors are translated into `ApiError` here and never leak
//! to the HTTP boundary.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::multiple_crate_versions)]

use promo_ops_persistence::Persistence;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub mod approvals;
pub mod collaborators;
pub mod documents;
mod error;
pub mod notifications;
pub mod production;
mod request_response;

#[cfg(test)]
mod tests;

pub use approvals::ApprovalWorkflow;
pub use collaborators::{
    BlobStore, CollaboratorError, DocumentContent, DocumentRenderer, EmailGateway, EmailMessage,
    FilesystemBlobStore, JsonSnapshotRenderer, TracingEmailGateway,
};
pub use documents::DocumentLifecycle;
pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use notifications::{NotificationScheduler, SchedulerConfig};
pub use request_response::{
    ActivityInfo, AdvanceStageRequest, ApprovalInfo, CompleteStageRequest, CreateOrderRequest,
    CreateUserRequest, DecideApprovalRequest, DispatchReport, DocumentInfo,
    GenerateDocumentRequest, IssueApprovalRequest, IssueApprovalResponse, NotificationInfo,
    OrderLineInfo, OrderLineInput, OrderResponse, ProductionPatchRequest, ProductionStateView,
    ProgressView, RegenerateDocumentRequest, TickOutcome, UpdateDocumentStatusRequest,
    UpdateNextActionRequest, UpdateStatusRequest, UserInfo,
};

/// The store, shared between request handlers and the scheduler.
pub type SharedPersistence = Arc<tokio::sync::Mutex<Persistence>>;

/// Formats a timestamp the way it is stored and returned.
pub(crate) fn rfc3339(at: OffsetDateTime) -> Result<String, ApiError> {
    at.format(&Rfc3339).map_err(|e| ApiError::Internal {
        message: format!("Failed to format timestamp: {e}"),
    })
}
