// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Wire names are camelCase. Requests carry raw strings where the value
//! is parsed into a domain type by the workflow, so parse failures surface
//! as field-level `InvalidInput` errors.

use promo_ops::{Progress, progress};
use promo_ops_audit::{AuditEvent, OrderSnapshot};
use promo_ops_domain::{
    Approval, ApprovalStatus, DocumentMetadata, DocumentStatus, DocumentType, GeneratedDocument,
    LineEdit, Notification, NotificationType, Order, OrderLine, OrderStatus, StageCatalog,
    StageData, StageId, SubjectType,
};
use promo_ops_persistence::{ActivityRecord, UserRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;
use time::macros::format_description;

fn format_day(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

// ============================================================================
// Orders and production
// ============================================================================

/// The production pair of an order, completed stages in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionStateView {
    pub current_stage: StageId,
    pub stages_completed: Vec<StageId>,
}

impl ProductionStateView {
    #[must_use]
    pub fn of(order: &Order, catalog: &StageCatalog) -> Self {
        Self {
            current_stage: order.current_stage,
            stages_completed: catalog.sorted(&order.stages_completed),
        }
    }
}

/// Production progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub completed: usize,
    pub total: usize,
    pub ratio: f64,
    pub percent: u8,
}

impl From<Progress> for ProgressView {
    fn from(p: Progress) -> Self {
        Self {
            completed: p.completed,
            total: p.total,
            ratio: p.ratio,
            percent: p.percent,
        }
    }
}

/// One order line as submitted with a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub vendor_id: Option<i64>,
    pub description: String,
    pub quantity: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
}

/// API request to create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_number: String,
    #[serde(default)]
    pub lines: Vec<OrderLineInput>,
    /// `YYYY-MM-DD`.
    pub next_action_date: Option<String>,
    pub next_action_notes: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub production_manager_id: Option<i64>,
    pub csr_user_id: Option<i64>,
}

/// API request to replace an order's follow-up fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNextActionRequest {
    /// `YYYY-MM-DD`, or absent to clear.
    pub next_action_date: Option<String>,
    pub next_action_notes: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub production_manager_id: Option<i64>,
    pub csr_user_id: Option<i64>,
}

/// API request to patch an order's production state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPatchRequest {
    pub current_stage: Option<StageId>,
    pub stages_completed: Option<Vec<StageId>>,
    pub stage_data: Option<StageData>,
}

/// API request to complete a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteStageRequest {
    pub stage: StageId,
}

/// API request to move an order to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceStageRequest {
    pub target_stage: StageId,
}

/// API request to change an order's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// An order line as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInfo {
    pub line_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub description: String,
    pub quantity: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
}

impl From<OrderLine> for OrderLineInfo {
    fn from(line: OrderLine) -> Self {
        Self {
            line_id: line.line_id,
            vendor_id: line.vendor_id,
            description: line.description,
            quantity: line.quantity,
            unit_price: line.unit_price,
            unit_cost: line.unit_cost,
        }
    }
}

/// An order as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: Option<i64>,
    pub order_number: String,
    pub status: OrderStatus,
    pub current_stage: StageId,
    /// Completed stages in catalog order.
    pub stages_completed: Vec<StageId>,
    pub stage_data: BTreeMap<StageId, StageData>,
    pub progress: ProgressView,
    pub next_action_date: Option<String>,
    pub next_action_notes: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub production_manager_id: Option<i64>,
    pub csr_user_id: Option<i64>,
    /// Present on single-order reads.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lines: Option<Vec<OrderLineInfo>>,
}

impl OrderResponse {
    #[must_use]
    pub fn of(order: &Order, catalog: &StageCatalog) -> Self {
        Self {
            order_id: order.order_id,
            order_number: order.order_number.value().to_string(),
            status: order.status,
            current_stage: order.current_stage,
            stages_completed: catalog.sorted(&order.stages_completed),
            stage_data: order.stage_data.clone(),
            progress: progress(order, catalog).into(),
            next_action_date: order.next_action_date.map(format_day),
            next_action_notes: order.next_action_notes.clone(),
            assigned_user_id: order.assigned_user_id,
            production_manager_id: order.production_manager_id,
            csr_user_id: order.csr_user_id,
            lines: None,
        }
    }

    #[must_use]
    pub fn with_lines(mut self, lines: Vec<OrderLine>) -> Self {
        self.lines = Some(lines.into_iter().map(OrderLineInfo::from).collect());
        self
    }
}

/// One entry of an order's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInfo {
    pub activity_id: i64,
    pub created_at: String,
    pub actor_id: String,
    pub actor_type: String,
    pub cause: String,
    pub action: String,
    pub details: Option<String>,
    pub before: OrderSnapshot,
    pub after: OrderSnapshot,
}

impl From<ActivityRecord> for ActivityInfo {
    fn from(record: ActivityRecord) -> Self {
        let AuditEvent {
            actor,
            cause,
            action,
            before,
            after,
            ..
        } = record.event;
        Self {
            activity_id: record.activity_id,
            created_at: record.created_at,
            actor_id: actor.id,
            actor_type: actor.actor_type,
            cause: cause.description,
            action: action.name,
            details: action.details,
            before,
            after,
        }
    }
}

/// API request to add a user to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
}

/// A directory user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
}

impl From<UserRecord> for UserInfo {
    fn from(user: UserRecord) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Approvals
// ============================================================================

/// API request to issue an approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueApprovalRequest {
    pub subject_type: String,
    pub subject_id: String,
    pub client_email: String,
    pub client_name: String,
}

/// API request to decide an approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideApprovalRequest {
    pub decision: String,
    pub notes: Option<String>,
}

/// An approval as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalInfo {
    pub approval_id: Option<i64>,
    pub token: String,
    pub status: ApprovalStatus,
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub client_email: String,
    pub client_name: String,
    pub sent_at: String,
    pub decided_at: Option<String>,
    pub decision_notes: Option<String>,
}

impl From<Approval> for ApprovalInfo {
    fn from(approval: Approval) -> Self {
        Self {
            approval_id: approval.approval_id,
            token: approval.token.as_str().to_string(),
            status: approval.status,
            subject_type: approval.subject.subject_type(),
            subject_id: approval.subject.subject_id().to_string(),
            client_email: approval.client_email,
            client_name: approval.client_name,
            sent_at: approval.sent_at,
            decided_at: approval.decided_at,
            decision_notes: approval.decision_notes,
        }
    }
}

/// API response for an issue request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueApprovalResponse {
    pub token: String,
    pub status: ApprovalStatus,
    /// False when an already pending approval was returned.
    pub created: bool,
    pub approval: ApprovalInfo,
    /// Set when the approval email could not be sent.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email_warning: Option<String>,
}

// ============================================================================
// Documents
// ============================================================================

/// API request to materialize a document for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentRequest {
    pub document_type: String,
    pub vendor_id: Option<i64>,
    #[serde(default)]
    pub edits: Vec<LineEdit>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
}

/// API request to regenerate a document from current order data.
///
/// Discount and tax default to the values stored on the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateDocumentRequest {
    #[serde(default)]
    pub edits: Vec<LineEdit>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
}

/// API request to change a document's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentStatusRequest {
    pub status: String,
}

/// A generated document as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub document_id: Option<i64>,
    pub order_id: i64,
    pub document_type: DocumentType,
    pub vendor_id: Option<i64>,
    pub document_number: String,
    pub status: DocumentStatus,
    pub file_ref: String,
    pub metadata: DocumentMetadata,
    pub created_at: String,
}

impl From<GeneratedDocument> for DocumentInfo {
    fn from(document: GeneratedDocument) -> Self {
        Self {
            document_id: document.document_id,
            order_id: document.key.order_id,
            document_type: document.key.document_type,
            vendor_id: document.key.vendor_id,
            document_number: document.document_number,
            status: document.status,
            file_ref: document.file_ref,
            metadata: document.metadata,
            created_at: document.created_at,
        }
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// A notification as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInfo {
    pub notification_id: Option<i64>,
    pub recipient_id: i64,
    pub order_id: i64,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub dispatch_date: String,
    pub created_at: String,
}

impl From<Notification> for NotificationInfo {
    fn from(n: Notification) -> Self {
        Self {
            notification_id: n.notification_id,
            recipient_id: n.recipient_id,
            order_id: n.order_id,
            notification_type: n.notification_type,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            dispatch_date: format_day(n.dispatch_date),
            created_at: n.created_at,
        }
    }
}

/// Per-tick summary of the notification scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub orders_scanned: usize,
    pub notifications_created: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    /// Recipients already notified for the day.
    pub recipients_skipped: usize,
    /// Orders abandoned after exceeding the per-order budget.
    pub orders_timed_out: usize,
}

/// The outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    Completed { report: DispatchReport },
    /// Another tick was still running.
    Skipped,
}
