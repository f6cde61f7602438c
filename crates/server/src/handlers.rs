// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route handlers.
//!
//! Handlers parse the request, take what they need from `AppState`, and
//! delegate to the workflows in `promo_ops_api`. They hold no logic of
//! their own beyond choosing the status code.

use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
};
use promo_ops::ProductionCommand;
use promo_ops_api::{
    ActivityInfo, AdvanceStageRequest, ApprovalInfo, CompleteStageRequest, CreateOrderRequest,
    CreateUserRequest, DecideApprovalRequest, DocumentInfo, GenerateDocumentRequest,
    IssueApprovalRequest, IssueApprovalResponse, NotificationInfo, OrderResponse,
    ProductionPatchRequest, RegenerateDocumentRequest, TickOutcome, UpdateDocumentStatusRequest,
    UpdateNextActionRequest, UpdateStatusRequest, UserInfo, notifications, production,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::info;

use crate::AppState;
use crate::actor::RequestActor;
use crate::http_error::HttpError;

/// Query parameters for an approval history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalHistoryQuery {
    pub subject_type: String,
    pub subject_id: String,
}

/// Query parameters for a notification inbox.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsQuery {
    pub recipient_id: i64,
    #[serde(default)]
    pub unread_only: bool,
}

// ============================================================================
// Approvals
// ============================================================================

/// Handler for POST `/approvals`.
///
/// Returns 201 for a new approval and 200 when the subject's pending
/// approval is returned instead.
pub async fn handle_issue_approval(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<IssueApprovalRequest>,
) -> Result<(StatusCode, Json<IssueApprovalResponse>), HttpError> {
    info!(
        subject_type = %req.subject_type,
        subject_id = %req.subject_id,
        "Handling issue_approval request"
    );
    let response: IssueApprovalResponse = app_state.approvals.issue(&req).await?;
    let status: StatusCode = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

/// Handler for GET `/approvals`.
pub async fn handle_list_approvals(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ApprovalHistoryQuery>,
) -> Result<Json<Vec<ApprovalInfo>>, HttpError> {
    let history: Vec<ApprovalInfo> = app_state
        .approvals
        .history(&query.subject_type, &query.subject_id)
        .await?;
    Ok(Json(history))
}

/// Handler for GET `/approvals/{token}`.
pub async fn handle_get_approval(
    AxumState(app_state): AxumState<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ApprovalInfo>, HttpError> {
    Ok(Json(app_state.approvals.get(&token).await?))
}

/// Handler for PATCH `/approvals/{token}`.
pub async fn handle_decide_approval(
    AxumState(app_state): AxumState<AppState>,
    Path(token): Path<String>,
    Json(req): Json<DecideApprovalRequest>,
) -> Result<Json<ApprovalInfo>, HttpError> {
    info!(decision = %req.decision, "Handling decide_approval request");
    Ok(Json(app_state.approvals.decide(&token, &req).await?))
}

// ============================================================================
// Orders and production
// ============================================================================

/// Handler for POST `/orders`.
pub async fn handle_create_order(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), HttpError> {
    info!(order_number = %req.order_number, lines = req.lines.len(), "Handling create_order request");
    let mut persistence = app_state.persistence.lock().await;
    let order: OrderResponse = production::create_order(&mut persistence, &app_state.catalog, &req)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for GET `/orders/{id}`.
pub async fn handle_get_order(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(production::get_order(
        &mut persistence,
        &app_state.catalog,
        order_id,
    )?))
}

/// Handler for PATCH `/orders/{id}/production`.
pub async fn handle_patch_production(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<ProductionPatchRequest>,
) -> Result<Json<OrderResponse>, HttpError> {
    info!(order_id, actor = %actor.id, "Handling patch_production request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(production::patch_production(
        &mut persistence,
        &app_state.catalog,
        order_id,
        &req,
        &actor,
        &cause,
    )?))
}

/// Handler for POST `/orders/{id}/production/complete`.
pub async fn handle_complete_stage(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<CompleteStageRequest>,
) -> Result<Json<OrderResponse>, HttpError> {
    info!(order_id, stage = %req.stage, actor = %actor.id, "Handling complete_stage request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(production::apply_production_step(
        &mut persistence,
        &app_state.catalog,
        order_id,
        ProductionCommand::Complete { stage: req.stage },
        actor,
        cause,
    )?))
}

/// Handler for POST `/orders/{id}/production/advance`.
pub async fn handle_advance_stage(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<AdvanceStageRequest>,
) -> Result<Json<OrderResponse>, HttpError> {
    info!(order_id, target = %req.target_stage, actor = %actor.id, "Handling advance_stage request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(production::apply_production_step(
        &mut persistence,
        &app_state.catalog,
        order_id,
        ProductionCommand::Advance {
            target: req.target_stage,
        },
        actor,
        cause,
    )?))
}

/// Handler for PATCH `/orders/{id}/status`.
pub async fn handle_update_status(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
    RequestActor(actor, cause): RequestActor,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, HttpError> {
    info!(order_id, status = %req.status, actor = %actor.id, "Handling update_status request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(production::update_status(
        &mut persistence,
        &app_state.catalog,
        order_id,
        &req,
        actor,
        cause,
    )?))
}

/// Handler for PATCH `/orders/{id}/next-action`.
pub async fn handle_update_next_action(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<UpdateNextActionRequest>,
) -> Result<Json<OrderResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(production::update_next_action(
        &mut persistence,
        &app_state.catalog,
        order_id,
        &req,
    )?))
}

/// Handler for GET `/orders/{id}/activity`.
pub async fn handle_list_activity(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<Vec<ActivityInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(production::list_activity(&mut persistence, order_id)?))
}

/// Handler for POST `/users`.
pub async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let user: UserInfo = production::create_user(&mut persistence, &req)?;
    info!(user_id = user.user_id, "Created user");
    Ok((StatusCode::CREATED, Json(user)))
}

// ============================================================================
// Documents
// ============================================================================

/// Handler for POST `/orders/{id}/documents`.
pub async fn handle_generate_document(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<GenerateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentInfo>), HttpError> {
    info!(
        order_id,
        document_type = %req.document_type,
        vendor_id = ?req.vendor_id,
        "Handling generate_document request"
    );
    let document: DocumentInfo = app_state.documents.materialize(order_id, &req).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Handler for GET `/orders/{id}/documents`.
pub async fn handle_list_documents(
    AxumState(app_state): AxumState<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<Vec<DocumentInfo>>, HttpError> {
    Ok(Json(app_state.documents.list(order_id).await?))
}

/// Handler for GET `/documents/{id}`.
pub async fn handle_get_document(
    AxumState(app_state): AxumState<AppState>,
    Path(document_id): Path<i64>,
) -> Result<Json<DocumentInfo>, HttpError> {
    Ok(Json(app_state.documents.get(document_id).await?))
}

/// Handler for DELETE `/documents/{id}`.
pub async fn handle_delete_document(
    AxumState(app_state): AxumState<AppState>,
    Path(document_id): Path<i64>,
) -> Result<Json<DocumentInfo>, HttpError> {
    info!(document_id, "Handling delete_document request");
    Ok(Json(app_state.documents.delete(document_id).await?))
}

/// Handler for POST `/documents/{id}/regenerate`.
pub async fn handle_regenerate_document(
    AxumState(app_state): AxumState<AppState>,
    Path(document_id): Path<i64>,
    Json(req): Json<RegenerateDocumentRequest>,
) -> Result<Json<DocumentInfo>, HttpError> {
    info!(document_id, "Handling regenerate_document request");
    Ok(Json(app_state.documents.regenerate(document_id, &req).await?))
}

/// Handler for PATCH `/documents/{id}/status`.
pub async fn handle_update_document_status(
    AxumState(app_state): AxumState<AppState>,
    Path(document_id): Path<i64>,
    Json(req): Json<UpdateDocumentStatusRequest>,
) -> Result<Json<DocumentInfo>, HttpError> {
    info!(document_id, status = %req.status, "Handling update_document_status request");
    Ok(Json(
        app_state.documents.update_status(document_id, &req).await?,
    ))
}

// ============================================================================
// Notifications
// ============================================================================

/// Handler for GET `/notifications`.
pub async fn handle_list_notifications(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<NotificationInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(notifications::list_notifications(
        &mut persistence,
        query.recipient_id,
        query.unread_only,
    )?))
}

/// Handler for PATCH `/notifications/{id}/read`.
pub async fn handle_mark_notification_read(
    AxumState(app_state): AxumState<AppState>,
    Path(notification_id): Path<i64>,
) -> Result<Json<NotificationInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(notifications::mark_read(
        &mut persistence,
        notification_id,
    )?))
}

/// Handler for POST `/admin/notifications/run-now`.
///
/// Runs one scheduler tick immediately. Answers with the `skipped`
/// outcome if a tick is already running.
pub async fn handle_run_notifications_now(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor, _): RequestActor,
) -> Result<Json<TickOutcome>, HttpError> {
    info!(actor = %actor.id, "Handling manual notification run");
    Ok(Json(
        app_state.scheduler.tick(OffsetDateTime::now_utc()).await?,
    ))
}
