// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order and production handlers.
//!
//! These run synchronously against a locked store. Every production write
//! is conditioned on the state read at the start of the call, so a caller
//! that lost a race gets a `Conflict` carrying the state that won.

use promo_ops::{
    PatchOutcome, ProductionCommand, ProductionPatch, ProductionTransition, apply_production,
    apply_production_patch,
};
use promo_ops_audit::{Action, Actor, AuditEvent, Cause, OrderSnapshot};
use promo_ops_domain::{
    Order, OrderLine, OrderNumber, OrderStatus, StageCatalog, parse_date, validate_client_name,
    validate_email,
};
use promo_ops_persistence::{FollowUp, Persistence};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use time::Date;
use tracing::{debug, info};

use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    ActivityInfo, CreateOrderRequest, CreateUserRequest, OrderLineInput, OrderResponse,
    ProductionPatchRequest, ProductionStateView, UpdateNextActionRequest, UpdateStatusRequest,
    UserInfo,
};

fn load_order(persistence: &mut Persistence, order_id: i64) -> Result<Order, ApiError> {
    persistence
        .get_order(order_id)?
        .ok_or_else(|| ApiError::not_found("Order", format!("Order {order_id} does not exist")))
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<Date>, ApiError> {
    value
        .map(|d| parse_date(d).map_err(translate_domain_error))
        .transpose()
}

fn check_line(line: &OrderLineInput) -> Result<OrderLine, ApiError> {
    if line.description.trim().is_empty() {
        return Err(ApiError::invalid("description", "Line description is required"));
    }
    if let Some(quantity) = line.quantity.filter(|q| *q < 0) {
        return Err(ApiError::invalid(
            "quantity",
            format!("Quantity cannot be negative: {quantity}"),
        ));
    }
    for (field, amount) in [("unit_price", line.unit_price), ("unit_cost", line.unit_cost)] {
        if amount.is_some_and(|a| a < Decimal::ZERO) {
            return Err(ApiError::invalid(field, "Amount cannot be negative"));
        }
    }
    if line.vendor_id.is_some_and(|v| v <= 0) {
        return Err(ApiError::invalid("vendor_id", "Vendor id must be positive"));
    }
    Ok(OrderLine {
        line_id: None,
        vendor_id: line.vendor_id,
        description: line.description.trim().to_string(),
        quantity: line.quantity,
        unit_price: line.unit_price,
        unit_cost: line.unit_cost,
    })
}

/// Reads the order again after a lost write and builds the conflict.
fn conflict(
    persistence: &mut Persistence,
    catalog: &StageCatalog,
    order_id: i64,
    message: &str,
) -> ApiError {
    let current: Option<ProductionStateView> = persistence
        .get_order(order_id)
        .ok()
        .flatten()
        .map(|o| ProductionStateView::of(&o, catalog));
    ApiError::Conflict {
        message: message.to_string(),
        current,
    }
}

/// Creates an order with its lines.
///
/// # Errors
///
/// Returns an error if the input is invalid or the order number is taken.
pub fn create_order(
    persistence: &mut Persistence,
    catalog: &StageCatalog,
    request: &CreateOrderRequest,
) -> Result<OrderResponse, ApiError> {
    let order_number: OrderNumber =
        OrderNumber::new(&request.order_number).map_err(translate_domain_error)?;
    let lines: Vec<OrderLine> = request
        .lines
        .iter()
        .map(check_line)
        .collect::<Result<_, _>>()?;

    let mut order: Order = Order::new(order_number, catalog);
    order.next_action_date = parse_optional_date(request.next_action_date.as_deref())?;
    order.next_action_notes.clone_from(&request.next_action_notes);
    order.assigned_user_id = request.assigned_user_id;
    order.production_manager_id = request.production_manager_id;
    order.csr_user_id = request.csr_user_id;

    let order_id: i64 = persistence.create_order(&order, &lines)?;
    order.order_id = Some(order_id);

    let lines: Vec<OrderLine> = persistence.get_order_lines(order_id)?;
    Ok(OrderResponse::of(&order, catalog).with_lines(lines))
}

/// Reads an order with its lines and progress.
///
/// # Errors
///
/// Returns an error if the order does not exist.
pub fn get_order(
    persistence: &mut Persistence,
    catalog: &StageCatalog,
    order_id: i64,
) -> Result<OrderResponse, ApiError> {
    let order: Order = load_order(persistence, order_id)?;
    let lines: Vec<OrderLine> = persistence.get_order_lines(order_id)?;
    Ok(OrderResponse::of(&order, catalog).with_lines(lines))
}

/// Applies one production step (complete or advance) to an order.
///
/// Advancing to the stage the order is already in returns the order
/// unchanged. Completing a stage that another caller already completed is
/// reported as a `Conflict` carrying the current state: from the caller's
/// side it lost the race.
///
/// # Errors
///
/// Returns `InvalidTransition` if the step is not permitted, `Conflict`
/// if the order changed concurrently, or `ResourceNotFound`.
pub fn apply_production_step(
    persistence: &mut Persistence,
    catalog: &StageCatalog,
    order_id: i64,
    command: ProductionCommand,
    actor: Actor,
    cause: Cause,
) -> Result<OrderResponse, ApiError> {
    let order: Order = load_order(persistence, order_id)?;

    let transition: ProductionTransition =
        apply_production(&order, catalog, command, actor, cause).map_err(translate_core_error)?;

    if !transition.changed {
        debug!(order_id, stage = %command.stage(), "Production step changed nothing");
        return match command {
            ProductionCommand::Advance { .. } => {
                let lines: Vec<OrderLine> = persistence.get_order_lines(order_id)?;
                Ok(OrderResponse::of(&order, catalog).with_lines(lines))
            }
            ProductionCommand::Complete { stage } => Err(ApiError::Conflict {
                message: format!("Stage '{stage}' has already been completed"),
                current: Some(ProductionStateView::of(&order, catalog)),
            }),
        };
    }

    let events: Vec<AuditEvent> = transition.audit_event.into_iter().collect();
    if !persistence.update_production(&order, &transition.new_order, &events)? {
        return Err(conflict(
            persistence,
            catalog,
            order_id,
            "The order's production state changed; refetch and retry",
        ));
    }

    info!(
        order_id,
        action = command.action_name(),
        current_stage = %transition.new_order.current_stage,
        "Applied production step"
    );
    Ok(OrderResponse::of(&transition.new_order, catalog))
}

/// Applies a client production patch.
///
/// A patch that changes nothing returns the order as stored.
///
/// # Errors
///
/// Returns `InvalidTransition` if any step is rejected, `Conflict` if the
/// order changed concurrently, or `ResourceNotFound`.
pub fn patch_production(
    persistence: &mut Persistence,
    catalog: &StageCatalog,
    order_id: i64,
    request: &ProductionPatchRequest,
    actor: &Actor,
    cause: &Cause,
) -> Result<OrderResponse, ApiError> {
    let order: Order = load_order(persistence, order_id)?;

    let patch: ProductionPatch = ProductionPatch {
        current_stage: request.current_stage,
        stages_completed: request
            .stages_completed
            .as_ref()
            .map(|stages| stages.iter().copied().collect::<BTreeSet<_>>()),
        stage_data: request.stage_data.clone(),
    };
    let outcome: PatchOutcome =
        apply_production_patch(&order, catalog, patch, actor, cause).map_err(translate_core_error)?;

    if !outcome.changed(&order) {
        return Ok(OrderResponse::of(&order, catalog));
    }

    if !persistence.update_production(&order, &outcome.new_order, &outcome.audit_events)? {
        return Err(conflict(
            persistence,
            catalog,
            order_id,
            "The order's production state changed; refetch and retry",
        ));
    }

    info!(order_id, steps = outcome.audit_events.len(), "Applied production patch");
    Ok(OrderResponse::of(&outcome.new_order, catalog))
}

/// Moves an order to a new status.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown status, `InvalidTransition` if the
/// lifecycle forbids the move, or `Conflict` if the status changed
/// concurrently.
pub fn update_status(
    persistence: &mut Persistence,
    catalog: &StageCatalog,
    order_id: i64,
    request: &UpdateStatusRequest,
    actor: Actor,
    cause: Cause,
) -> Result<OrderResponse, ApiError> {
    let new_status: OrderStatus = request.status.parse().map_err(translate_domain_error)?;
    let order: Order = load_order(persistence, order_id)?;

    order
        .status
        .validate_transition(new_status)
        .map_err(translate_domain_error)?;

    let mut next: Order = order.clone();
    next.status = new_status;
    let event: AuditEvent = AuditEvent::new(
        Some(order_id),
        actor,
        cause,
        Action::new(
            String::from("UpdateStatus"),
            Some(format!("Status changed from '{}' to '{new_status}'", order.status)),
        ),
        OrderSnapshot::of(&order),
        OrderSnapshot::of(&next),
    );

    if !persistence.update_order_status(order_id, order.status, new_status, &[event])? {
        return Err(ApiError::Conflict {
            message: String::from("The order's status changed; refetch and retry"),
            current: None,
        });
    }
    Ok(OrderResponse::of(&next, catalog))
}

/// Replaces the follow-up fields that drive the notification scheduler.
///
/// # Errors
///
/// Returns an error if the date is malformed or the order does not exist.
pub fn update_next_action(
    persistence: &mut Persistence,
    catalog: &StageCatalog,
    order_id: i64,
    request: &UpdateNextActionRequest,
) -> Result<OrderResponse, ApiError> {
    let follow_up: FollowUp = FollowUp {
        next_action_date: parse_optional_date(request.next_action_date.as_deref())?,
        next_action_notes: request.next_action_notes.clone(),
        assigned_user_id: request.assigned_user_id,
        production_manager_id: request.production_manager_id,
        csr_user_id: request.csr_user_id,
    };

    if !persistence.update_follow_up(order_id, &follow_up)? {
        return Err(ApiError::not_found(
            "Order",
            format!("Order {order_id} does not exist"),
        ));
    }
    get_order(persistence, catalog, order_id)
}

/// Lists the activity log of an order.
///
/// # Errors
///
/// Returns an error if the order does not exist.
pub fn list_activity(
    persistence: &mut Persistence,
    order_id: i64,
) -> Result<Vec<ActivityInfo>, ApiError> {
    load_order(persistence, order_id)?;
    Ok(persistence
        .list_activity(order_id)?
        .into_iter()
        .map(ActivityInfo::from)
        .collect())
}

/// Adds a notification recipient to the users directory.
///
/// # Errors
///
/// Returns an error if the email or name is invalid.
pub fn create_user(
    persistence: &mut Persistence,
    request: &CreateUserRequest,
) -> Result<UserInfo, ApiError> {
    let email: String = validate_email(&request.email).map_err(translate_domain_error)?;
    let display_name: String =
        validate_client_name(&request.display_name).map_err(translate_domain_error)?;

    let user_id: i64 = persistence.create_user(&email, &display_name)?;
    persistence
        .get_user(user_id)?
        .map(UserInfo::from)
        .ok_or_else(|| ApiError::Internal {
            message: format!("User {user_id} vanished after insert"),
        })
}
