// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_actor, create_test_cause, create_test_order, create_test_persistence};
use crate::error::ApiError;
use crate::production::{
    apply_production_step, create_order, get_order, list_activity, patch_production,
    update_next_action, update_status,
};
use crate::request_response::{
    CreateOrderRequest, ProductionPatchRequest, UpdateNextActionRequest, UpdateStatusRequest,
};
use promo_ops::ProductionCommand;
use promo_ops_domain::{OrderStatus, StageCatalog, StageData, StageId};
use promo_ops_persistence::Persistence;

fn complete(
    persistence: &mut Persistence,
    order_id: i64,
    stage: StageId,
) -> Result<crate::OrderResponse, ApiError> {
    apply_production_step(
        persistence,
        &StageCatalog::standard(),
        order_id,
        ProductionCommand::Complete { stage },
        create_test_actor(),
        create_test_cause(),
    )
}

#[test]
fn test_create_order_starts_at_first_stage() {
    let mut persistence = create_test_persistence();
    let order = create_test_order(&mut persistence, "so-1001");

    assert_eq!(order.order_number, "SO-1001");
    assert_eq!(order.status, OrderStatus::Quote);
    assert_eq!(order.current_stage, StageId::SalesBooked);
    assert!(order.stages_completed.is_empty());
    assert_eq!(order.progress.completed, 0);
    assert_eq!(order.progress.total, 9);
    assert_eq!(order.lines.as_ref().map(Vec::len), Some(2));
}

#[test]
fn test_create_order_rejects_duplicate_number() {
    let mut persistence = create_test_persistence();
    create_test_order(&mut persistence, "SO-1001");

    let result = create_order(
        &mut persistence,
        &StageCatalog::standard(),
        &super::create_order_request("so-1001"),
    );
    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_create_order_rejects_negative_quantity() {
    let mut persistence = create_test_persistence();
    let mut request: CreateOrderRequest = super::create_order_request("SO-1002");
    request.lines[0].quantity = Some(-1);

    let result = create_order(&mut persistence, &StageCatalog::standard(), &request);
    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "quantity"));
}

#[test]
fn test_complete_advances_and_records_activity() {
    let mut persistence = create_test_persistence();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    let updated = complete(&mut persistence, order_id, StageId::SalesBooked).unwrap();
    assert_eq!(updated.current_stage, StageId::PoPlaced);
    assert_eq!(updated.stages_completed, vec![StageId::SalesBooked]);
    assert_eq!(updated.progress.percent, 11);

    let activity = list_activity(&mut persistence, order_id).unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].action, "CompleteStage");
    assert_eq!(activity[0].actor_id, "csr-1");
}

#[test]
fn test_second_completion_of_same_stage_conflicts() {
    let mut persistence = create_test_persistence();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    for stage in [
        StageId::SalesBooked,
        StageId::PoPlaced,
        StageId::ConfirmationReceived,
        StageId::ProofReceived,
    ] {
        complete(&mut persistence, order_id, stage).unwrap();
    }

    let first = complete(&mut persistence, order_id, StageId::ProofApproved).unwrap();
    assert_eq!(first.current_stage, StageId::OrderPlaced);

    let second = complete(&mut persistence, order_id, StageId::ProofApproved);
    let Err(ApiError::Conflict { current, .. }) = second else {
        panic!("expected a conflict, got {second:?}");
    };
    let current = current.unwrap();
    assert_eq!(current.current_stage, StageId::OrderPlaced);
    assert!(current.stages_completed.contains(&StageId::ProofApproved));

    // Only the winning completion is logged.
    let activity = list_activity(&mut persistence, order_id).unwrap();
    assert_eq!(activity.len(), 5);
}

#[test]
fn test_complete_of_non_current_stage_is_invalid_transition() {
    let mut persistence = create_test_persistence();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    let result = complete(&mut persistence, order_id, StageId::Invoiced);
    let Err(ApiError::InvalidTransition { current, .. }) = result else {
        panic!("expected an invalid transition, got {result:?}");
    };
    assert_eq!(current.unwrap().current_stage, StageId::SalesBooked);
}

#[test]
fn test_advance_cannot_move_before_completed_stage() {
    let mut persistence = create_test_persistence();
    let catalog = StageCatalog::standard();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    complete(&mut persistence, order_id, StageId::SalesBooked).unwrap();
    complete(&mut persistence, order_id, StageId::PoPlaced).unwrap();

    let jumped = apply_production_step(
        &mut persistence,
        &catalog,
        order_id,
        ProductionCommand::Advance {
            target: StageId::OrderShipped,
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(jumped.current_stage, StageId::OrderShipped);
    assert_eq!(
        jumped.stages_completed,
        vec![StageId::SalesBooked, StageId::PoPlaced]
    );

    let back = apply_production_step(
        &mut persistence,
        &catalog,
        order_id,
        ProductionCommand::Advance {
            target: StageId::SalesBooked,
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(back, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_advance_to_current_stage_returns_order_unchanged() {
    let mut persistence = create_test_persistence();
    let catalog = StageCatalog::standard();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    let same = apply_production_step(
        &mut persistence,
        &catalog,
        order_id,
        ProductionCommand::Advance {
            target: StageId::SalesBooked,
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(same, get_order(&mut persistence, &catalog, order_id).unwrap());
    assert_eq!(same.current_stage, StageId::SalesBooked);
    assert!(list_activity(&mut persistence, order_id).unwrap().is_empty());
}

#[test]
fn test_missing_order_is_not_found() {
    let mut persistence = create_test_persistence();
    let result = complete(&mut persistence, 404, StageId::SalesBooked);
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_patch_applies_completions_then_stage_data() {
    let mut persistence = create_test_persistence();
    let catalog = StageCatalog::standard();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    let request = ProductionPatchRequest {
        current_stage: None,
        stages_completed: Some(vec![StageId::PoPlaced, StageId::SalesBooked]),
        stage_data: Some(StageData::PoPlaced {
            po_number: String::from("PO-88"),
        }),
    };
    let updated = patch_production(
        &mut persistence,
        &catalog,
        order_id,
        &request,
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap();

    assert_eq!(updated.current_stage, StageId::ConfirmationReceived);
    assert_eq!(
        updated.stages_completed,
        vec![StageId::SalesBooked, StageId::PoPlaced]
    );
    assert!(updated.stage_data.contains_key(&StageId::PoPlaced));

    let stored = get_order(&mut persistence, &catalog, order_id).unwrap();
    assert_eq!(stored.stages_completed, updated.stages_completed);
    assert_eq!(list_activity(&mut persistence, order_id).unwrap().len(), 3);
}

#[test]
fn test_patch_without_changes_returns_order_unchanged() {
    let mut persistence = create_test_persistence();
    let catalog = StageCatalog::standard();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    let request = ProductionPatchRequest {
        current_stage: Some(StageId::SalesBooked),
        stages_completed: Some(Vec::new()),
        stage_data: None,
    };
    let updated = patch_production(
        &mut persistence,
        &catalog,
        order_id,
        &request,
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap();

    assert_eq!(updated.current_stage, StageId::SalesBooked);
    assert!(list_activity(&mut persistence, order_id).unwrap().is_empty());
}

#[test]
fn test_patch_cannot_remove_completed_stage() {
    let mut persistence = create_test_persistence();
    let catalog = StageCatalog::standard();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();
    complete(&mut persistence, order_id, StageId::SalesBooked).unwrap();

    let request = ProductionPatchRequest {
        stages_completed: Some(Vec::new()),
        ..ProductionPatchRequest::default()
    };
    let result = patch_production(
        &mut persistence,
        &catalog,
        order_id,
        &request,
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));

    let stored = get_order(&mut persistence, &catalog, order_id).unwrap();
    assert_eq!(stored.stages_completed, vec![StageId::SalesBooked]);
}

#[test]
fn test_status_follows_lifecycle() {
    let mut persistence = create_test_persistence();
    let catalog = StageCatalog::standard();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    let request = |status: &str| UpdateStatusRequest {
        status: status.to_string(),
    };

    let updated = update_status(
        &mut persistence,
        &catalog,
        order_id,
        &request("pending_approval"),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(updated.status, OrderStatus::PendingApproval);

    let skipped = update_status(
        &mut persistence,
        &catalog,
        order_id,
        &request("shipped"),
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(skipped, Err(ApiError::InvalidTransition { .. })));

    let unknown = update_status(
        &mut persistence,
        &catalog,
        order_id,
        &request("lost"),
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(unknown, Err(ApiError::InvalidInput { .. })));

    let activity = list_activity(&mut persistence, order_id).unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].action, "UpdateStatus");
}

#[test]
fn test_next_action_round_trips_and_clears() {
    let mut persistence = create_test_persistence();
    let catalog = StageCatalog::standard();
    let order_id = create_test_order(&mut persistence, "SO-1001").order_id.unwrap();

    let updated = update_next_action(
        &mut persistence,
        &catalog,
        order_id,
        &UpdateNextActionRequest {
            next_action_date: Some(String::from("2026-03-04")),
            next_action_notes: Some(String::from("Chase proof")),
            assigned_user_id: Some(3),
            production_manager_id: Some(4),
            csr_user_id: None,
        },
    )
    .unwrap();
    assert_eq!(updated.next_action_date.as_deref(), Some("2026-03-04"));
    assert_eq!(updated.assigned_user_id, Some(3));

    let cleared = update_next_action(
        &mut persistence,
        &catalog,
        order_id,
        &UpdateNextActionRequest::default(),
    )
    .unwrap();
    assert_eq!(cleared.next_action_date, None);
    assert_eq!(cleared.assigned_user_id, None);

    let malformed = update_next_action(
        &mut persistence,
        &catalog,
        order_id,
        &UpdateNextActionRequest {
            next_action_date: Some(String::from("03/04/2026")),
            ..UpdateNextActionRequest::default()
        },
    );
    assert!(matches!(malformed, Err(ApiError::InvalidInput { .. })));
}
