// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::create_test_approval;
use crate::{Persistence, PendingInsert};
use promo_ops_domain::{ApprovalDecision, ApprovalStatus};

#[test]
fn test_insert_pending_then_read_by_token() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let approval = create_test_approval("Q-SO-1", 1);

    let PendingInsert::Created(created) = persistence.insert_pending_approval(&approval).unwrap()
    else {
        panic!("expected a new approval");
    };
    assert!(created.approval_id.is_some());

    let loaded = persistence
        .get_approval_by_token(&approval.token)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn test_second_pending_for_subject_returns_existing() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let first = create_test_approval("Q-SO-1", 1);
    let second = create_test_approval("Q-SO-1", 2);

    persistence.insert_pending_approval(&first).unwrap();
    match persistence.insert_pending_approval(&second).unwrap() {
        PendingInsert::Existing(existing) => assert_eq!(existing.token, first.token),
        PendingInsert::Created(_) => panic!("a subject has at most one pending approval"),
    }
    assert!(persistence.get_approval_by_token(&second.token).unwrap().is_none());
}

#[test]
fn test_losing_insert_race_returns_winner() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let winner = create_test_approval("Q-SO-1", 1);
    let loser = create_test_approval("Q-SO-1", 2);
    persistence.insert_pending_approval(&winner).unwrap();

    // The loser read "no pending" before the winner committed.
    let outcome =
        crate::mutations::approvals::insert_pending_row(&mut persistence.conn, &loser).unwrap();
    match outcome {
        PendingInsert::Existing(existing) => {
            assert_eq!(existing.token, winner.token);
            assert_eq!(existing.status, ApprovalStatus::Pending);
        }
        PendingInsert::Created(_) => panic!("the pending key admits one row per subject"),
    }
    assert!(persistence.get_approval_by_token(&loser.token).unwrap().is_none());
    assert_eq!(
        persistence
            .list_approvals_for_subject(&winner.subject)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_decide_only_once() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let approval = create_test_approval("Q-SO-1", 1);
    persistence.insert_pending_approval(&approval).unwrap();

    let first = persistence
        .decide_approval(
            &approval.token,
            ApprovalDecision::Approved,
            "2026-03-05T09:00:00Z",
            Some("Looks good"),
        )
        .unwrap();
    let second = persistence
        .decide_approval(
            &approval.token,
            ApprovalDecision::Declined,
            "2026-03-05T09:01:00Z",
            None,
        )
        .unwrap();
    assert!(first);
    assert!(!second);

    let loaded = persistence
        .get_approval_by_token(&approval.token)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, ApprovalStatus::Approved);
    assert_eq!(loaded.decision_notes.as_deref(), Some("Looks good"));
    assert_eq!(loaded.decided_at.as_deref(), Some("2026-03-05T09:00:00Z"));
}

#[test]
fn test_decided_subject_accepts_new_request() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let first = create_test_approval("Q-SO-1", 1);
    persistence.insert_pending_approval(&first).unwrap();
    persistence
        .decide_approval(
            &first.token,
            ApprovalDecision::Declined,
            "2026-03-05T09:00:00Z",
            None,
        )
        .unwrap();

    assert!(persistence.find_pending_approval(&first.subject).unwrap().is_none());

    let second = create_test_approval("Q-SO-1", 2);
    assert!(matches!(
        persistence.insert_pending_approval(&second).unwrap(),
        PendingInsert::Created(_)
    ));

    let history = persistence.list_approvals_for_subject(&first.subject).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, ApprovalStatus::Declined);
    assert_eq!(history[1].status, ApprovalStatus::Pending);
}
