// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Approval writes.
//!
//! At most one pending approval exists per subject: the row's
//! `pending_key` is set while pending, cleared on decision, and unique.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_domain::{Approval, ApprovalDecision, ApprovalStatus, ApprovalToken};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::PendingInsert;
use crate::diesel_schema::approvals;
use crate::error::{PersistenceError, is_unique_violation};
use crate::queries::approvals::find_pending_approval;

/// Stores `approval` as its subject's pending request, unless one exists.
///
/// An insert that loses a race against a concurrent insert for the same
/// subject returns the winner as `PendingInsert::Existing`.
///
/// # Errors
///
/// Returns an error if the approval is not pending or the write fails.
pub fn insert_pending_approval(
    conn: &mut SqliteConnection,
    approval: &Approval,
) -> Result<PendingInsert, PersistenceError> {
    if approval.status != ApprovalStatus::Pending {
        return Err(PersistenceError::QueryFailed(format!(
            "cannot insert a {} approval as pending",
            approval.status
        )));
    }

    if let Some(existing) = find_pending_approval(conn, &approval.subject)? {
        debug!(subject = %approval.subject.pending_key(), "Pending approval already exists");
        return Ok(PendingInsert::Existing(existing));
    }

    insert_pending_row(conn, approval)
}

/// Inserts the pending row without looking for an existing one first.
///
/// The unique `pending_key` decides between concurrent inserts; the loser
/// reads back the winner.
pub(crate) fn insert_pending_row(
    conn: &mut SqliteConnection,
    approval: &Approval,
) -> Result<PendingInsert, PersistenceError> {
    let pending_key: String = approval.subject.pending_key();
    let inserted = diesel::insert_into(approvals::table)
        .values((
            approvals::subject_type.eq(approval.subject.subject_type().as_str()),
            approvals::subject_id.eq(approval.subject.subject_id()),
            approvals::token.eq(approval.token.as_str()),
            approvals::status.eq(ApprovalStatus::Pending.as_str()),
            approvals::pending_key.eq(&pending_key),
            approvals::client_email.eq(&approval.client_email),
            approvals::client_name.eq(&approval.client_name),
            approvals::sent_at.eq(&approval.sent_at),
        ))
        .execute(conn);

    match inserted {
        Ok(_) => {
            let approval_id: i64 = get_last_insert_rowid(conn)?;
            info!(approval_id, subject = %pending_key, "Created pending approval");
            let mut created: Approval = approval.clone();
            created.approval_id = Some(approval_id);
            Ok(PendingInsert::Created(created))
        }
        Err(e) if is_unique_violation(&e) => {
            debug!(subject = %pending_key, "Lost pending approval insert race");
            find_pending_approval(conn, &approval.subject)?
                .map(PendingInsert::Existing)
                .ok_or_else(|| PersistenceError::DatabaseError(e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Records a decision on a pending approval.
///
/// Returns false, writing nothing, when the approval was already decided
/// or does not exist.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn decide_approval(
    conn: &mut SqliteConnection,
    token: &ApprovalToken,
    decision: ApprovalDecision,
    decided_at: &str,
    notes: Option<&str>,
) -> Result<bool, PersistenceError> {
    let resulting: ApprovalStatus = decision.resulting_status();
    let updated: usize = diesel::update(
        approvals::table
            .filter(approvals::token.eq(token.as_str()))
            .filter(approvals::status.eq(ApprovalStatus::Pending.as_str())),
    )
    .set((
        approvals::status.eq(resulting.as_str()),
        approvals::pending_key.eq(None::<String>),
        approvals::decided_at.eq(decided_at),
        approvals::decision_notes.eq(notes),
    ))
    .execute(conn)?;

    if updated > 0 {
        info!(status = %resulting, "Recorded approval decision");
    }
    Ok(updated > 0)
}
