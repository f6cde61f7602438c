// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Approval queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_domain::{Approval, ApprovalSubject, ApprovalToken, SubjectType};

use crate::data_models::decode_enum;
use crate::diesel_schema::approvals;
use crate::error::PersistenceError;

/// Diesel Queryable struct for approval rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = approvals)]
struct ApprovalRow {
    approval_id: i64,
    subject_type: String,
    subject_id: String,
    token: String,
    status: String,
    client_email: String,
    client_name: String,
    sent_at: String,
    decided_at: Option<String>,
    decision_notes: Option<String>,
}

impl ApprovalRow {
    fn into_approval(self) -> Result<Approval, PersistenceError> {
        let subject_type: SubjectType = decode_enum("subject_type", &self.subject_type)?;
        let subject: ApprovalSubject = ApprovalSubject::new(subject_type, &self.subject_id)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let token: ApprovalToken = ApprovalToken::parse(&self.token)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        Ok(Approval {
            approval_id: Some(self.approval_id),
            subject,
            token,
            status: decode_enum("status", &self.status)?,
            client_email: self.client_email,
            client_name: self.client_name,
            sent_at: self.sent_at,
            decided_at: self.decided_at,
            decision_notes: self.decision_notes,
        })
    }
}

/// Retrieves the pending approval for a subject, if one exists.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_pending_approval(
    conn: &mut SqliteConnection,
    subject: &ApprovalSubject,
) -> Result<Option<Approval>, PersistenceError> {
    approvals::table
        .filter(approvals::pending_key.eq(subject.pending_key()))
        .select(ApprovalRow::as_select())
        .first(conn)
        .optional()?
        .map(ApprovalRow::into_approval)
        .transpose()
}

/// Retrieves an approval by its token.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_approval_by_token(
    conn: &mut SqliteConnection,
    token: &ApprovalToken,
) -> Result<Option<Approval>, PersistenceError> {
    approvals::table
        .filter(approvals::token.eq(token.as_str()))
        .select(ApprovalRow::as_select())
        .first(conn)
        .optional()?
        .map(ApprovalRow::into_approval)
        .transpose()
}

/// Retrieves every approval requested for a subject, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_approvals_for_subject(
    conn: &mut SqliteConnection,
    subject: &ApprovalSubject,
) -> Result<Vec<Approval>, PersistenceError> {
    let rows: Vec<ApprovalRow> = approvals::table
        .filter(approvals::subject_type.eq(subject.subject_type().as_str()))
        .filter(approvals::subject_id.eq(subject.subject_id()))
        .order(approvals::approval_id.asc())
        .select(ApprovalRow::as_select())
        .load(conn)?;

    rows.into_iter().map(ApprovalRow::into_approval).collect()
}
