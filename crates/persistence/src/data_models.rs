// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Records returned by the store that have no domain counterpart, and
//! the text encodings used for domain values in SQLite columns.

use promo_ops_audit::AuditEvent;
use promo_ops_domain::{
    Approval, GeneratedDocument, StageData, StageId, parse_amount, parse_date,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use time::Date;
use time::macros::format_description;

use crate::error::PersistenceError;

/// A directory entry for a notification recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
}

/// One entry of an order's activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub activity_id: i64,
    pub created_at: String,
    pub event: AuditEvent,
}

/// The result of inserting a pending approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingInsert {
    /// The approval was stored as the subject's pending request.
    Created(Approval),
    /// Another pending approval for the subject already existed.
    Existing(Approval),
}

/// The result of replacing the document in an order's document slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReplacement {
    pub document: GeneratedDocument,
    /// The row the new document displaced, if any.
    pub replaced: Option<GeneratedDocument>,
}

/// The follow-up fields of an order that drive the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowUp {
    pub next_action_date: Option<Date>,
    pub next_action_notes: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub production_manager_id: Option<i64>,
    pub csr_user_id: Option<i64>,
}

fn corrupt(column: &str, value: &str, reason: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::SerializationError(format!("column {column} holds '{value}': {reason}"))
}

/// Encodes a completed-stage set as a JSON array in identifier order.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_stages(stages: &BTreeSet<StageId>) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(stages)?)
}

pub(crate) fn decode_stages(value: &str) -> Result<BTreeSet<StageId>, PersistenceError> {
    serde_json::from_str(value).map_err(|e| corrupt("stages_completed_json", value, e))
}

/// Encodes a stage data map as a JSON object keyed by stage id.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_stage_data(data: &BTreeMap<StageId, StageData>) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(data)?)
}

pub(crate) fn decode_stage_data(
    value: &str,
) -> Result<BTreeMap<StageId, StageData>, PersistenceError> {
    serde_json::from_str(value).map_err(|e| corrupt("stage_data_json", value, e))
}

/// Encodes a calendar date as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns an error if the date cannot be formatted.
pub fn encode_date(date: Date) -> Result<String, PersistenceError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub(crate) fn decode_date(column: &str, value: &str) -> Result<Date, PersistenceError> {
    parse_date(value).map_err(|e| corrupt(column, value, e))
}

pub(crate) fn encode_amount(amount: Option<Decimal>) -> Option<String> {
    amount.map(|a| a.to_string())
}

pub(crate) fn decode_amount(
    column: &str,
    value: Option<&str>,
) -> Result<Option<Decimal>, PersistenceError> {
    value
        .map(|v| parse_amount(column, v).map_err(|e| corrupt(column, v, e)))
        .transpose()
}

/// Parses a stored enum column through its `FromStr` impl.
pub(crate) fn decode_enum<T>(column: &str, value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|e| corrupt(column, value, e))
}
