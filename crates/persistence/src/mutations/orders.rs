// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order writes.
//!
//! Production and status changes are conditional updates: the `WHERE`
//! clause repeats the state the caller read, and zero affected rows means
//! another writer got there first.

use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use promo_ops_audit::AuditEvent;
use promo_ops_domain::{Order, OrderLine, OrderStatus};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{FollowUp, encode_amount, encode_date, encode_stage_data, encode_stages};
use crate::diesel_schema::{order_lines, orders};
use crate::error::{PersistenceError, is_unique_violation};
use crate::mutations::activity::insert_activity;

fn require_id(order: &Order) -> Result<i64, PersistenceError> {
    order
        .order_id
        .ok_or_else(|| PersistenceError::NotFound(format!("order {} has no id", order.order_number)))
}

/// Inserts an order together with its lines.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateOrderNumber` if the number is taken,
/// or another error if the insert fails.
pub fn create_order(
    conn: &mut SqliteConnection,
    order: &Order,
    lines: &[OrderLine],
) -> Result<i64, PersistenceError> {
    let stages_json: String = encode_stages(&order.stages_completed)?;
    let stage_data_json: String = encode_stage_data(&order.stage_data)?;
    let next_action_date: Option<String> = order.next_action_date.map(encode_date).transpose()?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(orders::table)
            .values((
                orders::order_number.eq(order.order_number.value()),
                orders::status.eq(order.status.as_str()),
                orders::current_stage.eq(order.current_stage.as_str()),
                orders::stages_completed_json.eq(&stages_json),
                orders::stage_data_json.eq(&stage_data_json),
                orders::next_action_date.eq(next_action_date.as_deref()),
                orders::next_action_notes.eq(order.next_action_notes.as_deref()),
                orders::assigned_user_id.eq(order.assigned_user_id),
                orders::production_manager_id.eq(order.production_manager_id),
                orders::csr_user_id.eq(order.csr_user_id),
            ))
            .execute(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PersistenceError::DuplicateOrderNumber(order.order_number.value().to_string())
                } else {
                    PersistenceError::from(e)
                }
            })?;
        let order_id: i64 = get_last_insert_rowid(conn)?;

        for (index, line) in lines.iter().enumerate() {
            let position: i32 = i32::try_from(index)
                .map_err(|_| PersistenceError::QueryFailed(String::from("too many order lines")))?;
            diesel::insert_into(order_lines::table)
                .values((
                    order_lines::order_id.eq(order_id),
                    order_lines::vendor_id.eq(line.vendor_id),
                    order_lines::description.eq(&line.description),
                    order_lines::quantity.eq(line.quantity),
                    order_lines::unit_price.eq(encode_amount(line.unit_price)),
                    order_lines::unit_cost.eq(encode_amount(line.unit_cost)),
                    order_lines::position.eq(position),
                ))
                .execute(conn)?;
        }

        info!(order_id, order_number = %order.order_number, lines = lines.len(), "Created order");
        Ok(order_id)
    })
}

/// Writes a new production state if the stored one still matches
/// `previous`, and records `events` in the same transaction.
///
/// Returns false, writing nothing, when the stored state has moved on.
///
/// # Errors
///
/// Returns an error if `previous` has no id or the write fails.
pub fn update_production(
    conn: &mut SqliteConnection,
    previous: &Order,
    next: &Order,
    events: &[AuditEvent],
) -> Result<bool, PersistenceError> {
    let order_id: i64 = require_id(previous)?;
    let expected_stages: String = encode_stages(&previous.stages_completed)?;
    let expected_data: String = encode_stage_data(&previous.stage_data)?;
    let new_stages: String = encode_stages(&next.stages_completed)?;
    let new_data: String = encode_stage_data(&next.stage_data)?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            orders::table
                .filter(orders::order_id.eq(order_id))
                .filter(orders::current_stage.eq(previous.current_stage.as_str()))
                .filter(orders::stages_completed_json.eq(&expected_stages))
                .filter(orders::stage_data_json.eq(&expected_data)),
        )
        .set((
            orders::current_stage.eq(next.current_stage.as_str()),
            orders::stages_completed_json.eq(&new_stages),
            orders::stage_data_json.eq(&new_data),
            orders::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

        if updated == 0 {
            debug!(order_id, "Production write lost to a concurrent change");
            return Ok(false);
        }

        insert_activity(conn, order_id, events)?;
        info!(
            order_id,
            current_stage = %next.current_stage,
            completed = next.stages_completed.len(),
            "Updated production state"
        );
        Ok(true)
    })
}

/// Moves the order from `expected` to `new_status` if it is still in
/// `expected`, and records `events` in the same transaction.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn update_order_status(
    conn: &mut SqliteConnection,
    order_id: i64,
    expected: OrderStatus,
    new_status: OrderStatus,
    events: &[AuditEvent],
) -> Result<bool, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            orders::table
                .filter(orders::order_id.eq(order_id))
                .filter(orders::status.eq(expected.as_str())),
        )
        .set((
            orders::status.eq(new_status.as_str()),
            orders::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Ok(false);
        }

        insert_activity(conn, order_id, events)?;
        info!(order_id, from = %expected, to = %new_status, "Updated order status");
        Ok(true)
    })
}

/// Replaces the follow-up fields of an order.
///
/// Returns false if the order does not exist.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn update_follow_up(
    conn: &mut SqliteConnection,
    order_id: i64,
    follow_up: &FollowUp,
) -> Result<bool, PersistenceError> {
    let next_action_date: Option<String> =
        follow_up.next_action_date.map(encode_date).transpose()?;

    let updated: usize = diesel::update(orders::table.filter(orders::order_id.eq(order_id)))
        .set((
            orders::next_action_date.eq(next_action_date.as_deref()),
            orders::next_action_notes.eq(follow_up.next_action_notes.as_deref()),
            orders::assigned_user_id.eq(follow_up.assigned_user_id),
            orders::production_manager_id.eq(follow_up.production_manager_id),
            orders::csr_user_id.eq(follow_up.csr_user_id),
            orders::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    debug!(order_id, updated, "Updated order follow-up");
    Ok(updated > 0)
}
