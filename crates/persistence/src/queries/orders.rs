// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order and order line queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_domain::{Order, OrderLine, OrderNumber, StageId};
use tracing::debug;

use crate::data_models::{
    decode_amount, decode_date, decode_enum, decode_stage_data, decode_stages, encode_date,
};
use crate::diesel_schema::{order_lines, orders};
use crate::error::PersistenceError;

/// Diesel Queryable struct for order rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = orders)]
struct OrderRow {
    order_id: i64,
    order_number: String,
    status: String,
    current_stage: String,
    stages_completed_json: String,
    stage_data_json: String,
    next_action_date: Option<String>,
    next_action_notes: Option<String>,
    assigned_user_id: Option<i64>,
    production_manager_id: Option<i64>,
    csr_user_id: Option<i64>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, PersistenceError> {
        let order_number: OrderNumber = OrderNumber::new(&self.order_number).map_err(|e| {
            PersistenceError::SerializationError(format!(
                "order {} has invalid number: {e}",
                self.order_id
            ))
        })?;
        let current_stage: StageId = decode_enum("current_stage", &self.current_stage)?;
        let next_action_date = self
            .next_action_date
            .as_deref()
            .map(|d| decode_date("next_action_date", d))
            .transpose()?;

        Ok(Order {
            order_id: Some(self.order_id),
            order_number,
            status: decode_enum("status", &self.status)?,
            current_stage,
            stages_completed: decode_stages(&self.stages_completed_json)?,
            stage_data: decode_stage_data(&self.stage_data_json)?,
            next_action_date,
            next_action_notes: self.next_action_notes,
            assigned_user_id: self.assigned_user_id,
            production_manager_id: self.production_manager_id,
            csr_user_id: self.csr_user_id,
        })
    }
}

/// Diesel Queryable struct for order line rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = order_lines)]
struct OrderLineRow {
    line_id: i64,
    vendor_id: Option<i64>,
    description: String,
    quantity: Option<i64>,
    unit_price: Option<String>,
    unit_cost: Option<String>,
}

/// Retrieves an order by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
/// Returns `Ok(None)` if the order does not exist.
pub fn get_order(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<Option<Order>, PersistenceError> {
    debug!(order_id, "Loading order");

    orders::table
        .filter(orders::order_id.eq(order_id))
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?
        .map(OrderRow::into_order)
        .transpose()
}

/// Retrieves the lines of an order in entry order.
///
/// # Errors
///
/// Returns an error if the query fails or an amount cannot be decoded.
pub fn get_order_lines(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<Vec<OrderLine>, PersistenceError> {
    let rows: Vec<OrderLineRow> = order_lines::table
        .filter(order_lines::order_id.eq(order_id))
        .order((order_lines::position.asc(), order_lines::line_id.asc()))
        .select(OrderLineRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            Ok(OrderLine {
                line_id: Some(row.line_id),
                vendor_id: row.vendor_id,
                description: row.description,
                quantity: row.quantity,
                unit_price: decode_amount("unit_price", row.unit_price.as_deref())?,
                unit_cost: decode_amount("unit_cost", row.unit_cost.as_deref())?,
            })
        })
        .collect()
}

/// Retrieves every order whose next action falls on `date`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_orders_due_on(
    conn: &mut SqliteConnection,
    date: time::Date,
) -> Result<Vec<Order>, PersistenceError> {
    let day: String = encode_date(date)?;
    let rows: Vec<OrderRow> = orders::table
        .filter(orders::next_action_date.eq(&day))
        .order(orders::order_id.asc())
        .select(OrderRow::as_select())
        .load(conn)?;

    debug!(date = %day, count = rows.len(), "Loaded orders due");
    rows.into_iter().map(OrderRow::into_order).collect()
}
