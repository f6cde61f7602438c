// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_audit::{Action, Actor, AuditEvent, Cause, OrderSnapshot};

use crate::data_models::ActivityRecord;
use crate::diesel_schema::order_activity;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = order_activity)]
struct ActivityRow {
    activity_id: i64,
    order_id: i64,
    actor_id: String,
    actor_type: String,
    cause_id: String,
    cause_description: String,
    action_name: String,
    action_details: Option<String>,
    before_snapshot: String,
    after_snapshot: String,
    created_at: String,
}

impl ActivityRow {
    fn into_record(self) -> Result<ActivityRecord, PersistenceError> {
        let before: OrderSnapshot = serde_json::from_str(&self.before_snapshot)?;
        let after: OrderSnapshot = serde_json::from_str(&self.after_snapshot)?;
        Ok(ActivityRecord {
            activity_id: self.activity_id,
            created_at: self.created_at,
            event: AuditEvent::new(
                Some(self.order_id),
                Actor::new(self.actor_id, self.actor_type),
                Cause::new(self.cause_id, self.cause_description),
                Action::new(self.action_name, self.action_details),
                before,
                after,
            ),
        })
    }
}

/// Retrieves the activity log of an order in the order it was written.
///
/// # Errors
///
/// Returns an error if the query fails or a snapshot cannot be decoded.
pub fn list_activity(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<Vec<ActivityRecord>, PersistenceError> {
    let rows: Vec<ActivityRow> = order_activity::table
        .filter(order_activity::order_id.eq(order_id))
        .order(order_activity::activity_id.asc())
        .select(ActivityRow::as_select())
        .load(conn)?;

    rows.into_iter().map(ActivityRow::into_record).collect()
}
