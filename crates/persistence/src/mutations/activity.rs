// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_audit::AuditEvent;
use tracing::debug;

use crate::diesel_schema::order_activity;
use crate::error::PersistenceError;

/// Appends audit events to an order's activity log.
///
/// Callers run this inside the transaction that performed the change.
pub(crate) fn insert_activity(
    conn: &mut SqliteConnection,
    order_id: i64,
    events: &[AuditEvent],
) -> Result<(), PersistenceError> {
    for event in events {
        diesel::insert_into(order_activity::table)
            .values((
                order_activity::order_id.eq(order_id),
                order_activity::actor_id.eq(&event.actor.id),
                order_activity::actor_type.eq(&event.actor.actor_type),
                order_activity::cause_id.eq(&event.cause.id),
                order_activity::cause_description.eq(&event.cause.description),
                order_activity::action_name.eq(&event.action.name),
                order_activity::action_details.eq(event.action.details.as_deref()),
                order_activity::before_snapshot.eq(event.before.to_json()),
                order_activity::after_snapshot.eq(event.after.to_json()),
            ))
            .execute(conn)?;
        debug!(order_id, action = %event.action.name, "Recorded order activity");
    }
    Ok(())
}
