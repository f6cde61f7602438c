// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_domain::Notification;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::encode_date;
use crate::diesel_schema::notifications;
use crate::error::{PersistenceError, is_unique_violation};

/// Inserts a notification.
///
/// Returns `None` if the recipient was already notified about the order
/// for the same day.
///
/// # Errors
///
/// Returns an error if the write fails for any other reason.
pub fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &Notification,
) -> Result<Option<i64>, PersistenceError> {
    let dispatch_date: String = encode_date(notification.dispatch_date)?;
    let inserted = diesel::insert_into(notifications::table)
        .values((
            notifications::recipient_id.eq(notification.recipient_id),
            notifications::order_id.eq(notification.order_id),
            notifications::notification_type.eq(notification.notification_type.as_str()),
            notifications::title.eq(&notification.title),
            notifications::message.eq(&notification.message),
            notifications::is_read.eq(i32::from(notification.is_read)),
            notifications::dispatch_date.eq(&dispatch_date),
            notifications::created_at.eq(&notification.created_at),
        ))
        .execute(conn);

    match inserted {
        Ok(_) => Ok(Some(get_last_insert_rowid(conn)?)),
        Err(e) if is_unique_violation(&e) => {
            debug!(
                order_id = notification.order_id,
                recipient_id = notification.recipient_id,
                dispatch_date = %dispatch_date,
                "Notification already dispatched"
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Sets the read flag of a notification.
///
/// Returns false if the notification does not exist.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn mark_notification_read(
    conn: &mut SqliteConnection,
    notification_id: i64,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        notifications::table.filter(notifications::notification_id.eq(notification_id)),
    )
    .set(notifications::is_read.eq(1))
    .execute(conn)?;
    Ok(updated > 0)
}
