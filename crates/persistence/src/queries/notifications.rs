// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_domain::{Notification, NotificationType};
use time::Date;

use crate::data_models::{decode_date, decode_enum, encode_date};
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Diesel Queryable struct for notification rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = notifications)]
struct NotificationRow {
    notification_id: i64,
    recipient_id: i64,
    order_id: i64,
    notification_type: String,
    title: String,
    message: String,
    is_read: i32,
    dispatch_date: String,
    created_at: String,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification, PersistenceError> {
        Ok(Notification {
            notification_id: Some(self.notification_id),
            recipient_id: self.recipient_id,
            order_id: self.order_id,
            notification_type: decode_enum("notification_type", &self.notification_type)?,
            title: self.title,
            message: self.message,
            is_read: self.is_read != 0,
            dispatch_date: decode_date("dispatch_date", &self.dispatch_date)?,
            created_at: self.created_at,
        })
    }
}

/// Returns true if the recipient was already notified about the order on
/// `dispatch_date`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn notification_exists(
    conn: &mut SqliteConnection,
    order_id: i64,
    recipient_id: i64,
    notification_type: NotificationType,
    dispatch_date: Date,
) -> Result<bool, PersistenceError> {
    let day: String = encode_date(dispatch_date)?;
    let count: i64 = notifications::table
        .filter(notifications::order_id.eq(order_id))
        .filter(notifications::recipient_id.eq(recipient_id))
        .filter(notifications::notification_type.eq(notification_type.as_str()))
        .filter(notifications::dispatch_date.eq(day))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Retrieves a recipient's notifications, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_notifications(
    conn: &mut SqliteConnection,
    recipient_id: i64,
    unread_only: bool,
) -> Result<Vec<Notification>, PersistenceError> {
    let mut query = notifications::table
        .filter(notifications::recipient_id.eq(recipient_id))
        .into_boxed();
    if unread_only {
        query = query.filter(notifications::is_read.eq(0));
    }
    let rows: Vec<NotificationRow> = query
        .order(notifications::notification_id.desc())
        .select(NotificationRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(NotificationRow::into_notification)
        .collect()
}

/// Retrieves a notification by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_notification(
    conn: &mut SqliteConnection,
    notification_id: i64,
) -> Result<Option<Notification>, PersistenceError> {
    notifications::table
        .filter(notifications::notification_id.eq(notification_id))
        .select(NotificationRow::as_select())
        .first(conn)
        .optional()?
        .map(NotificationRow::into_notification)
        .transpose()
}
