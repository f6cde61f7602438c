// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::UserRecord;
use crate::diesel_schema::users;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserRow {
    user_id: i64,
    email: String,
    display_name: String,
    created_at: String,
}

/// Retrieves a user by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserRecord>, PersistenceError> {
    let row: Option<UserRow> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(|r| UserRecord {
        user_id: r.user_id,
        email: r.email,
        display_name: r.display_name,
        created_at: r.created_at,
    }))
}
