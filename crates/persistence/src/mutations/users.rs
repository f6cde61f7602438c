// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Adds a user to the directory.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_user(
    conn: &mut SqliteConnection,
    email: &str,
    display_name: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(users::table)
        .values((users::email.eq(email), users::display_name.eq(display_name)))
        .execute(conn)?;
    let user_id: i64 = get_last_insert_rowid(conn)?;
    info!(user_id, "Created user");
    Ok(user_id)
}
