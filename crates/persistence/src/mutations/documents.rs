// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Generated document writes.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_domain::{DocumentStatus, GeneratedDocument};
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::DocumentReplacement;
use crate::diesel_schema::generated_documents;
use crate::error::PersistenceError;
use crate::queries::documents::{find_document_by_key, get_document};

/// Puts `document` into its slot, deleting whatever occupied it, in one
/// transaction.
///
/// # Errors
///
/// Returns an error if the write fails; nothing is changed in that case.
pub fn replace_document(
    conn: &mut SqliteConnection,
    document: &GeneratedDocument,
) -> Result<DocumentReplacement, PersistenceError> {
    let metadata_json: String = serde_json::to_string(&document.metadata)?;
    let key = &document.key;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let replaced: Option<GeneratedDocument> = find_document_by_key(conn, key)?;
        if let Some(old_id) = replaced.as_ref().and_then(|d| d.document_id) {
            diesel::delete(
                generated_documents::table.filter(generated_documents::document_id.eq(old_id)),
            )
            .execute(conn)?;
        }

        diesel::insert_into(generated_documents::table)
            .values((
                generated_documents::order_id.eq(key.order_id),
                generated_documents::document_type.eq(key.document_type.as_str()),
                generated_documents::vendor_id.eq(key.vendor_id),
                generated_documents::vendor_key.eq(key.vendor_key()),
                generated_documents::document_number.eq(&document.document_number),
                generated_documents::status.eq(document.status.as_str()),
                generated_documents::file_ref.eq(&document.file_ref),
                generated_documents::metadata_json.eq(&metadata_json),
                generated_documents::created_at.eq(&document.created_at),
            ))
            .execute(conn)?;
        let document_id: i64 = get_last_insert_rowid(conn)?;

        info!(
            document_id,
            order_id = key.order_id,
            document_type = %key.document_type,
            replaced = replaced.is_some(),
            "Stored generated document"
        );

        let mut stored: GeneratedDocument = document.clone();
        stored.document_id = Some(document_id);
        Ok(DocumentReplacement {
            document: stored,
            replaced,
        })
    })
}

/// Deletes a document row, returning it.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_document(
    conn: &mut SqliteConnection,
    document_id: i64,
) -> Result<Option<GeneratedDocument>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let Some(existing) = get_document(conn, document_id)? else {
            return Ok(None);
        };
        diesel::delete(
            generated_documents::table.filter(generated_documents::document_id.eq(document_id)),
        )
        .execute(conn)?;
        info!(document_id, "Deleted generated document");
        Ok(Some(existing))
    })
}

/// Moves a document from `expected` to `new_status` if it is still in
/// `expected`.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn update_document_status(
    conn: &mut SqliteConnection,
    document_id: i64,
    expected: DocumentStatus,
    new_status: DocumentStatus,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        generated_documents::table
            .filter(generated_documents::document_id.eq(document_id))
            .filter(generated_documents::status.eq(expected.as_str())),
    )
    .set(generated_documents::status.eq(new_status.as_str()))
    .execute(conn)?;
    Ok(updated > 0)
}
