// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Generated document queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use promo_ops_domain::{DocumentKey, DocumentMetadata, DocumentType, GeneratedDocument};

use crate::data_models::decode_enum;
use crate::diesel_schema::generated_documents;
use crate::error::PersistenceError;

/// Diesel Queryable struct for generated document rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = generated_documents)]
struct DocumentRow {
    document_id: i64,
    order_id: i64,
    document_type: String,
    vendor_id: Option<i64>,
    document_number: String,
    status: String,
    file_ref: String,
    metadata_json: String,
    created_at: String,
}

impl DocumentRow {
    fn into_document(self) -> Result<GeneratedDocument, PersistenceError> {
        let document_type: DocumentType = decode_enum("document_type", &self.document_type)?;
        let key: DocumentKey = DocumentKey::new(self.order_id, document_type, self.vendor_id)
            .map_err(|e| {
                PersistenceError::SerializationError(format!(
                    "document {} has an invalid key: {e}",
                    self.document_id
                ))
            })?;
        let metadata: DocumentMetadata = serde_json::from_str(&self.metadata_json)?;

        Ok(GeneratedDocument {
            document_id: Some(self.document_id),
            key,
            document_number: self.document_number,
            status: decode_enum("status", &self.status)?,
            file_ref: self.file_ref,
            metadata,
            created_at: self.created_at,
        })
    }
}

/// Retrieves a document by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_document(
    conn: &mut SqliteConnection,
    document_id: i64,
) -> Result<Option<GeneratedDocument>, PersistenceError> {
    generated_documents::table
        .filter(generated_documents::document_id.eq(document_id))
        .select(DocumentRow::as_select())
        .first(conn)
        .optional()?
        .map(DocumentRow::into_document)
        .transpose()
}

/// Retrieves the document occupying a slot, if any.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_document_by_key(
    conn: &mut SqliteConnection,
    key: &DocumentKey,
) -> Result<Option<GeneratedDocument>, PersistenceError> {
    generated_documents::table
        .filter(generated_documents::order_id.eq(key.order_id))
        .filter(generated_documents::document_type.eq(key.document_type.as_str()))
        .filter(generated_documents::vendor_key.eq(key.vendor_key()))
        .select(DocumentRow::as_select())
        .first(conn)
        .optional()?
        .map(DocumentRow::into_document)
        .transpose()
}

/// Retrieves the documents of an order, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_documents(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<Vec<GeneratedDocument>, PersistenceError> {
    let rows: Vec<DocumentRow> = generated_documents::table
        .filter(generated_documents::order_id.eq(order_id))
        .order(generated_documents::document_id.desc())
        .select(DocumentRow::as_select())
        .load(conn)?;

    rows.into_iter().map(DocumentRow::into_document).collect()
}
