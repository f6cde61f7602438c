// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Quote and purchase order materialization.
//!
//! A document is never edited in place. Each generation prices the
//! order's current lines, renders the result, stores the artifact, and
//! then swaps the new row in for the old one in a single transaction.
//! Until that transaction commits the previous document stays valid.

use promo_ops_domain::{
    DocumentKey, DocumentMetadata, DocumentStatus, DocumentType, GeneratedDocument, LineEdit,
    Order, OrderLine, PriceSnapshot, price_lines,
};
use promo_ops_persistence::DocumentReplacement;
use rust_decimal::Decimal;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::collaborators::{BlobStore, CollaboratorError, DocumentContent, DocumentRenderer};
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{
    DocumentInfo, GenerateDocumentRequest, RegenerateDocumentRequest, UpdateDocumentStatusRequest,
};
use crate::{SharedPersistence, rfc3339};

fn external(service: &str, err: &CollaboratorError) -> ApiError {
    ApiError::ExternalService {
        service: service.to_string(),
        message: err.to_string(),
    }
}

fn document_not_found(document_id: i64) -> ApiError {
    ApiError::not_found("Document", format!("Document {document_id} does not exist"))
}

/// Generates, regenerates and removes order documents.
pub struct DocumentLifecycle {
    persistence: SharedPersistence,
    renderer: Arc<dyn DocumentRenderer>,
    blobs: Arc<dyn BlobStore>,
}

impl DocumentLifecycle {
    #[must_use]
    pub fn new(
        persistence: SharedPersistence,
        renderer: Arc<dyn DocumentRenderer>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            persistence,
            renderer,
            blobs,
        }
    }

    /// Materializes a quote or purchase order for an order, replacing any
    /// existing document of the same type and vendor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for bad input, `ResourceNotFound` for an
    /// unknown order, or `ExternalService` if rendering or storage fails.
    /// No document row changes on error.
    pub async fn materialize(
        &self,
        order_id: i64,
        request: &GenerateDocumentRequest,
    ) -> Result<DocumentInfo, ApiError> {
        let document_type: DocumentType =
            request.document_type.parse().map_err(translate_domain_error)?;
        let key: DocumentKey = DocumentKey::new(order_id, document_type, request.vendor_id)
            .map_err(translate_domain_error)?;

        self.generate(
            key,
            &request.edits,
            request.discount.unwrap_or(Decimal::ZERO),
            request.tax.unwrap_or(Decimal::ZERO),
        )
        .await
    }

    /// Rebuilds a document from the order's current data.
    ///
    /// The type and vendor come from the existing document, as do the
    /// discount and tax unless the request overrides them.
    ///
    /// # Errors
    ///
    /// As for `materialize`, plus `ResourceNotFound` for an unknown
    /// document.
    pub async fn regenerate(
        &self,
        document_id: i64,
        request: &RegenerateDocumentRequest,
    ) -> Result<DocumentInfo, ApiError> {
        let existing: GeneratedDocument = self
            .persistence
            .lock()
            .await
            .get_document(document_id)?
            .ok_or_else(|| document_not_found(document_id))?;

        self.generate(
            existing.key,
            &request.edits,
            request.discount.unwrap_or(existing.metadata.discount),
            request.tax.unwrap_or(existing.metadata.tax),
        )
        .await
    }

    async fn generate(
        &self,
        key: DocumentKey,
        edits: &[LineEdit],
        discount: Decimal,
        tax: Decimal,
    ) -> Result<DocumentInfo, ApiError> {
        let (order, lines): (Order, Vec<OrderLine>) = {
            let mut persistence = self.persistence.lock().await;
            let order: Order = persistence.get_order(key.order_id)?.ok_or_else(|| {
                ApiError::not_found("Order", format!("Order {} does not exist", key.order_id))
            })?;
            let lines: Vec<OrderLine> = persistence.get_order_lines(key.order_id)?;
            (order, lines)
        };

        let snapshot: PriceSnapshot =
            price_lines(key.document_type, key.vendor_id, &lines, edits, discount, tax)
                .map_err(translate_domain_error)?;
        let generated_at: String = rfc3339(OffsetDateTime::now_utc())?;
        let document_number: String = key.document_number(&order.order_number);

        let content: DocumentContent = DocumentContent {
            document_number: document_number.clone(),
            document_type: key.document_type,
            order_number: order.order_number.value().to_string(),
            vendor_id: key.vendor_id,
            generated_at: generated_at.clone(),
            snapshot: snapshot.clone(),
        };
        let bytes: Vec<u8> = self
            .renderer
            .render(&content)
            .await
            .map_err(|e| external("document_renderer", &e))?;

        // Each generation gets its own blob so the old one stays intact
        // until the row swap commits.
        let blob_key: String = format!(
            "orders/{}/{document_number}-{:016x}.json",
            key.order_id,
            rand::random::<u64>()
        );
        let file_ref: String = self
            .blobs
            .put(&blob_key, bytes)
            .await
            .map_err(|e| external("blob_store", &e))?;

        let document: GeneratedDocument = GeneratedDocument {
            document_id: None,
            key,
            document_number,
            status: DocumentStatus::Draft,
            file_ref,
            metadata: DocumentMetadata {
                item_count: snapshot.lines.len(),
                generated_at: generated_at.clone(),
                discount,
                tax,
                snapshot,
            },
            created_at: generated_at,
        };

        let replaced: Result<DocumentReplacement, ApiError> = self
            .persistence
            .lock()
            .await
            .replace_document(&document)
            .map_err(ApiError::from);

        let replacement: DocumentReplacement = match replaced {
            Ok(replacement) => replacement,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&document.file_ref).await {
                    warn!(file_ref = %document.file_ref, error = %cleanup, "Failed to remove unused blob");
                }
                return Err(e);
            }
        };

        if let Some(old) = &replacement.replaced {
            if let Err(e) = self.blobs.delete(&old.file_ref).await {
                warn!(file_ref = %old.file_ref, error = %e, "Failed to remove replaced document blob");
            }
        }

        info!(
            order_id = replacement.document.key.order_id,
            document_number = %replacement.document.document_number,
            replaced = replacement.replaced.is_some(),
            "Generated document"
        );
        Ok(DocumentInfo::from(replacement.document))
    }

    /// Deletes a document and its artifact.
    ///
    /// The artifact goes first: if the blob store fails nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `ExternalService`.
    pub async fn delete(&self, document_id: i64) -> Result<DocumentInfo, ApiError> {
        let existing: GeneratedDocument = self
            .persistence
            .lock()
            .await
            .get_document(document_id)?
            .ok_or_else(|| document_not_found(document_id))?;

        self.blobs
            .delete(&existing.file_ref)
            .await
            .map_err(|e| external("blob_store", &e))?;

        let deleted: GeneratedDocument = self
            .persistence
            .lock()
            .await
            .delete_document(document_id)?
            .ok_or_else(|| document_not_found(document_id))?;

        info!(document_id, "Deleted document");
        Ok(DocumentInfo::from(deleted))
    }

    /// Reads a document.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown document.
    pub async fn get(&self, document_id: i64) -> Result<DocumentInfo, ApiError> {
        self.persistence
            .lock()
            .await
            .get_document(document_id)?
            .map(DocumentInfo::from)
            .ok_or_else(|| document_not_found(document_id))
    }

    /// Lists the documents of an order, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list(&self, order_id: i64) -> Result<Vec<DocumentInfo>, ApiError> {
        Ok(self
            .persistence
            .lock()
            .await
            .list_documents(order_id)?
            .into_iter()
            .map(DocumentInfo::from)
            .collect())
    }

    /// Moves a document along its status lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `InvalidTransition`, `ResourceNotFound`, or
    /// `Conflict` if the status changed concurrently.
    pub async fn update_status(
        &self,
        document_id: i64,
        request: &UpdateDocumentStatusRequest,
    ) -> Result<DocumentInfo, ApiError> {
        let new_status: DocumentStatus = request.status.parse().map_err(translate_domain_error)?;

        let mut persistence = self.persistence.lock().await;
        let existing: GeneratedDocument = persistence
            .get_document(document_id)?
            .ok_or_else(|| document_not_found(document_id))?;
        existing
            .status
            .validate_transition(new_status)
            .map_err(translate_domain_error)?;

        if !persistence.update_document_status(document_id, existing.status, new_status)? {
            return Err(ApiError::Conflict {
                message: String::from("The document's status changed; refetch and retry"),
                current: None,
            });
        }

        let mut updated: GeneratedDocument = existing;
        updated.status = new_status;
        Ok(DocumentInfo::from(updated))
    }
}
