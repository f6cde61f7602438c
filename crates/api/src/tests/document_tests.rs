// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{InMemoryBlobStore, SwitchableRenderer, create_test_order, create_test_persistence};
use crate::SharedPersistence;
use crate::documents::DocumentLifecycle;
use crate::error::ApiError;
use crate::request_response::{
    GenerateDocumentRequest, RegenerateDocumentRequest, UpdateDocumentStatusRequest,
};
use promo_ops_domain::{DocumentStatus, DocumentType, LineEdit};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::Ordering;

struct Fixture {
    lifecycle: DocumentLifecycle,
    blobs: Arc<InMemoryBlobStore>,
    renderer: Arc<SwitchableRenderer>,
    order_id: i64,
    line_ids: Vec<i64>,
}

fn fixture() -> Fixture {
    let mut persistence = create_test_persistence();
    let order = create_test_order(&mut persistence, "SO-1001");
    let line_ids: Vec<i64> = order
        .lines
        .unwrap()
        .iter()
        .map(|l| l.line_id.unwrap())
        .collect();
    let shared: SharedPersistence = Arc::new(tokio::sync::Mutex::new(persistence));

    let blobs = Arc::new(InMemoryBlobStore::default());
    let renderer = Arc::new(SwitchableRenderer::default());
    Fixture {
        lifecycle: DocumentLifecycle::new(shared, renderer.clone(), blobs.clone()),
        blobs,
        renderer,
        order_id: order.order_id.unwrap(),
        line_ids,
    }
}

fn quote_request() -> GenerateDocumentRequest {
    GenerateDocumentRequest {
        document_type: String::from("quote"),
        vendor_id: None,
        edits: Vec::new(),
        discount: None,
        tax: None,
    }
}

#[tokio::test]
async fn test_quote_prices_every_line() {
    let f = fixture();
    let document = f.lifecycle.materialize(f.order_id, &quote_request()).await.unwrap();

    assert_eq!(document.document_number, "Q-SO-1001");
    assert_eq!(document.status, DocumentStatus::Draft);
    assert_eq!(document.metadata.item_count, 2);
    // 48 x 12.50 + 1 x 6.00
    assert_eq!(document.metadata.snapshot.subtotal, Decimal::new(60600, 2));
    assert_eq!(f.blobs.keys(), vec![document.file_ref.clone()]);
}

#[tokio::test]
async fn test_purchase_order_prefers_edits_then_cost() {
    let f = fixture();
    let request = GenerateDocumentRequest {
        document_type: String::from("purchase_order"),
        vendor_id: Some(7),
        edits: vec![LineEdit {
            line_id: f.line_ids[0],
            unit_price: Some(Decimal::new(500, 2)),
            quantity: None,
        }],
        discount: None,
        tax: None,
    };
    let document = f.lifecycle.materialize(f.order_id, &request).await.unwrap();

    assert_eq!(document.document_number, "PO-SO-1001-7");
    let lines = &document.metadata.snapshot.lines;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].unit_price, Decimal::new(500, 2));
    assert_eq!(lines[0].line_total, Decimal::new(24000, 2));

    // Vendor 9's line has no cost and no quantity: list price, zero total.
    let request = GenerateDocumentRequest {
        vendor_id: Some(9),
        edits: Vec::new(),
        ..request
    };
    let document = f.lifecycle.materialize(f.order_id, &request).await.unwrap();
    let line = &document.metadata.snapshot.lines[0];
    assert_eq!(line.unit_price, Decimal::new(600, 2));
    assert_eq!(line.quantity, 0);
    assert_eq!(line.line_total, Decimal::ZERO);
}

#[tokio::test]
async fn test_vendor_rules_are_enforced() {
    let f = fixture();

    let mut request = quote_request();
    request.vendor_id = Some(7);
    assert!(matches!(
        f.lifecycle.materialize(f.order_id, &request).await,
        Err(ApiError::InvalidInput { .. })
    ));

    request.document_type = String::from("purchase_order");
    request.vendor_id = None;
    assert!(matches!(
        f.lifecycle.materialize(f.order_id, &request).await,
        Err(ApiError::InvalidInput { .. })
    ));
    assert!(f.blobs.keys().is_empty());
}

#[tokio::test]
async fn test_regenerations_keep_one_row_and_one_blob() {
    let f = fixture();
    let first = f.lifecycle.materialize(f.order_id, &quote_request()).await.unwrap();

    let mut latest = first.clone();
    for _ in 0..3 {
        latest = f
            .lifecycle
            .regenerate(
                latest.document_id.unwrap(),
                &RegenerateDocumentRequest::default(),
            )
            .await
            .unwrap();
    }

    let documents = f.lifecycle.list(f.order_id).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].document_id, latest.document_id);
    assert_eq!(f.blobs.keys(), vec![latest.file_ref.clone()]);
    assert!(matches!(
        f.lifecycle.get(first.document_id.unwrap()).await,
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[tokio::test]
async fn test_regenerate_reuses_stored_discount_and_tax() {
    let f = fixture();
    let mut request = quote_request();
    request.discount = Some(Decimal::new(600, 2));
    request.tax = Some(Decimal::new(1000, 2));
    let first = f.lifecycle.materialize(f.order_id, &request).await.unwrap();
    assert_eq!(first.metadata.snapshot.total, Decimal::new(61000, 2));

    let again = f
        .lifecycle
        .regenerate(
            first.document_id.unwrap(),
            &RegenerateDocumentRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(again.metadata.discount, Decimal::new(600, 2));
    assert_eq!(again.metadata.tax, Decimal::new(1000, 2));
    assert_eq!(again.metadata.snapshot.total, first.metadata.snapshot.total);
}

#[tokio::test]
async fn test_render_failure_leaves_previous_document() {
    let f = fixture();
    let first = f.lifecycle.materialize(f.order_id, &quote_request()).await.unwrap();

    f.renderer.fail.store(true, Ordering::SeqCst);
    let result = f
        .lifecycle
        .regenerate(
            first.document_id.unwrap(),
            &RegenerateDocumentRequest::default(),
        )
        .await;
    assert!(matches!(result, Err(ApiError::ExternalService { .. })));

    let stored = f.lifecycle.get(first.document_id.unwrap()).await.unwrap();
    assert_eq!(stored, first);
    assert_eq!(f.blobs.keys(), vec![first.file_ref]);
}

#[tokio::test]
async fn test_storage_failure_leaves_previous_document() {
    let f = fixture();
    let first = f.lifecycle.materialize(f.order_id, &quote_request()).await.unwrap();

    f.blobs.fail_puts.store(true, Ordering::SeqCst);
    let result = f
        .lifecycle
        .regenerate(
            first.document_id.unwrap(),
            &RegenerateDocumentRequest::default(),
        )
        .await;
    assert!(matches!(result, Err(ApiError::ExternalService { .. })));

    let result = f.lifecycle.materialize(f.order_id, &quote_request()).await;
    assert!(matches!(result, Err(ApiError::ExternalService { .. })));

    let documents = f.lifecycle.list(f.order_id).await.unwrap();
    assert_eq!(documents, vec![first.clone()]);
    assert_eq!(f.blobs.keys(), vec![first.file_ref]);
}

#[tokio::test]
async fn test_failed_cleanup_of_replaced_blob_keeps_new_document() {
    let f = fixture();
    let first = f.lifecycle.materialize(f.order_id, &quote_request()).await.unwrap();

    f.blobs.fail_deletes.store(true, Ordering::SeqCst);
    let second = f
        .lifecycle
        .regenerate(
            first.document_id.unwrap(),
            &RegenerateDocumentRequest::default(),
        )
        .await
        .unwrap();

    assert_ne!(second.file_ref, first.file_ref);
    let documents = f.lifecycle.list(f.order_id).await.unwrap();
    assert_eq!(documents, vec![second.clone()]);

    // The old artifact is orphaned, not lost.
    let mut expected = vec![first.file_ref, second.file_ref];
    expected.sort();
    assert_eq!(f.blobs.keys(), expected);
}

#[tokio::test]
async fn test_unrepresentable_total_is_rejected_before_rendering() {
    let f = fixture();
    let mut request = quote_request();
    request.edits = vec![LineEdit {
        line_id: f.line_ids[0],
        unit_price: Some(Decimal::new(100_000_000_000, 0)),
        quantity: Some(i64::MAX),
    }];

    assert!(matches!(
        f.lifecycle.materialize(f.order_id, &request).await,
        Err(ApiError::InvalidInput { .. })
    ));
    assert!(f.blobs.keys().is_empty());
    assert!(f.lifecycle.list(f.order_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_removes_blob_then_row() {
    let f = fixture();
    let document = f.lifecycle.materialize(f.order_id, &quote_request()).await.unwrap();
    let document_id = document.document_id.unwrap();

    f.blobs.fail_deletes.store(true, Ordering::SeqCst);
    assert!(matches!(
        f.lifecycle.delete(document_id).await,
        Err(ApiError::ExternalService { .. })
    ));
    assert!(f.lifecycle.get(document_id).await.is_ok());

    f.blobs.fail_deletes.store(false, Ordering::SeqCst);
    f.lifecycle.delete(document_id).await.unwrap();
    assert!(f.blobs.keys().is_empty());
    assert!(f.lifecycle.list(f.order_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_document_status_transitions() {
    let f = fixture();
    let document = f.lifecycle.materialize(f.order_id, &quote_request()).await.unwrap();
    let document_id = document.document_id.unwrap();
    let status = |s: &str| UpdateDocumentStatusRequest {
        status: s.to_string(),
    };

    let sent = f.lifecycle.update_status(document_id, &status("sent")).await.unwrap();
    assert_eq!(sent.status, DocumentStatus::Sent);

    assert!(matches!(
        f.lifecycle.update_status(document_id, &status("draft")).await,
        Err(ApiError::InvalidTransition { .. })
    ));
    assert_eq!(
        f.lifecycle.get(document_id).await.unwrap().document_type,
        DocumentType::Quote
    );
}
