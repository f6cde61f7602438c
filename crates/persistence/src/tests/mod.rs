// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod approval_tests;

use crate::Persistence;
use promo_ops_audit::{Action, Actor, AuditEvent, Cause, OrderSnapshot};
use promo_ops_domain::{
    Approval, ApprovalStatus, ApprovalSubject, ApprovalToken, DocumentKey, DocumentMetadata,
    DocumentStatus, DocumentType, GeneratedDocument, Order, OrderLine, OrderNumber,
    PriceSnapshot, StageCatalog, SubjectType,
};
use rust_decimal::Decimal;

pub fn create_test_order(persistence: &mut Persistence, number: &str) -> Order {
    let mut order = Order::new(
        OrderNumber::new(number).unwrap(),
        &StageCatalog::standard(),
    );
    let lines = vec![
        OrderLine {
            line_id: None,
            vendor_id: Some(7),
            description: String::from("Embroidered caps"),
            quantity: Some(48),
            unit_price: Some(Decimal::new(1250, 2)),
            unit_cost: Some(Decimal::new(800, 2)),
        },
        OrderLine {
            line_id: None,
            vendor_id: None,
            description: String::from("Setup fee"),
            quantity: None,
            unit_price: Some(Decimal::new(4500, 2)),
            unit_cost: None,
        },
    ];
    let order_id = persistence.create_order(&order, &lines).unwrap();
    order.order_id = Some(order_id);
    order
}

pub fn create_test_event(before: &Order, after: &Order, name: &str) -> AuditEvent {
    AuditEvent::new(
        before.order_id,
        Actor::user("u-1"),
        Cause::new(String::from("test"), String::from("Test change")),
        Action::new(String::from(name), None),
        OrderSnapshot::of(before),
        OrderSnapshot::of(after),
    )
}

pub fn create_test_approval(subject_id: &str, entropy: u128) -> Approval {
    Approval {
        approval_id: None,
        subject: ApprovalSubject::new(SubjectType::Quote, subject_id).unwrap(),
        token: ApprovalToken::from_entropy(entropy, entropy.wrapping_mul(31)),
        status: ApprovalStatus::Pending,
        client_email: String::from("buyer@example.com"),
        client_name: String::from("Pat Buyer"),
        sent_at: String::from("2026-03-04T10:00:00Z"),
        decided_at: None,
        decision_notes: None,
    }
}

pub fn create_test_document(
    order_id: i64,
    document_type: DocumentType,
    vendor_id: Option<i64>,
    file_ref: &str,
) -> GeneratedDocument {
    let key = DocumentKey::new(order_id, document_type, vendor_id).unwrap();
    let order_number = OrderNumber::new("SO-1").unwrap();
    GeneratedDocument {
        document_id: None,
        document_number: key.document_number(&order_number),
        key,
        status: DocumentStatus::Draft,
        file_ref: String::from(file_ref),
        metadata: DocumentMetadata {
            item_count: 0,
            generated_at: String::from("2026-03-04T10:00:00Z"),
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            snapshot: PriceSnapshot {
                lines: Vec::new(),
                subtotal: Decimal::ZERO,
                discount: Decimal::ZERO,
                tax: Decimal::ZERO,
                total: Decimal::ZERO,
            },
        },
        created_at: String::from("2026-03-04T10:00:00Z"),
    }
}
