// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod document_tests;
mod notification_tests;
mod production_tests;

use crate::collaborators::{
    BlobStore, CollaboratorError, DocumentContent, DocumentRenderer, EmailGateway, EmailMessage,
};
use crate::production::create_order;
use crate::request_response::{CreateOrderRequest, OrderLineInput, OrderResponse};
use crate::SharedPersistence;
use async_trait::async_trait;
use promo_ops_audit::{Actor, Cause};
use promo_ops_domain::StageCatalog;
use promo_ops_persistence::Persistence;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_shared_persistence() -> SharedPersistence {
    Arc::new(tokio::sync::Mutex::new(create_test_persistence()))
}

pub fn create_test_actor() -> Actor {
    Actor::user("csr-1")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api"), String::from("Test request"))
}

pub fn create_order_request(number: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        order_number: number.to_string(),
        lines: vec![
            OrderLineInput {
                vendor_id: Some(7),
                description: String::from("Embroidered caps"),
                quantity: Some(48),
                unit_price: Some(Decimal::new(1250, 2)),
                unit_cost: Some(Decimal::new(800, 2)),
            },
            OrderLineInput {
                vendor_id: Some(9),
                description: String::from("Printed totes"),
                quantity: None,
                unit_price: Some(Decimal::new(600, 2)),
                unit_cost: None,
            },
        ],
        next_action_date: None,
        next_action_notes: None,
        assigned_user_id: None,
        production_manager_id: None,
        csr_user_id: None,
    }
}

pub fn create_test_order(persistence: &mut Persistence, number: &str) -> OrderResponse {
    create_order(
        persistence,
        &StageCatalog::standard(),
        &create_order_request(number),
    )
    .unwrap()
}

/// Records every message and optionally fails all sends.
#[derive(Default)]
pub struct RecordingEmailGateway {
    pub sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingEmailGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.to.clone())
            .collect()
    }
}

#[async_trait]
impl EmailGateway for RecordingEmailGateway {
    async fn send(&self, message: &EmailMessage) -> Result<(), CollaboratorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(CollaboratorError::Email(String::from("smtp unavailable")));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Keeps blobs in memory; puts and deletes can be made to fail.
#[derive(Default)]
pub struct InMemoryBlobStore {
    pub blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    pub fail_puts: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, CollaboratorError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Storage(String::from("bucket full")));
        }
        self.blobs.lock().unwrap().insert(key.to_string(), bytes);
        Ok(key.to_string())
    }

    async fn delete(&self, file_ref: &str) -> Result<(), CollaboratorError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Storage(String::from("bucket offline")));
        }
        self.blobs.lock().unwrap().remove(file_ref);
        Ok(())
    }
}

/// Renders the snapshot as JSON, or fails when switched.
#[derive(Default)]
pub struct SwitchableRenderer {
    pub fail: AtomicBool,
}

#[async_trait]
impl DocumentRenderer for SwitchableRenderer {
    async fn render(&self, content: &DocumentContent) -> Result<Vec<u8>, CollaboratorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Render(String::from("template missing")));
        }
        serde_json::to_vec(content).map_err(|e| CollaboratorError::Render(e.to_string()))
    }
}
