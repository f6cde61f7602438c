// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod notification_routes_tests;

use crate::actor::ACTOR_HEADER;
use crate::{AppState, Collaborators, build_router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use promo_ops_api::{
    FilesystemBlobStore, JsonSnapshotRenderer, SchedulerConfig, TracingEmailGateway,
};
use promo_ops_domain::StageCatalog;
use promo_ops_persistence::Persistence;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

/// A router over an in-memory store and a throwaway blob directory.
pub struct TestApp {
    pub router: Router,
    pub blob_dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.blob_dir);
    }
}

pub fn create_test_app() -> TestApp {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    let blob_dir: PathBuf =
        std::env::temp_dir().join(format!("promo-ops-server-{:016x}", rand::random::<u64>()));

    let app_state: AppState = AppState::new(
        persistence,
        StageCatalog::standard(),
        Collaborators {
            renderer: Arc::new(JsonSnapshotRenderer),
            blobs: Arc::new(FilesystemBlobStore::new(blob_dir.clone())),
            email: Arc::new(TracingEmailGateway),
        },
        "https://portal.example.com",
        SchedulerConfig::default(),
    );

    TestApp {
        router: build_router(app_state),
        blob_dir,
    }
}

/// Sends one request as actor `csr-7` and returns the status and JSON body.
pub async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_HEADER, "csr-7");
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Creates order `number` with one vendor-7 line and one vendor-9 line.
pub async fn create_order(app: &TestApp, number: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/orders",
        Some(json!({
            "orderNumber": number,
            "lines": [
                {
                    "vendorId": 7,
                    "description": "Embroidered caps",
                    "quantity": 48,
                    "unitPrice": "12.50",
                    "unitCost": "8.00"
                },
                {
                    "vendorId": 9,
                    "description": "Printed totes",
                    "quantity": 100,
                    "unitPrice": "6.00"
                }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["orderId"].as_i64().unwrap()
}
