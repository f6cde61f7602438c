// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! External collaborators: the document renderer, the blob store and the
//! email gateway.
//!
//! Each is a trait object so the workflows can run against fakes in tests.
//! The bundled implementations are the ones the server wires up by
//! default.

use async_trait::async_trait;
use promo_ops_domain::{DocumentType, PriceSnapshot};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Failures reported by a collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("render failed: {0}")]
    Render(String),
    #[error("storage failed: {0}")]
    Storage(String),
    #[error("email delivery failed: {0}")]
    Email(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structured input to the document renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContent {
    pub document_number: String,
    pub document_type: DocumentType,
    pub order_number: String,
    pub vendor_id: Option<i64>,
    pub generated_at: String,
    pub snapshot: PriceSnapshot,
}

/// An outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Turns document content into the bytes of a rendered artifact.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, content: &DocumentContent) -> Result<Vec<u8>, CollaboratorError>;
}

/// Durable storage for rendered artifacts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the reference to persist.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, CollaboratorError>;

    /// Removes a stored artifact. Removing a missing artifact succeeds.
    async fn delete(&self, file_ref: &str) -> Result<(), CollaboratorError>;
}

/// Outbound mail transport.
#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), CollaboratorError>;
}

/// Renders the price snapshot as pretty-printed JSON.
///
/// Page layout belongs to a real renderer; this keeps the artifact
/// faithful to what was priced.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotRenderer;

#[async_trait]
impl DocumentRenderer for JsonSnapshotRenderer {
    async fn render(&self, content: &DocumentContent) -> Result<Vec<u8>, CollaboratorError> {
        serde_json::to_vec_pretty(content).map_err(|e| CollaboratorError::Render(e.to_string()))
    }
}

/// Stores artifacts as files under a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolves a key to a path below the root, rejecting keys that could
    /// escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf, CollaboratorError> {
        let relative: &Path = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(CollaboratorError::Storage(format!("invalid blob key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, CollaboratorError> {
        let path: PathBuf = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), "Stored blob");
        Ok(key.to_string())
    }

    async fn delete(&self, file_ref: &str) -> Result<(), CollaboratorError> {
        let path: PathBuf = self.resolve(file_ref)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes outbound mail to the log instead of a transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEmailGateway;

#[async_trait]
impl EmailGateway for TracingEmailGateway {
    async fn send(&self, message: &EmailMessage) -> Result<(), CollaboratorError> {
        info!(to = %message.to, subject = %message.subject, "Outbound email");
        debug!(body = %message.body, "Outbound email body");
        Ok(())
    }
}
