// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::multiple_crate_versions)]

mod actor;
mod handlers;
mod http_error;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    routing::{get, patch, post},
};
use clap::Parser;
use promo_ops_api::{
    ApprovalWorkflow, BlobStore, DocumentLifecycle, DocumentRenderer, EmailGateway,
    FilesystemBlobStore, JsonSnapshotRenderer, NotificationScheduler, SchedulerConfig,
    SharedPersistence, TracingEmailGateway,
};
use promo_ops_domain::{StageCatalog, StageDefinition};
use promo_ops_persistence::Persistence;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use time::UtcOffset;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::handlers::{
    handle_advance_stage, handle_complete_stage, handle_create_order, handle_create_user,
    handle_decide_approval, handle_delete_document, handle_generate_document,
    handle_get_approval, handle_get_document, handle_get_order, handle_issue_approval,
    handle_list_activity, handle_list_approvals, handle_list_documents,
    handle_list_notifications, handle_mark_notification_read, handle_patch_production,
    handle_regenerate_document, handle_run_notifications_now, handle_update_document_status,
    handle_update_next_action, handle_update_status,
};

/// Promo Ops Server - HTTP server for the order lifecycle core
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Root directory for rendered document artifacts
    #[arg(long, default_value = "./blobs")]
    blob_dir: PathBuf,

    /// Base URL of the public approval pages. Defaults to the local listen address.
    #[arg(long)]
    public_base_url: Option<String>,

    /// JSON file holding the ordered stage catalog. Uses the built-in catalog if omitted.
    #[arg(long)]
    stage_catalog: Option<PathBuf>,

    /// Seconds between notification scheduler ticks
    #[arg(long, default_value_t = 3600)]
    scheduler_interval_secs: u64,

    /// Seconds one order may take within a scheduler tick
    #[arg(long, default_value_t = 30)]
    scheduler_order_budget_secs: u64,

    /// UTC offset, in minutes, whose calendar day the scheduler uses as "today"
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    utc_offset_minutes: i32,

    /// Do not start the notification scheduler
    #[arg(long)]
    disable_scheduler: bool,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The store, shared with the workflows and the scheduler.
    pub persistence: SharedPersistence,
    pub catalog: Arc<StageCatalog>,
    pub approvals: Arc<ApprovalWorkflow>,
    pub documents: Arc<DocumentLifecycle>,
    pub scheduler: NotificationScheduler,
}

/// The external collaborators the workflows talk to.
pub struct Collaborators {
    pub renderer: Arc<dyn DocumentRenderer>,
    pub blobs: Arc<dyn BlobStore>,
    pub email: Arc<dyn EmailGateway>,
}

impl AppState {
    /// Wires the workflows around one shared store.
    #[must_use]
    pub fn new(
        persistence: Persistence,
        catalog: StageCatalog,
        collaborators: Collaborators,
        public_base_url: &str,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        let persistence: SharedPersistence = Arc::new(Mutex::new(persistence));
        let Collaborators {
            renderer,
            blobs,
            email,
        } = collaborators;

        Self {
            approvals: Arc::new(ApprovalWorkflow::new(
                Arc::clone(&persistence),
                Arc::clone(&email),
                public_base_url,
            )),
            documents: Arc::new(DocumentLifecycle::new(
                Arc::clone(&persistence),
                renderer,
                blobs,
            )),
            scheduler: NotificationScheduler::new(
                Arc::clone(&persistence),
                email,
                scheduler_config,
            ),
            catalog: Arc::new(catalog),
            persistence,
        }
    }
}

/// Loads a stage catalog from a JSON array of stage definitions.
fn load_stage_catalog(path: &Path) -> Result<StageCatalog, Box<dyn std::error::Error>> {
    let raw: String = std::fs::read_to_string(path)?;
    let definitions: Vec<StageDefinition> = serde_json::from_str(&raw)?;
    Ok(StageCatalog::new(definitions)?)
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/approvals",
            post(handle_issue_approval).get(handle_list_approvals),
        )
        .route(
            "/approvals/{token}",
            get(handle_get_approval).patch(handle_decide_approval),
        )
        .route("/orders", post(handle_create_order))
        .route("/orders/{id}", get(handle_get_order))
        .route("/orders/{id}/production", patch(handle_patch_production))
        .route(
            "/orders/{id}/production/complete",
            post(handle_complete_stage),
        )
        .route("/orders/{id}/production/advance", post(handle_advance_stage))
        .route("/orders/{id}/status", patch(handle_update_status))
        .route("/orders/{id}/next-action", patch(handle_update_next_action))
        .route("/orders/{id}/activity", get(handle_list_activity))
        .route(
            "/orders/{id}/documents",
            post(handle_generate_document).get(handle_list_documents),
        )
        .route(
            "/documents/{id}",
            get(handle_get_document).delete(handle_delete_document),
        )
        .route(
            "/documents/{id}/regenerate",
            post(handle_regenerate_document),
        )
        .route("/documents/{id}/status", patch(handle_update_document_status))
        .route("/notifications", get(handle_list_notifications))
        .route(
            "/notifications/{id}/read",
            patch(handle_mark_notification_read),
        )
        .route(
            "/admin/notifications/run-now",
            post(handle_run_notifications_now),
        )
        .route("/users", post(handle_create_user))
        .with_state(app_state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Promo Ops Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let catalog: StageCatalog = match &args.stage_catalog {
        Some(path) => {
            info!(path = %path.display(), "Loading stage catalog");
            load_stage_catalog(path)?
        }
        None => StageCatalog::standard(),
    };
    info!(stages = catalog.stages().len(), "Stage catalog ready");

    let scheduler_config: SchedulerConfig = SchedulerConfig {
        interval: Duration::from_secs(args.scheduler_interval_secs.max(1)),
        order_budget: Duration::from_secs(args.scheduler_order_budget_secs.max(1)),
        utc_offset: UtcOffset::from_whole_seconds(args.utc_offset_minutes.saturating_mul(60))?,
    };

    let public_base_url: String = args
        .public_base_url
        .clone()
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", args.port));

    let collaborators: Collaborators = Collaborators {
        renderer: Arc::new(JsonSnapshotRenderer),
        blobs: Arc::new(FilesystemBlobStore::new(args.blob_dir.clone())),
        email: Arc::new(TracingEmailGateway),
    };
    info!(blob_dir = %args.blob_dir.display(), "Using filesystem blob store");

    let app_state: AppState = AppState::new(
        persistence,
        catalog,
        collaborators,
        &public_base_url,
        scheduler_config,
    );

    let scheduler_task: Option<JoinHandle<()>> = if args.disable_scheduler {
        info!("Notification scheduler disabled");
        None
    } else {
        Some(app_state.scheduler.start())
    };

    let app: Router = build_router(app_state.clone());

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    app_state.scheduler.stop();
    if let Some(task) = scheduler_task {
        task.await?;
    }

    info!("Server stopped");
    Ok(())
}
