// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the order lifecycle core.
//!
//! A single `SQLite` database, managed through Diesel, holds orders and
//! their lines, the order activity log, approvals, generated documents,
//! notifications and the users directory. Migrations are embedded in the
//! binary and applied on open.
//!
//! ## Concurrency
//!
//! Every invariant that two concurrent requests could break is enforced
//! by the database, not by a read-then-write in the caller:
//!
//! - production and status updates are conditional on the state the
//!   caller read (`update_production`, `update_order_status`)
//! - at most one pending approval per subject (`pending_key` is unique)
//! - a decision is recorded only while the approval is pending
//! - one document per `(order, type, vendor)` slot
//! - one notification per `(order, recipient, type, day)`
//!
//! ## Testing
//!
//! `Persistence::new_in_memory` gives each caller its own shared-cache
//! in-memory database, so tests never observe each other's rows.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use promo_ops_audit::AuditEvent;
use promo_ops_domain::{
    Approval, ApprovalDecision, ApprovalSubject, ApprovalToken, DocumentKey, DocumentStatus,
    GeneratedDocument, Notification, NotificationType, Order, OrderLine, OrderStatus,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::Date;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    ActivityRecord, DocumentReplacement, FollowUp, PendingInsert, UserRecord, encode_date,
    encode_stage_data, encode_stages,
};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// The persistence store.
///
/// Holds one `SQLite` connection; callers share it behind a mutex.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a store backed by a fresh, isolated in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a store backed by a database file, created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Adds a user to the directory and returns the new id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_user(&mut self, email: &str, display_name: &str) -> Result<i64, PersistenceError> {
        mutations::users::create_user(&mut self.conn, email, display_name)
    }

    /// Retrieves a user from the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<UserRecord>, PersistenceError> {
        queries::users::get_user(&mut self.conn, user_id)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Inserts an order with its lines and returns the new order id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateOrderNumber` if the order number
    /// is taken, or another error if the insert fails.
    pub fn create_order(
        &mut self,
        order: &Order,
        lines: &[OrderLine],
    ) -> Result<i64, PersistenceError> {
        mutations::orders::create_order(&mut self.conn, order, lines)
    }

    /// Retrieves an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is corrupt.
    pub fn get_order(&mut self, order_id: i64) -> Result<Option<Order>, PersistenceError> {
        queries::orders::get_order(&mut self.conn, order_id)
    }

    /// Retrieves the lines of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored rows are corrupt.
    pub fn get_order_lines(&mut self, order_id: i64) -> Result<Vec<OrderLine>, PersistenceError> {
        queries::orders::get_order_lines(&mut self.conn, order_id)
    }

    /// Conditionally writes a new production state.
    ///
    /// The write applies only while the stored current stage, completed
    /// stages and stage data still equal `previous`. The audit events are
    /// written in the same transaction.
    ///
    /// # Returns
    ///
    /// False if the stored state no longer matches `previous`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn update_production(
        &mut self,
        previous: &Order,
        next: &Order,
        events: &[AuditEvent],
    ) -> Result<bool, PersistenceError> {
        mutations::orders::update_production(&mut self.conn, previous, next, events)
    }

    /// Conditionally moves an order between statuses.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn update_order_status(
        &mut self,
        order_id: i64,
        expected: OrderStatus,
        new_status: OrderStatus,
        events: &[AuditEvent],
    ) -> Result<bool, PersistenceError> {
        mutations::orders::update_order_status(
            &mut self.conn,
            order_id,
            expected,
            new_status,
            events,
        )
    }

    /// Replaces the follow-up fields of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn update_follow_up(
        &mut self,
        order_id: i64,
        follow_up: &FollowUp,
    ) -> Result<bool, PersistenceError> {
        mutations::orders::update_follow_up(&mut self.conn, order_id, follow_up)
    }

    /// Retrieves every order whose next action date is `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_orders_due(&mut self, date: Date) -> Result<Vec<Order>, PersistenceError> {
        queries::orders::list_orders_due_on(&mut self.conn, date)
    }

    /// Retrieves the activity log of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_activity(&mut self, order_id: i64) -> Result<Vec<ActivityRecord>, PersistenceError> {
        queries::activity::list_activity(&mut self.conn, order_id)
    }

    // ========================================================================
    // Approvals
    // ========================================================================

    /// Stores a pending approval unless the subject already has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_pending_approval(
        &mut self,
        approval: &Approval,
    ) -> Result<PendingInsert, PersistenceError> {
        mutations::approvals::insert_pending_approval(&mut self.conn, approval)
    }

    /// Retrieves the pending approval of a subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_pending_approval(
        &mut self,
        subject: &ApprovalSubject,
    ) -> Result<Option<Approval>, PersistenceError> {
        queries::approvals::find_pending_approval(&mut self.conn, subject)
    }

    /// Retrieves an approval by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_approval_by_token(
        &mut self,
        token: &ApprovalToken,
    ) -> Result<Option<Approval>, PersistenceError> {
        queries::approvals::get_approval_by_token(&mut self.conn, token)
    }

    /// Records a decision if the approval is still pending.
    ///
    /// # Returns
    ///
    /// False if nothing was pending under `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn decide_approval(
        &mut self,
        token: &ApprovalToken,
        decision: ApprovalDecision,
        decided_at: &str,
        notes: Option<&str>,
    ) -> Result<bool, PersistenceError> {
        mutations::approvals::decide_approval(&mut self.conn, token, decision, decided_at, notes)
    }

    /// Retrieves the approval history of a subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_approvals_for_subject(
        &mut self,
        subject: &ApprovalSubject,
    ) -> Result<Vec<Approval>, PersistenceError> {
        queries::approvals::list_approvals_for_subject(&mut self.conn, subject)
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Stores a document in its slot, replacing the previous occupant.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn replace_document(
        &mut self,
        document: &GeneratedDocument,
    ) -> Result<DocumentReplacement, PersistenceError> {
        mutations::documents::replace_document(&mut self.conn, document)
    }

    /// Retrieves a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_document(
        &mut self,
        document_id: i64,
    ) -> Result<Option<GeneratedDocument>, PersistenceError> {
        queries::documents::get_document(&mut self.conn, document_id)
    }

    /// Retrieves the document occupying a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_document(
        &mut self,
        key: &DocumentKey,
    ) -> Result<Option<GeneratedDocument>, PersistenceError> {
        queries::documents::find_document_by_key(&mut self.conn, key)
    }

    /// Retrieves the documents of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_documents(
        &mut self,
        order_id: i64,
    ) -> Result<Vec<GeneratedDocument>, PersistenceError> {
        queries::documents::list_documents(&mut self.conn, order_id)
    }

    /// Deletes a document row and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_document(
        &mut self,
        document_id: i64,
    ) -> Result<Option<GeneratedDocument>, PersistenceError> {
        mutations::documents::delete_document(&mut self.conn, document_id)
    }

    /// Conditionally moves a document between statuses.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn update_document_status(
        &mut self,
        document_id: i64,
        expected: DocumentStatus,
        new_status: DocumentStatus,
    ) -> Result<bool, PersistenceError> {
        mutations::documents::update_document_status(
            &mut self.conn,
            document_id,
            expected,
            new_status,
        )
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Returns true if the recipient was already notified about the order
    /// on `dispatch_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn notification_exists(
        &mut self,
        order_id: i64,
        recipient_id: i64,
        notification_type: NotificationType,
        dispatch_date: Date,
    ) -> Result<bool, PersistenceError> {
        queries::notifications::notification_exists(
            &mut self.conn,
            order_id,
            recipient_id,
            notification_type,
            dispatch_date,
        )
    }

    /// Inserts a notification, or returns `None` if it is a same-day
    /// duplicate.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_notification(
        &mut self,
        notification: &Notification,
    ) -> Result<Option<i64>, PersistenceError> {
        mutations::notifications::insert_notification(&mut self.conn, notification)
    }

    /// Retrieves a recipient's notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_notifications(
        &mut self,
        recipient_id: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>, PersistenceError> {
        queries::notifications::list_notifications(&mut self.conn, recipient_id, unread_only)
    }

    /// Marks a notification read and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn mark_notification_read(
        &mut self,
        notification_id: i64,
    ) -> Result<Option<Notification>, PersistenceError> {
        if !mutations::notifications::mark_notification_read(&mut self.conn, notification_id)? {
            return Ok(None);
        }
        queries::notifications::get_notification(&mut self.conn, notification_id)
    }
}
