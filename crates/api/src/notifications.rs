// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The next-action notification scheduler and the notification inbox.
//!
//! A tick finds every order whose next action falls on the current
//! calendar day and, for each recipient, creates one in-app notification
//! and sends one email. The store's uniqueness constraint on
//! `(order, recipient, type, day)` makes repeated ticks on the same day
//! harmless, including ticks from other processes.

use promo_ops_domain::{
    Notification, NotificationType, Order, is_next_action_due, next_action_message,
    next_action_recipients,
};
use promo_ops_persistence::{Persistence, UserRecord};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use time::{Date, OffsetDateTime, UtcOffset};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::collaborators::{EmailGateway, EmailMessage};
use crate::error::ApiError;
use crate::request_response::{DispatchReport, NotificationInfo, TickOutcome};
use crate::{SharedPersistence, rfc3339};

/// Scheduler timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between ticks.
    pub interval: Duration,
    /// Wall-clock budget for processing one order within a tick.
    pub order_budget: Duration,
    /// Offset whose local date defines "today".
    pub utc_offset: UtcOffset,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            order_budget: Duration::from_secs(30),
            utc_offset: UtcOffset::UTC,
        }
    }
}

/// Clears the running flag when a tick ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct SchedulerInner {
    persistence: SharedPersistence,
    email: Arc<dyn EmailGateway>,
    config: SchedulerConfig,
    running: AtomicBool,
}

/// Periodically dispatches next-action notifications.
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct NotificationScheduler {
    inner: Arc<SchedulerInner>,
    shutdown: CancellationToken,
}

impl NotificationScheduler {
    #[must_use]
    pub fn new(
        persistence: SharedPersistence,
        email: Arc<dyn EmailGateway>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                persistence,
                email,
                config,
                running: AtomicBool::new(false),
            }),
            shutdown: CancellationToken::new(),
        }
    }

    /// Starts the timer loop: one tick immediately, then one per interval.
    ///
    /// Ticks that fall due while a tick is still running are skipped, not
    /// queued. The loop ends when `stop` is called.
    #[must_use]
    pub fn start(&self) -> JoinHandle<()> {
        let scheduler: Self = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.inner.config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(
                interval_secs = scheduler.inner.config.interval.as_secs(),
                "Notification scheduler started"
            );

            loop {
                tokio::select! {
                    () = scheduler.shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        match scheduler.tick(OffsetDateTime::now_utc()).await {
                            Ok(TickOutcome::Completed { report }) => {
                                info!(
                                    orders_scanned = report.orders_scanned,
                                    notifications_created = report.notifications_created,
                                    emails_sent = report.emails_sent,
                                    emails_failed = report.emails_failed,
                                    "Notification tick completed"
                                );
                            }
                            Ok(TickOutcome::Skipped) => debug!("Notification tick skipped"),
                            Err(e) => error!(error = %e, "Notification tick failed"),
                        }
                    }
                }
            }

            info!("Notification scheduler stopped");
        })
    }

    /// Stops the timer loop. A tick in progress runs to completion.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Runs one dispatch pass for the calendar day containing `now`.
    ///
    /// Returns `TickOutcome::Skipped` without doing anything if another
    /// tick is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the due orders cannot be listed. Failures while
    /// processing a single order are logged and the tick moves on.
    pub async fn tick(&self, now: OffsetDateTime) -> Result<TickOutcome, ApiError> {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(TickOutcome::Skipped);
        }
        let _guard: RunningGuard<'_> = RunningGuard(&self.inner.running);

        let today: Date = now.to_offset(self.inner.config.utc_offset).date();
        let created_at: String = rfc3339(now)?;

        let due: Vec<Order> = self.inner.persistence.lock().await.list_orders_due(today)?;

        let mut report: DispatchReport = DispatchReport::default();
        for order in due.iter().filter(|o| is_next_action_due(o, today)) {
            report.orders_scanned += 1;
            let dispatch = self.dispatch_order(order, today, &created_at, &mut report);
            match tokio::time::timeout(self.inner.config.order_budget, dispatch).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(order_id = ?order.order_id, error = %e, "Failed to dispatch notifications for order");
                }
                Err(_) => {
                    report.orders_timed_out += 1;
                    warn!(order_id = ?order.order_id, "Order exceeded its dispatch budget; abandoned");
                }
            }
        }

        Ok(TickOutcome::Completed { report })
    }

    async fn dispatch_order(
        &self,
        order: &Order,
        today: Date,
        created_at: &str,
        report: &mut DispatchReport,
    ) -> Result<(), ApiError> {
        let Some(order_id) = order.order_id else {
            return Ok(());
        };
        let (title, message) = next_action_message(order);

        for recipient_id in next_action_recipients(order) {
            let notification: Notification = Notification {
                notification_id: None,
                recipient_id,
                order_id,
                notification_type: NotificationType::NextActionDue,
                title: title.clone(),
                message: message.clone(),
                is_read: false,
                dispatch_date: today,
                created_at: created_at.to_string(),
            };

            let created: Created = {
                let mut persistence = self.inner.persistence.lock().await;
                create_notification(&mut persistence, &notification)?
            };
            let Created::New(user) = created else {
                report.recipients_skipped += 1;
                continue;
            };
            report.notifications_created += 1;

            let Some(user) = user else {
                report.emails_failed += 1;
                warn!(order_id, recipient_id, "Recipient has no directory entry; email not sent");
                continue;
            };

            let email: EmailMessage = EmailMessage {
                to: user.email,
                subject: title.clone(),
                body: message.clone(),
            };
            match self.inner.email.send(&email).await {
                Ok(()) => report.emails_sent += 1,
                Err(e) => {
                    report.emails_failed += 1;
                    warn!(order_id, recipient_id, error = %e, "Next-action email failed");
                }
            }
        }
        Ok(())
    }
}

enum Created {
    /// The recipient was already notified today.
    AlreadyNotified,
    /// A notification was created; carries the recipient's directory entry.
    New(Option<UserRecord>),
}

/// Creates the day's notification for one recipient.
fn create_notification(
    persistence: &mut Persistence,
    notification: &Notification,
) -> Result<Created, ApiError> {
    if persistence.notification_exists(
        notification.order_id,
        notification.recipient_id,
        notification.notification_type,
        notification.dispatch_date,
    )? {
        return Ok(Created::AlreadyNotified);
    }
    if persistence.insert_notification(notification)?.is_none() {
        return Ok(Created::AlreadyNotified);
    }
    Ok(Created::New(persistence.get_user(notification.recipient_id)?))
}

/// Lists a recipient's notifications, newest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_notifications(
    persistence: &mut Persistence,
    recipient_id: i64,
    unread_only: bool,
) -> Result<Vec<NotificationInfo>, ApiError> {
    Ok(persistence
        .list_notifications(recipient_id, unread_only)?
        .into_iter()
        .map(NotificationInfo::from)
        .collect())
}

/// Marks a notification read.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown notification.
pub fn mark_read(
    persistence: &mut Persistence,
    notification_id: i64,
) -> Result<NotificationInfo, ApiError> {
    persistence
        .mark_notification_read(notification_id)?
        .map(NotificationInfo::from)
        .ok_or_else(|| {
            ApiError::not_found(
                "Notification",
                format!("Notification {notification_id} does not exist"),
            )
        })
}
