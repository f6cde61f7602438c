// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{RecordingEmailGateway, create_order_request, create_test_persistence};
use crate::SharedPersistence;
use crate::collaborators::EmailGateway;
use crate::error::ApiError;
use crate::notifications::{
    NotificationScheduler, SchedulerConfig, list_notifications, mark_read,
};
use crate::production::create_order;
use crate::request_response::{DispatchReport, TickOutcome};
use promo_ops_domain::StageCatalog;
use promo_ops_persistence::Persistence;
use std::sync::Arc;
use std::time::Duration;
use time::macros::{datetime, offset};

struct Fixture {
    persistence: SharedPersistence,
    order_id: i64,
    user_id: i64,
}

/// One order due on 2026-03-04 whose assignee is also its production
/// manager.
fn fixture() -> Fixture {
    let mut persistence: Persistence = create_test_persistence();
    let user_id = persistence
        .create_user("sam@example.com", "Sam Manager")
        .unwrap();

    let mut request = create_order_request("SO-2001");
    request.next_action_date = Some(String::from("2026-03-04"));
    request.next_action_notes = Some(String::from("Call vendor about ship date"));
    request.assigned_user_id = Some(user_id);
    request.production_manager_id = Some(user_id);
    let order = create_order(&mut persistence, &StageCatalog::standard(), &request).unwrap();

    Fixture {
        persistence: Arc::new(tokio::sync::Mutex::new(persistence)),
        order_id: order.order_id.unwrap(),
        user_id,
    }
}

fn scheduler(
    persistence: &SharedPersistence,
    email: Arc<dyn EmailGateway>,
    config: SchedulerConfig,
) -> NotificationScheduler {
    NotificationScheduler::new(Arc::clone(persistence), email, config)
}

fn report(outcome: TickOutcome) -> DispatchReport {
    match outcome {
        TickOutcome::Completed { report } => report,
        TickOutcome::Skipped => panic!("tick was skipped"),
    }
}

#[tokio::test]
async fn test_shared_role_gets_one_notification() {
    let f = fixture();
    let email = Arc::new(RecordingEmailGateway::default());
    let scheduler = scheduler(&f.persistence, email.clone(), SchedulerConfig::default());

    let first = report(scheduler.tick(datetime!(2026-03-04 09:00 UTC)).await.unwrap());
    assert_eq!(first.orders_scanned, 1);
    assert_eq!(first.notifications_created, 1);
    assert_eq!(first.emails_sent, 1);
    assert_eq!(email.sent_to(), vec![String::from("sam@example.com")]);

    let inbox = list_notifications(&mut *f.persistence.lock().await, f.user_id, false).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].order_id, f.order_id);
    assert_eq!(inbox[0].message, "Call vendor about ship date");
    assert_eq!(inbox[0].dispatch_date, "2026-03-04");
}

#[tokio::test]
async fn test_repeated_tick_on_same_day_creates_nothing() {
    let f = fixture();
    let email = Arc::new(RecordingEmailGateway::default());
    let scheduler = scheduler(&f.persistence, email.clone(), SchedulerConfig::default());

    report(scheduler.tick(datetime!(2026-03-04 09:00 UTC)).await.unwrap());
    let second = report(scheduler.tick(datetime!(2026-03-04 10:00 UTC)).await.unwrap());

    assert_eq!(second.orders_scanned, 1);
    assert_eq!(second.notifications_created, 0);
    assert_eq!(second.recipients_skipped, 1);
    assert_eq!(second.emails_sent, 0);
    assert_eq!(email.sent_to().len(), 1);
}

#[tokio::test]
async fn test_other_days_are_ignored() {
    let f = fixture();
    let scheduler = scheduler(
        &f.persistence,
        Arc::new(RecordingEmailGateway::default()),
        SchedulerConfig::default(),
    );

    let outcome = report(scheduler.tick(datetime!(2026-03-05 09:00 UTC)).await.unwrap());
    assert_eq!(outcome, DispatchReport::default());
}

#[tokio::test]
async fn test_today_follows_configured_offset() {
    let f = fixture();
    let config = SchedulerConfig {
        utc_offset: offset!(-5),
        ..SchedulerConfig::default()
    };
    let scheduler = scheduler(
        &f.persistence,
        Arc::new(RecordingEmailGateway::default()),
        config,
    );

    // 02:00 UTC on the 5th is still the 4th at UTC-5.
    let outcome = report(scheduler.tick(datetime!(2026-03-05 02:00 UTC)).await.unwrap());
    assert_eq!(outcome.notifications_created, 1);
}

#[tokio::test]
async fn test_failed_email_still_creates_notification() {
    let f = fixture();
    let scheduler = scheduler(
        &f.persistence,
        Arc::new(RecordingEmailGateway::failing()),
        SchedulerConfig::default(),
    );

    let outcome = report(scheduler.tick(datetime!(2026-03-04 09:00 UTC)).await.unwrap());
    assert_eq!(outcome.notifications_created, 1);
    assert_eq!(outcome.emails_failed, 1);
    assert_eq!(outcome.emails_sent, 0);

    let inbox = list_notifications(&mut *f.persistence.lock().await, f.user_id, true).unwrap();
    assert_eq!(inbox.len(), 1);
}

#[tokio::test]
async fn test_recipient_without_directory_entry_counts_as_failed_email() {
    let f = fixture();
    {
        let mut persistence = f.persistence.lock().await;
        let mut request = create_order_request("SO-2002");
        request.next_action_date = Some(String::from("2026-03-04"));
        request.assigned_user_id = Some(9_999);
        create_order(&mut persistence, &StageCatalog::standard(), &request).unwrap();
    }
    let scheduler = scheduler(
        &f.persistence,
        Arc::new(RecordingEmailGateway::default()),
        SchedulerConfig::default(),
    );

    let outcome = report(scheduler.tick(datetime!(2026-03-04 09:00 UTC)).await.unwrap());
    assert_eq!(outcome.orders_scanned, 2);
    assert_eq!(outcome.notifications_created, 2);
    assert_eq!(outcome.emails_sent, 1);
    assert_eq!(outcome.emails_failed, 1);
}

#[tokio::test]
async fn test_overlapping_tick_is_skipped() {
    let f = fixture();
    let scheduler = scheduler(
        &f.persistence,
        Arc::new(RecordingEmailGateway::slow(Duration::from_millis(300))),
        SchedulerConfig::default(),
    );

    let now = datetime!(2026-03-04 09:00 UTC);
    let (first, second) = tokio::join!(scheduler.tick(now), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.tick(now).await
    });

    assert_eq!(report(first.unwrap()).notifications_created, 1);
    assert_eq!(second.unwrap(), TickOutcome::Skipped);

    // The guard is released once the first tick ends.
    assert!(matches!(
        scheduler.tick(now).await.unwrap(),
        TickOutcome::Completed { .. }
    ));
}

#[tokio::test]
async fn test_slow_order_is_abandoned_after_budget() {
    let f = fixture();
    let config = SchedulerConfig {
        order_budget: Duration::from_millis(50),
        ..SchedulerConfig::default()
    };
    let scheduler = scheduler(
        &f.persistence,
        Arc::new(RecordingEmailGateway::slow(Duration::from_secs(5))),
        config,
    );

    let outcome = report(scheduler.tick(datetime!(2026-03-04 09:00 UTC)).await.unwrap());
    assert_eq!(outcome.orders_timed_out, 1);
    assert_eq!(outcome.notifications_created, 1);
    assert_eq!(outcome.emails_sent, 0);
}

#[tokio::test]
async fn test_started_scheduler_ticks_immediately_and_stops() {
    let f = fixture();
    let email = Arc::new(RecordingEmailGateway::default());
    let scheduler = scheduler(&f.persistence, email, SchedulerConfig::default());

    let handle = scheduler.start();
    scheduler.stop();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_mark_read_filters_unread() {
    let f = fixture();
    let scheduler = scheduler(
        &f.persistence,
        Arc::new(RecordingEmailGateway::default()),
        SchedulerConfig::default(),
    );
    report(scheduler.tick(datetime!(2026-03-04 09:00 UTC)).await.unwrap());

    let mut persistence = f.persistence.lock().await;
    let inbox = list_notifications(&mut persistence, f.user_id, false).unwrap();
    let id = inbox[0].notification_id.unwrap();

    let read = mark_read(&mut persistence, id).unwrap();
    assert!(read.is_read);
    assert!(
        list_notifications(&mut persistence, f.user_id, true)
            .unwrap()
            .is_empty()
    );
    assert!(matches!(
        mark_read(&mut persistence, 404),
        Err(ApiError::ResourceNotFound { .. })
    ));
}
