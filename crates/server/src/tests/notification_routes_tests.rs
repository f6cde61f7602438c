// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_order, create_test_app, send};
use axum::http::StatusCode;
use serde_json::json;
use time::OffsetDateTime;
use time::macros::format_description;

#[tokio::test]
async fn test_run_now_notifies_due_orders_once() {
    let app = create_test_app();
    let (_, user) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "email": "sam@example.com", "displayName": "Sam" })),
    )
    .await;
    let user_id = user["userId"].as_i64().unwrap();

    let order_id = create_order(&app, "SO-3001").await;
    let today: String = OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap();
    send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/next-action"),
        Some(json!({
            "nextActionDate": today,
            "assignedUserId": user_id,
            "productionManagerId": user_id
        })),
    )
    .await;

    let (status, outcome) = send(&app, "POST", "/admin/notifications/run-now", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "completed");
    assert_eq!(outcome["report"]["notificationsCreated"], 1);
    assert_eq!(outcome["report"]["emailsSent"], 1);

    let (_, again) = send(&app, "POST", "/admin/notifications/run-now", None).await;
    assert_eq!(again["report"]["notificationsCreated"], 0);
    assert_eq!(again["report"]["recipientsSkipped"], 1);

    let inbox_uri = format!("/notifications?recipientId={user_id}");
    let (status, inbox) = send(&app, "GET", &inbox_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["type"], "next_action_due");

    let (status, read) = send(
        &app,
        "PATCH",
        &format!("/notifications/{}/read", inbox[0]["notificationId"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["isRead"], true);

    let (_, unread) = send(&app, "GET", &format!("{inbox_uri}&unreadOnly=true"), None).await;
    assert!(unread.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_mark_unknown_notification_is_not_found() {
    let app = create_test_app();
    let (status, _) = send(&app, "PATCH", "/notifications/42/read", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
