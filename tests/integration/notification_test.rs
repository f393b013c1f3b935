//! Integration tests for the notification inbox endpoints.

use axum::http::StatusCode;
use serde_json::json;

use taskhub_entity::notification::kind::NotificationType;
use taskhub_entity::notification::model::NewNotification;
use taskhub_realtime::notification::rules::{Actor, Subject};
use taskhub_realtime::NotificationRules;

use crate::helpers::TestApp;

async fn inbox_owner(app: &TestApp, name: &str) -> (i64, String) {
    let id = app.create_user(name, "secret123", None).await;
    let token = app.login(name, "secret123").await;
    (id, token)
}

#[tokio::test]
async fn test_list_and_unread_count() {
    let app = TestApp::new().await;
    let (id, token) = inbox_owner(&app, "judy").await;
    let notifications = &app.state.realtime.notifications;
    for title in ["first", "second", "third"] {
        notifications
            .create(NewNotification::new(id, NotificationType::ProjectUpdate, title))
            .await
            .unwrap();
    }

    let page = app
        .request("GET", "/api/notifications?page=1&page_size=2", None, Some(&token))
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["total"], 3);
    assert_eq!(page.body["unread_count"], 3);
    let items = page.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "third");
    assert_eq!(items[0]["type"], "project_update");

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(&token))
        .await;
    assert_eq!(count.body, json!({ "count": 3 }));
}

#[tokio::test]
async fn test_mark_read_and_filter_unread() {
    let app = TestApp::new().await;
    let (id, token) = inbox_owner(&app, "kate").await;
    let notifications = &app.state.realtime.notifications;
    let first = notifications
        .create(NewNotification::new(id, NotificationType::Mention, "first"))
        .await
        .unwrap();
    notifications
        .create(NewNotification::new(id, NotificationType::Mention, "second"))
        .await
        .unwrap();

    let mark = app
        .request(
            "PUT",
            &format!("/api/notifications/{}/read", first.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(mark.status, StatusCode::OK);

    let unread = app
        .request("GET", "/api/notifications?only_unread=true", None, Some(&token))
        .await;
    assert_eq!(unread.body["total"], 1);
    assert_eq!(unread.body["items"][0]["title"], "second");

    let all = app
        .request("PUT", "/api/notifications/read-all", None, Some(&token))
        .await;
    assert_eq!(all.body, json!({ "updated": 1 }));
}

#[tokio::test]
async fn test_cannot_touch_another_users_notification() {
    let app = TestApp::new().await;
    let (owner, _) = inbox_owner(&app, "liam").await;
    let (_, intruder) = inbox_owner(&app, "mallory").await;
    let notification = app
        .state
        .realtime
        .notifications
        .create(NewNotification::new(owner, NotificationType::TeamInvite, "private"))
        .await
        .unwrap();

    let mark = app
        .request(
            "PUT",
            &format!("/api/notifications/{}/read", notification.id),
            None,
            Some(&intruder),
        )
        .await;
    assert_eq!(mark.status, StatusCode::NOT_FOUND);

    let delete = app
        .request(
            "DELETE",
            &format!("/api/notifications/{}", notification.id),
            None,
            Some(&intruder),
        )
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    assert_eq!(
        app.state.realtime.notifications.unread_count(owner).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_delete_notification() {
    let app = TestApp::new().await;
    let (id, token) = inbox_owner(&app, "nina").await;
    let notification = app
        .state
        .realtime
        .notifications
        .create(NewNotification::new(id, NotificationType::CommentReply, "reply"))
        .await
        .unwrap();

    let delete = app
        .request(
            "DELETE",
            &format!("/api/notifications/{}", notification.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(delete.status, StatusCode::OK);

    let again = app
        .request(
            "DELETE",
            &format!("/api/notifications/{}", notification.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_assignment_fans_out_to_assignees() {
    let app = TestApp::new().await;
    let (actor_id, actor_token) = inbox_owner(&app, "olga").await;
    let (assignee, assignee_token) = inbox_owner(&app, "pete").await;

    let batch = NotificationRules::task_assigned(
        &Actor::new(actor_id, "Olga"),
        &Subject::new(7, "Write release notes"),
        &[assignee, actor_id, assignee],
    );
    let created = app.state.realtime.notifications.dispatch_all(batch).await;
    assert_eq!(created.len(), 1);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&assignee_token))
        .await;
    assert_eq!(inbox.body["total"], 1);
    assert_eq!(inbox.body["items"][0]["type"], "task_assigned");
    assert_eq!(inbox.body["items"][0]["related_type"], "task");
    assert_eq!(inbox.body["items"][0]["related_id"], 7);

    let actor_inbox = app
        .request("GET", "/api/notifications", None, Some(&actor_token))
        .await;
    assert_eq!(actor_inbox.body["total"], 0);
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = TestApp::new().await;
    let (id, token) = inbox_owner(&app, "quentin").await;
    app.state
        .realtime
        .notifications
        .create(NewNotification::new(id, NotificationType::Mention, "only"))
        .await
        .unwrap();

    let page = app
        .request(
            "GET",
            "/api/notifications?page=18446744073709551615&page_size=100",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["total"], 1);
    assert_eq!(page.body["items"], json!([]));
}
