//! Integration tests for WebSocket admission, presence and live pushes.

use std::time::Duration;

use futures::SinkExt;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

use taskhub_entity::notification::{NewNotification, NotificationType};
use taskhub_realtime::close_code;

use crate::helpers::{TestApp, wait_for_close, wait_for_json, ws_connect};

#[tokio::test]
async fn test_missing_token_closes_with_4401() {
    let app = TestApp::new().await;
    let addr = app.spawn_server().await;

    let mut ws = ws_connect(addr, None).await;
    assert_eq!(wait_for_close(&mut ws).await, close_code::INVALID_TOKEN);

    let mut ws = ws_connect(addr, Some("garbage")).await;
    assert_eq!(wait_for_close(&mut ws).await, close_code::INVALID_TOKEN);
}

#[tokio::test]
async fn test_inactive_user_closes_with_4403() {
    let app = TestApp::new().await;
    let id = app.create_user("quinn", "secret123", None).await;
    let token = app.login("quinn", "secret123").await;
    app.state.stores.users.set_active(id, false).await.unwrap();
    let addr = app.spawn_server().await;

    let mut ws = ws_connect(addr, Some(&token)).await;
    assert_eq!(wait_for_close(&mut ws).await, close_code::USER_UNAVAILABLE);
    assert!(!app.state.realtime.registry.is_online(id));
}

#[tokio::test]
async fn test_ping_pong_and_ack() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let addr = app.spawn_server().await;
    let mut ws = ws_connect(addr, Some(&token)).await;

    ws.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();
    let pong = wait_for_json(&mut ws, |v| v["type"] == "pong").await;
    assert!(pong["ts"].is_string());

    ws.send(Message::text(r#"{"type":"typing","room":1}"#))
        .await
        .unwrap();
    wait_for_json(&mut ws, |v| v["type"] == "ack").await;

    ws.send(Message::text("not json")).await.unwrap();
    let error = wait_for_json(&mut ws, |v| v["type"] == "error").await;
    assert_eq!(error["code"], "INVALID_MESSAGE");
}

#[tokio::test]
async fn test_presence_broadcast_on_connect_and_disconnect() {
    let app = TestApp::new().await;
    let admin_token = app.admin_token().await;
    let rosa = app.create_user("rosa", "secret123", None).await;
    let rosa_token = app.login("rosa", "secret123").await;
    let addr = app.spawn_server().await;

    let mut watcher = ws_connect(addr, Some(&admin_token)).await;
    wait_for_json(&mut watcher, |v| v["type"] == "user_status_change").await;
    let mut rosa_ws = ws_connect(addr, Some(&rosa_token)).await;

    let online = wait_for_json(&mut watcher, |v| {
        v["type"] == "user_status_change" && v["user_id"] == rosa
    })
    .await;
    assert_eq!(online["online"], true);
    let user = app.state.stores.users.find_by_id(rosa).await.unwrap().unwrap();
    assert!(user.online);
    assert!(user.last_login.is_some());

    rosa_ws.close(None).await.unwrap();

    let offline = wait_for_json(&mut watcher, |v| {
        v["type"] == "user_status_change" && v["user_id"] == rosa
    })
    .await;
    assert_eq!(offline["online"], false);
    assert!(!app.state.realtime.registry.is_online(rosa));
    let user = app.state.stores.users.find_by_id(rosa).await.unwrap().unwrap();
    assert!(!user.online);
}

#[tokio::test]
async fn test_second_session_displaces_the_first() {
    let app = TestApp::new().await;
    let id = app.create_user("sam", "secret123", None).await;
    let token = app.login("sam", "secret123").await;
    let addr = app.spawn_server().await;

    let mut first = ws_connect(addr, Some(&token)).await;
    wait_for_json(&mut first, |v| v["type"] == "user_status_change").await;

    let mut second = ws_connect(addr, Some(&token)).await;
    assert_eq!(wait_for_close(&mut first).await, close_code::REPLACED);

    // The displaced session's teardown must leave the new one registered.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.state.realtime.registry.is_online(id));
    let user = app.state.stores.users.find_by_id(id).await.unwrap().unwrap();
    assert!(user.online);

    second.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();
    wait_for_json(&mut second, |v| v["type"] == "pong").await;
}

#[tokio::test]
async fn test_notification_pushed_to_live_session() {
    let app = TestApp::new().await;
    let id = app.create_user("tina", "secret123", None).await;
    let token = app.login("tina", "secret123").await;
    let addr = app.spawn_server().await;
    let mut ws = ws_connect(addr, Some(&token)).await;
    wait_for_json(&mut ws, |v| v["type"] == "user_status_change").await;

    let created = app
        .state
        .realtime
        .notifications
        .create(
            NewNotification::new(id, NotificationType::TaskAssigned, "You were assigned a new task")
                .related_to("task", 3),
        )
        .await
        .unwrap();

    let pushed = wait_for_json(&mut ws, |v| v["type"] == "notification").await;
    assert_eq!(pushed["data"]["id"], created.id);
    assert_eq!(pushed["data"]["type"], "task_assigned");
    assert_eq!(pushed["data"]["related_id"], 3);
    assert_eq!(pushed["data"]["is_read"], false);
}

#[tokio::test]
async fn test_deactivation_closes_live_session() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_user("uma", "secret123", None).await;
    let token = app.login("uma", "secret123").await;
    let addr = app.spawn_server().await;
    let mut ws = ws_connect(addr, Some(&token)).await;
    wait_for_json(&mut ws, |v| v["type"] == "user_status_change").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{id}/active"),
            Some(json!({ "is_active": false })),
            Some(&admin),
        )
        .await;
    assert!(response.status.is_success());

    assert_eq!(wait_for_close(&mut ws).await, close_code::USER_UNAVAILABLE);
}
