//! Integration tests for the login flow and the authenticated profile.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{ADMIN_PASSWORD, TestApp};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "admin", "password": ADMIN_PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["access_token"].is_string());
    assert_eq!(response.body["token_type"], "bearer");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "admin", "password": "wrongpassword" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Incorrect username or password");
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "nobody", "password": "whatever" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Incorrect username or password");
}

#[tokio::test]
async fn test_login_inactive_user_forbidden() {
    let app = TestApp::new().await;
    let id = app.create_user("dormant", "secret123", None).await;
    app.state.stores.users.set_active(id, false).await.unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "dormant", "password": "secret123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_login_records_log_and_last_login() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let logs = app
        .request("GET", "/api/auth/login-logs", None, Some(&token))
        .await;
    assert_eq!(logs.status, StatusCode::OK);
    assert_eq!(logs.body.as_array().unwrap().len(), 1);

    let me = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "admin");
    assert_eq!(me.body["role_name"], "Super Administrator");
    assert!(me.body["last_login"].is_string());
    assert!(me.body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_missing_and_malformed_credentials() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "UNAUTHENTICATED");

    let garbage = app
        .request("GET", "/api/auth/me", None, Some("not-a-jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_rejected_after_deactivation() {
    let app = TestApp::new().await;
    let id = app.create_user("leaver", "secret123", None).await;
    let token = app.login("leaver", "secret123").await;

    app.state.stores.users.set_active(id, false).await.unwrap();

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new().await;
    app.create_user("carol", "secret123", None).await;
    let token = app.login("carol", "secret123").await;

    let wrong_old = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(json!({ "old_password": "nope", "new_password": "fresh456" })),
            Some(&token),
        )
        .await;
    assert_eq!(wrong_old.status, StatusCode::BAD_REQUEST);

    let same = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(json!({ "old_password": "secret123", "new_password": "secret123" })),
            Some(&token),
        )
        .await;
    assert_eq!(same.status, StatusCode::BAD_REQUEST);

    let ok = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(json!({ "old_password": "secret123", "new_password": "fresh456" })),
            Some(&token),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    app.login("carol", "fresh456").await;
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new().await;
    app.create_user("dave", "secret123", None).await;
    let token = app.login("dave", "secret123").await;

    let response = app
        .request(
            "PUT",
            "/api/auth/me",
            Some(json!({ "nickname": "Dave", "email": "dave@example.com" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["nickname"], "Dave");
    assert_eq!(response.body["email"], "dave@example.com");

    let invalid = app
        .request(
            "PUT",
            "/api/auth/me",
            Some(json!({ "email": "not-an-email" })),
            Some(&token),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}
