//! Integration tests for role administration and permission enforcement.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::TestApp;

fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|v| v.as_i64().expect("expected an integer"))
        .collect()
}

#[tokio::test]
async fn test_superadmin_sees_full_catalog() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let perms = app
        .request("GET", "/api/auth/permissions", None, Some(&token))
        .await;
    assert_eq!(perms.status, StatusCode::OK);
    let codes = perms.body.as_array().unwrap();
    assert_eq!(codes.len(), 23);
    assert!(codes.contains(&json!("roles.delete")));
}

#[tokio::test]
async fn test_user_without_role_has_no_permissions() {
    let app = TestApp::new().await;
    app.create_user("plain", "secret123", None).await;
    let token = app.login("plain", "secret123").await;

    let perms = app
        .request("GET", "/api/auth/permissions", None, Some(&token))
        .await;
    assert_eq!(perms.body, json!([]));

    let roles = app.request("GET", "/api/roles", None, Some(&token)).await;
    assert_eq!(roles.status, StatusCode::FORBIDDEN);
    assert_eq!(roles.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_permissions_union_across_roles() {
    let app = TestApp::new().await;
    let viewer = app.create_role("Viewer", &["roles.view"]).await;
    let creator = app.create_role("Creator", &["roles.create"]).await;
    let id = app.create_user("erin", "secret123", Some(viewer.id)).await;
    app.state
        .stores
        .users
        .replace_additional_roles(id, &[creator.id])
        .await
        .unwrap();
    let token = app.login("erin", "secret123").await;

    let perms = app
        .request("GET", "/api/auth/permissions", None, Some(&token))
        .await;
    assert_eq!(perms.body, json!(["roles.create", "roles.view"]));

    let list = app.request("GET", "/api/roles", None, Some(&token)).await;
    assert_eq!(list.status, StatusCode::OK);

    let created = app
        .request("POST", "/api/roles", Some(json!({ "name": "QA" })), Some(&token))
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["name"], "QA");

    let delete = app
        .request(
            "DELETE",
            &format!("/api/roles/{}", created.body["id"]),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_role_rejects_duplicate_name() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request("POST", "/api/roles", Some(json!({ "name": "Backend" })), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_superadmin_role_is_protected() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let superadmin = app
        .state
        .stores
        .roles
        .find_role_by_name("Super Administrator")
        .await
        .unwrap()
        .unwrap();

    let delete = app
        .request("DELETE", &format!("/api/roles/{}", superadmin.id), None, Some(&token))
        .await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);

    let update = app
        .request(
            "PUT",
            &format!("/api/roles/{}/permissions", superadmin.id),
            Some(json!({ "permission_ids": [] })),
            Some(&token),
        )
        .await;
    assert_eq!(update.status, StatusCode::BAD_REQUEST);

    let grants = app
        .request(
            "GET",
            &format!("/api/roles/{}/permissions", superadmin.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(grants.status, StatusCode::OK);
    assert_eq!(ids(&grants.body).len(), 23);
}

#[tokio::test]
async fn test_delete_missing_role_is_not_found() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request("DELETE", "/api/roles/999999", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_role_grants_replace_and_ignore_unknown_ids() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let role = app.create_role("Reviewer", &["tasks.view"]).await;

    let catalog = app
        .request("GET", "/api/permissions", None, Some(&token))
        .await;
    let view_id = catalog
        .body
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["code"] == "projects.view")
        .map(|p| p["id"].as_i64().unwrap())
        .unwrap();

    let update = app
        .request(
            "PUT",
            &format!("/api/roles/{}/permissions", role.id),
            Some(json!({ "permission_ids": [view_id, 424242] })),
            Some(&token),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(ids(&update.body["ids"]), vec![view_id]);

    let grants = app
        .request(
            "GET",
            &format!("/api/roles/{}/permissions", role.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(ids(&grants.body), vec![view_id]);
}

#[tokio::test]
async fn test_deleting_role_revokes_its_permissions() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let role = app.create_role("Temp", &["users.view"]).await;
    app.create_user("frank", "secret123", Some(role.id)).await;
    let frank = app.login("frank", "secret123").await;

    let before = app.request("GET", "/api/users/online", None, Some(&frank)).await;
    assert_eq!(before.status, StatusCode::OK);

    let delete = app
        .request("DELETE", &format!("/api/roles/{}", role.id), None, Some(&token))
        .await;
    assert_eq!(delete.status, StatusCode::OK);

    let after = app.request("GET", "/api/users/online", None, Some(&frank)).await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_grouped_permissions() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request("GET", "/api/permissions/grouped", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_create_user_and_assign_roles() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let backend = app
        .state
        .stores
        .roles
        .find_role_by_name("Backend")
        .await
        .unwrap()
        .unwrap();
    let sales = app
        .state
        .stores
        .roles
        .find_role_by_name("Sales")
        .await
        .unwrap()
        .unwrap();

    let created = app
        .request(
            "POST",
            "/api/users",
            Some(json!({
                "username": "grace",
                "password": "secret123",
                "role_id": backend.id,
                "role_ids": [sales.id],
            })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["role_name"], "Backend");
    assert_eq!(ids(&created.body["role_ids"]), vec![sales.id]);
    assert!(created.body.get("password_hash").is_none());

    let duplicate = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "grace", "password": "secret123" })),
            Some(&token),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let user_id = created.body["id"].as_i64().unwrap();
    let roles = app
        .request(
            "PUT",
            &format!("/api/users/{user_id}/roles"),
            Some(json!({ "role_ids": [] })),
            Some(&token),
        )
        .await;
    assert_eq!(roles.status, StatusCode::OK);
    assert_eq!(roles.body["ids"], json!([]));

    let missing = app
        .request(
            "PUT",
            "/api/users/999999/roles",
            Some(json!({ "role_ids": [] })),
            Some(&token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_user_rejects_short_password_and_unknown_role() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let short = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "henry", "password": "abc" })),
            Some(&token),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let unknown_role = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "henry", "password": "secret123", "role_id": 999999 })),
            Some(&token),
        )
        .await;
    assert_eq!(unknown_role.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivate_user_via_api() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let id = app.create_user("ivan", "secret123", None).await;
    let ivan = app.login("ivan", "secret123").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{id}/active"),
            Some(json!({ "is_active": false })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let me = app.request("GET", "/api/auth/me", None, Some(&ivan)).await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);

    let missing = app
        .request(
            "PUT",
            "/api/users/999999/active",
            Some(json!({ "is_active": false })),
            Some(&token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
