//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use taskhub_api::{AppState, build_app, build_state};
use taskhub_core::config::AppConfig;
use taskhub_entity::role::Role;
use taskhub_entity::user::CreateUser;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const ADMIN_PASSWORD: &str = "admin123";

/// Test application context
pub struct TestApp {
    /// The Axum app with middleware, for oneshot requests
    pub router: Router,
    /// Shared state, for arranging data directly through the stores
    pub state: AppState,
}

impl TestApp {
    /// A seeded, memory-backed application.
    pub async fn new() -> Self {
        let state = build_state(AppConfig::default())
            .await
            .expect("Failed to build state");
        let router = build_app(state.clone());
        Self { router, state }
    }

    /// Create an active user and return its id.
    pub async fn create_user(&self, username: &str, password: &str, role_id: Option<i64>) -> i64 {
        let password_hash = self
            .state
            .password_hasher
            .hash_password(password)
            .expect("Failed to hash password");
        self.state
            .stores
            .users
            .create(&CreateUser {
                username: username.to_string(),
                nickname: None,
                email: None,
                phone: None,
                password_hash,
                is_admin: false,
                role_id,
            })
            .await
            .expect("Failed to create user")
            .id
    }

    /// Create a role granted exactly `codes`.
    pub async fn create_role(&self, name: &str, codes: &[&str]) -> Role {
        let roles = &self.state.stores.roles;
        let role = roles
            .create_role(&taskhub_entity::role::NewRole {
                name: name.to_string(),
                remark: None,
                is_superadmin: false,
            })
            .await
            .expect("Failed to create role");
        let ids: Vec<i64> = roles
            .list_permissions()
            .await
            .expect("Failed to list permissions")
            .into_iter()
            .filter(|p| codes.contains(&p.code.as_str()))
            .map(|p| p.id)
            .collect();
        roles
            .replace_grants(role.id, &ids)
            .await
            .expect("Failed to grant permissions");
        role
    }

    /// Login and return JWT access token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", ADMIN_PASSWORD).await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral port for WebSocket clients.
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let app = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });
        addr
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

pub async fn ws_connect(addr: SocketAddr, token: Option<&str>) -> WsClient {
    let url = match token {
        Some(token) => format!("ws://{addr}/ws?token={token}"),
        None => format!("ws://{addr}/ws"),
    };
    let (ws, _) = connect_async(url).await.expect("WebSocket handshake failed");
    ws
}

/// The next server frame, failing the test after a few seconds.
pub async fn next_message(ws: &mut WsClient) -> Message {
    tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("Timed out waiting for a frame")
        .expect("Stream ended")
        .expect("WebSocket error")
}

/// Skip frames until a JSON text frame satisfies `pred`.
pub async fn wait_for_json<F>(ws: &mut WsClient, pred: F) -> Value
where
    F: Fn(&Value) -> bool,
{
    loop {
        match next_message(ws).await {
            Message::Text(text) => {
                let value: Value = serde_json::from_str(&text).expect("Invalid JSON frame");
                if pred(&value) {
                    return value;
                }
            }
            Message::Close(frame) => panic!("Connection closed early: {frame:?}"),
            _ => {}
        }
    }
}

/// Read until a close frame arrives and return its code.
pub async fn wait_for_close(ws: &mut WsClient) -> u16 {
    loop {
        if let Message::Close(frame) = next_message(ws).await {
            return frame.map(|f| u16::from(f.code)).expect("Close frame without code");
        }
    }
}
