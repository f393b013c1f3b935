//! Route definitions for the TaskHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket endpoint lives at
//! `/ws`.

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route, without middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(permission_routes())
        .merge(role_routes())
        .merge(user_routes())
        .merge(notification_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/me",
            get(handlers::auth::me).put(handlers::auth::update_me),
        )
        .route("/auth/password", put(handlers::auth::change_password))
        .route("/auth/permissions", get(handlers::auth::my_permissions))
        .route("/auth/login-logs", get(handlers::auth::login_logs))
}

fn permission_routes() -> Router<AppState> {
    Router::new()
        .route("/permissions", get(handlers::permission::list_permissions))
        .route(
            "/permissions/grouped",
            get(handlers::permission::list_permissions_grouped),
        )
}

fn role_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/roles",
            get(handlers::role::list_roles).post(handlers::role::create_role),
        )
        .route("/roles/{id}", delete(handlers::role::delete_role))
        .route(
            "/roles/{id}/permissions",
            get(handlers::role::get_role_permissions).put(handlers::role::set_role_permissions),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::user::create_user))
        .route("/users/online", get(handlers::user::online_users))
        .route("/users/{id}/roles", put(handlers::user::set_user_roles))
        .route("/users/{id}/active", put(handlers::user::set_user_active))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete_notification),
        )
}
