//! Notification handlers. Every operation is scoped to the caller.

use axum::Json;
use axum::extract::{Path, Query, State};

use taskhub_database::store::NotificationPage;

use crate::dto::request::NotificationQuery;
use crate::dto::response::{CountResponse, MessageResponse, UpdatedResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Json<NotificationPage>> {
    let page = state
        .realtime
        .notifications
        .list(auth.id, query.only_unread, query.page_request())
        .await?;
    Ok(Json(page))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CountResponse>> {
    let count = state.realtime.notifications.unread_count(auth.id).await?;
    Ok(Json(CountResponse { count }))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.realtime.notifications.mark_read(id, auth.id).await?;
    Ok(Json(MessageResponse::new("Marked as read")))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UpdatedResponse>> {
    let updated = state.realtime.notifications.mark_all_read(auth.id).await?;
    Ok(Json(UpdatedResponse { updated }))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.realtime.notifications.delete(id, auth.id).await?;
    Ok(Json(MessageResponse::new("Notification deleted")))
}
