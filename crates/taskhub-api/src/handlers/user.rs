//! User administration handlers.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;
use validator::Validate;

use taskhub_core::error::AppError;
use taskhub_entity::user::{CreateUser, User};
use taskhub_realtime::close_code;

use crate::dto::request::{CreateUserRequest, UserActiveUpdate, UserRolesUpdate};
use crate::dto::response::{IdsResponse, OkResponse, UserDetailResponse};
use crate::error::ApiResult;
use crate::extractors::Authorized;
use crate::extractors::permission::{UsersCreate, UsersUpdate, UsersView};
use crate::state::AppState;

async fn detail(state: &AppState, user: User) -> ApiResult<UserDetailResponse> {
    let role_name = match user.role_id {
        Some(id) => state.stores.roles.find_role(id).await?.map(|r| r.name),
        None => None,
    };
    let role_ids = state.stores.users.additional_role_ids(user.id).await?;
    Ok(UserDetailResponse {
        user,
        role_name,
        role_ids,
    })
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: Authorized<UsersCreate>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<UserDetailResponse>> {
    req.validate()?;
    state.password_validator.validate(&req.password)?;

    if state.stores.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::validation("Username already exists").into());
    }
    if let Some(role_id) = req.role_id {
        if state.stores.roles.find_role(role_id).await?.is_none() {
            return Err(AppError::validation("Role not found").into());
        }
    }

    let password_hash = state.password_hasher.hash_password(&req.password)?;
    let user = state
        .stores
        .users
        .create(&CreateUser {
            username: req.username,
            nickname: req.nickname,
            email: req.email,
            phone: req.phone,
            password_hash,
            is_admin: req.is_admin,
            role_id: req.role_id,
        })
        .await?;
    if !req.role_ids.is_empty() {
        state
            .stores
            .users
            .replace_additional_roles(user.id, &req.role_ids)
            .await?;
    }

    info!(user_id = user.id, username = %user.username, by = auth.id, "User created");
    Ok(Json(detail(&state, user).await?))
}

/// PUT /api/users/{id}/roles
///
/// Replaces the user's additional roles; the primary role is untouched.
pub async fn set_user_roles(
    State(state): State<AppState>,
    auth: Authorized<UsersUpdate>,
    Path(id): Path<i64>,
    Json(req): Json<UserRolesUpdate>,
) -> ApiResult<Json<IdsResponse>> {
    if state.stores.users.find_by_id(id).await?.is_none() {
        return Err(AppError::not_found("User not found").into());
    }
    let applied = state
        .stores
        .users
        .replace_additional_roles(id, &req.role_ids)
        .await?;
    info!(user_id = id, roles = ?applied, by = auth.id, "Additional roles replaced");
    Ok(Json(IdsResponse { ids: applied }))
}

/// PUT /api/users/{id}/active
///
/// Deactivating a user also closes their live session.
pub async fn set_user_active(
    State(state): State<AppState>,
    auth: Authorized<UsersUpdate>,
    Path(id): Path<i64>,
    Json(req): Json<UserActiveUpdate>,
) -> ApiResult<Json<OkResponse>> {
    if !state.stores.users.set_active(id, req.is_active).await? {
        return Err(AppError::not_found("User not found").into());
    }
    if !req.is_active {
        if let Some(handle) = state.realtime.registry.get(id) {
            handle.close(close_code::USER_UNAVAILABLE);
        }
    }
    info!(user_id = id, active = req.is_active, by = auth.id, "User activation changed");
    Ok(Json(OkResponse::ok()))
}

/// GET /api/users/online
pub async fn online_users(
    State(state): State<AppState>,
    _auth: Authorized<UsersView>,
) -> ApiResult<Json<IdsResponse>> {
    Ok(Json(IdsResponse {
        ids: state.realtime.registry.online_user_ids(),
    }))
}
