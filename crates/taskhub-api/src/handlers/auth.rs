//! Auth handlers: login, profile, password, own permissions and login logs.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use tracing::{info, warn};
use validator::Validate;

use taskhub_core::error::AppError;
use taskhub_entity::user::{LoginLog, NewLoginLog, UpdateProfile, User};

use crate::dto::request::{ChangePasswordRequest, LoginLogQuery, LoginRequest, UpdateProfileRequest};
use crate::dto::response::{MeResponse, MessageResponse, TokenResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

const MAX_LOGIN_LOGS: u64 = 100;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let rejected = || AppError::validation("Incorrect username or password");
    let user = state
        .stores
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or_else(rejected)?;
    if !state
        .password_hasher
        .verify_password(&req.password, &user.password_hash)?
    {
        return Err(rejected().into());
    }
    if !user.is_active {
        return Err(AppError::authorization("Account is disabled").into());
    }

    if state.password_hasher.needs_rehash(&user.password_hash) {
        upgrade_hash(&state, &user, &req.password).await;
    }

    state
        .stores
        .users
        .record_login(&NewLoginLog {
            user_id: user.id,
            ip_address: client_ip(&headers),
            user_agent: headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        })
        .await?;

    let token = state.jwt_encoder.issue(user.id)?;
    info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(Json(TokenResponse {
        access_token: token.access_token,
        token_type: "bearer".to_string(),
        expires_at: token.expires_at,
    }))
}

/// Re-hash a verified legacy password with the primary scheme. A failure
/// leaves the old hash in place.
async fn upgrade_hash(state: &AppState, user: &User, password: &str) {
    let result = match state.password_hasher.hash_password(password) {
        Ok(hash) => state.stores.users.update_password_hash(user.id, &hash).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => info!(user_id = user.id, "Upgraded legacy password hash"),
        Err(e) => warn!(user_id = user.id, error = %e, "Failed to upgrade password hash"),
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

async fn role_name(state: &AppState, user: &User) -> ApiResult<Option<String>> {
    let Some(role_id) = user.role_id else {
        return Ok(None);
    };
    let role = state.stores.roles.find_role(role_id).await?;
    Ok(role.map(|r| r.name))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<Json<MeResponse>> {
    let role_name = role_name(&state, &user).await?;
    Ok(Json(MeResponse::new(user, role_name)))
}

/// PUT /api/auth/me
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<MeResponse>> {
    req.validate()?;

    let profile = UpdateProfile {
        nickname: req.nickname,
        email: req.email,
        phone: req.phone,
        avatar: req.avatar,
    };
    let updated = state
        .stores
        .users
        .update_profile(user.id, &profile)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let role_name = role_name(&state, &updated).await?;
    Ok(Json(MeResponse::new(updated, role_name)))
}

/// PUT /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    if !state
        .password_hasher
        .verify_password(&req.old_password, &user.password_hash)?
    {
        return Err(AppError::validation("Current password is incorrect").into());
    }
    state.password_validator.validate(&req.new_password)?;
    state
        .password_validator
        .validate_not_same(&req.old_password, &req.new_password)?;

    let hash = state.password_hasher.hash_password(&req.new_password)?;
    state.stores.users.update_password_hash(user.id, &hash).await?;
    info!(user_id = user.id, "Password changed");

    Ok(Json(MessageResponse::new("Password changed")))
}

/// GET /api/auth/permissions
pub async fn my_permissions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<String>>> {
    let codes = state.permission_resolver.resolve(&user).await?;
    Ok(Json(codes.into_iter().collect()))
}

/// GET /api/auth/login-logs
pub async fn login_logs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<LoginLogQuery>,
) -> ApiResult<Json<Vec<LoginLog>>> {
    let limit = query.limit.clamp(1, MAX_LOGIN_LOGS);
    let logs = state.stores.users.login_logs(user.id, limit).await?;
    Ok(Json(logs))
}
