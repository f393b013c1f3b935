//! Role management handlers.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;
use validator::Validate;

use taskhub_core::error::AppError;
use taskhub_entity::role::{NewRole, Role};

use crate::dto::request::{CreateRoleRequest, RolePermissionUpdate};
use crate::dto::response::{IdsResponse, OkResponse};
use crate::error::ApiResult;
use crate::extractors::Authorized;
use crate::extractors::permission::{RolesCreate, RolesDelete, RolesUpdate, RolesView};
use crate::state::AppState;

async fn load_role(state: &AppState, id: i64) -> ApiResult<Role> {
    let role = state.stores.roles.find_role(id).await?;
    role.ok_or_else(|| AppError::not_found("Role not found").into())
}

/// GET /api/roles
pub async fn list_roles(
    State(state): State<AppState>,
    _auth: Authorized<RolesView>,
) -> ApiResult<Json<Vec<Role>>> {
    Ok(Json(state.stores.roles.list_roles().await?))
}

/// POST /api/roles
pub async fn create_role(
    State(state): State<AppState>,
    auth: Authorized<RolesCreate>,
    Json(req): Json<CreateRoleRequest>,
) -> ApiResult<Json<Role>> {
    req.validate()?;
    let name = req.name.trim();
    if state.stores.roles.find_role_by_name(name).await?.is_some() {
        return Err(AppError::validation("Role already exists").into());
    }

    let role = state
        .stores
        .roles
        .create_role(&NewRole {
            name: name.to_string(),
            remark: req.remark,
            is_superadmin: false,
        })
        .await?;
    info!(role_id = role.id, name = %role.name, by = auth.id, "Role created");
    Ok(Json(role))
}

/// DELETE /api/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    auth: Authorized<RolesDelete>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OkResponse>> {
    let role = load_role(&state, id).await?;
    if role.is_superadmin {
        return Err(AppError::validation("The superadmin role cannot be deleted").into());
    }
    state.stores.roles.delete_role(id).await?;
    info!(role_id = id, by = auth.id, "Role deleted");
    Ok(Json(OkResponse::ok()))
}

/// GET /api/roles/{id}/permissions
///
/// A superadmin role reports every catalog id.
pub async fn get_role_permissions(
    State(state): State<AppState>,
    _auth: Authorized<RolesView>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<i64>>> {
    let role = load_role(&state, id).await?;
    let ids = if role.is_superadmin {
        state
            .stores
            .roles
            .list_permissions()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect()
    } else {
        state.stores.roles.granted_permission_ids(id).await?
    };
    Ok(Json(ids))
}

/// PUT /api/roles/{id}/permissions
pub async fn set_role_permissions(
    State(state): State<AppState>,
    auth: Authorized<RolesUpdate>,
    Path(id): Path<i64>,
    Json(req): Json<RolePermissionUpdate>,
) -> ApiResult<Json<IdsResponse>> {
    let role = load_role(&state, id).await?;
    if role.is_superadmin {
        return Err(AppError::validation("The superadmin role holds every permission").into());
    }
    let applied = state
        .stores
        .roles
        .replace_grants(id, &req.permission_ids)
        .await?;
    info!(role_id = id, granted = applied.len(), by = auth.id, "Role permissions replaced");
    Ok(Json(IdsResponse { ids: applied }))
}
