//! Permission catalog handlers.

use axum::Json;
use axum::extract::State;

use taskhub_entity::permission::{Permission, PermissionGroup};

use crate::error::ApiResult;
use crate::extractors::Authorized;
use crate::extractors::permission::RolesView;
use crate::state::AppState;

/// GET /api/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    _auth: Authorized<RolesView>,
) -> ApiResult<Json<Vec<Permission>>> {
    Ok(Json(state.stores.roles.list_permissions().await?))
}

/// GET /api/permissions/grouped
pub async fn list_permissions_grouped(
    State(state): State<AppState>,
    _auth: Authorized<RolesView>,
) -> ApiResult<Json<Vec<PermissionGroup>>> {
    let permissions = state.stores.roles.list_permissions().await?;
    Ok(Json(PermissionGroup::group_all(permissions)))
}
