//! Role, permission catalog and grant repository.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::permission::{NewPermission, Permission};
use taskhub_entity::role::{NewRole, Role};

use super::map_write_error;
use crate::store::RoleStore;

/// PostgreSQL-backed [`RoleStore`].
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))
    }

    async fn find_role(&self, id: i64) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    async fn find_roles(&self, ids: &[i64]) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load roles", e))
    }

    async fn create_role(&self, role: &NewRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, remark, is_superadmin) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&role.name)
        .bind(&role.remark)
        .bind(role.is_superadmin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Role name already exists", "Failed to create role"))
    }

    async fn delete_role(&self, id: i64) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin", e))?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to drop grants", e))?;

        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete role", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn granted_codes(&self, role_ids: &[i64]) -> AppResult<BTreeSet<String>> {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT p.code FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = ANY($1)",
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve grants", e))?;
        Ok(codes.into_iter().collect())
    }

    async fn granted_permission_ids(&self, role_id: i64) -> AppResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT permission_id FROM role_permissions WHERE role_id = $1 ORDER BY permission_id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load grants", e))
    }

    async fn replace_grants(&self, role_id: i64, permission_ids: &[i64]) -> AppResult<Vec<i64>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin", e))?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear grants", e))?;

        let mut applied = sqlx::query_scalar::<_, i64>(
            "INSERT INTO role_permissions (role_id, permission_id) \
             SELECT $1, id FROM permissions WHERE id = ANY($2) \
             ON CONFLICT DO NOTHING RETURNING permission_id",
        )
        .bind(role_id)
        .bind(permission_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to grant", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;

        applied.sort_unstable();
        Ok(applied)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY group_name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list permissions", e)
            })
    }

    async fn permission_catalog(&self) -> AppResult<BTreeSet<String>> {
        let codes = sqlx::query_scalar::<_, String>("SELECT code FROM permissions")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load permission catalog", e)
            })?;
        Ok(codes.into_iter().collect())
    }

    async fn ensure_permission(
        &self,
        permission: &NewPermission,
    ) -> AppResult<(Permission, bool)> {
        let inserted = sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (code, name, group_name, description) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (code) DO NOTHING RETURNING *",
        )
        .bind(&permission.code)
        .bind(&permission.name)
        .bind(&permission.group)
        .bind(&permission.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to seed permission", e))?;

        if let Some(created) = inserted {
            return Ok((created, true));
        }

        let existing = sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE code = $1")
            .bind(&permission.code)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load permission", e)
            })?;
        Ok((existing, false))
    }
}
