//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::user::{CreateUser, LoginLog, NewLoginLog, UpdateProfile, User};

use super::map_write_error;
use crate::store::UserStore;

/// PostgreSQL-backed [`UserStore`].
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn create(&self, user: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, nickname, email, phone, password_hash, is_admin, role_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.nickname)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Username already exists", "Failed to create user"))
    }

    async fn update_profile(&self, id: i64, profile: &UpdateProfile) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
             nickname = COALESCE($2, nickname), \
             email = COALESCE($3, email), \
             phone = COALESCE($4, phone), \
             avatar = COALESCE($5, avatar) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&profile.nickname)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update profile", e))
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update password", e)
            })?;
        Ok(())
    }

    async fn set_active(&self, id: i64, active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update user status", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_online(&self, id: i64, online: bool) -> AppResult<()> {
        sqlx::query("UPDATE users SET online = $2 WHERE id = $1")
            .bind(id)
            .bind(online)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update online flag", e)
            })?;
        Ok(())
    }

    async fn touch_last_login(&self, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;
        Ok(())
    }

    async fn record_login(&self, entry: &NewLoginLog) -> AppResult<LoginLog> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin", e))?;

        let log = sqlx::query_as::<_, LoginLog>(
            "INSERT INTO login_logs (user_id, ip_address, user_agent) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(entry.user_id)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record login", e))?;

        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(entry.user_id)
            .bind(log.login_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;
        Ok(log)
    }

    async fn login_logs(&self, user_id: i64, limit: u64) -> AppResult<Vec<LoginLog>> {
        sqlx::query_as::<_, LoginLog>(
            "SELECT * FROM login_logs WHERE user_id = $1 ORDER BY login_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list login logs", e))
    }

    async fn additional_role_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user roles", e))
    }

    async fn replace_additional_roles(
        &self,
        user_id: i64,
        role_ids: &[i64],
    ) -> AppResult<Vec<i64>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin", e))?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear user roles", e)
            })?;

        let mut applied = sqlx::query_scalar::<_, i64>(
            "INSERT INTO user_roles (user_id, role_id) \
             SELECT $1, id FROM roles WHERE id = ANY($2) \
             ON CONFLICT DO NOTHING RETURNING role_id",
        )
        .bind(user_id)
        .bind(role_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign roles", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;

        applied.sort_unstable();
        Ok(applied)
    }
}
