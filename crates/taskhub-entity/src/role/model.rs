//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named bundle of permission codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    /// Unique role name.
    pub name: String,
    /// Holds every permission code without explicit grants.
    pub is_superadmin: bool,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub remark: Option<String>,
    #[serde(default)]
    pub is_superadmin: bool,
}

/// Additional role membership beyond a user's primary role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserRole {
    pub user_id: i64,
    pub role_id: i64,
}
