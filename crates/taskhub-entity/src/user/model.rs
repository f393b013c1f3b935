//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    /// Unique login name.
    pub username: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    /// Password hash in PHC or legacy modular-crypt form.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Marks accounts created as administrators. Authorization never reads
    /// this flag; permissions come from roles only.
    pub is_admin: bool,
    /// Primary role reference.
    pub role_id: Option<i64>,
    /// Deactivated accounts authenticate but are always rejected.
    pub is_active: bool,
    /// Set while a real-time session is registered for the user.
    pub online: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Name shown to other users: the nickname when set, else the username.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    pub is_admin: bool,
    pub role_id: Option<i64>,
}

/// Profile fields a user may change on their own account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}
