use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use taskhub_core::result::AppResult;
use taskhub_core::types::PageRequest;
use taskhub_entity::notification::{NewNotification, Notification};
use taskhub_entity::permission::{NewPermission, Permission};
use taskhub_entity::role::{NewRole, Role};
use taskhub_entity::user::{CreateUser, LoginLog, NewLoginLog, UpdateProfile, User};

/// Users, their additional role memberships and login history.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a user. Fails with `Conflict` when the username is taken.
    async fn create(&self, user: &CreateUser) -> AppResult<User>;

    /// Apply the set fields of `profile`; `None` if the user does not exist.
    async fn update_profile(&self, id: i64, profile: &UpdateProfile) -> AppResult<Option<User>>;

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> AppResult<()>;

    /// Returns `false` if the user does not exist.
    async fn set_active(&self, id: i64, active: bool) -> AppResult<bool>;

    async fn set_online(&self, id: i64, online: bool) -> AppResult<()>;

    async fn touch_last_login(&self, id: i64) -> AppResult<()>;

    /// Store a login log entry and update `last_login`.
    async fn record_login(&self, entry: &NewLoginLog) -> AppResult<LoginLog>;

    /// Most recent login entries first.
    async fn login_logs(&self, user_id: i64, limit: u64) -> AppResult<Vec<LoginLog>>;

    /// Role ids held through additional memberships (not the primary role).
    async fn additional_role_ids(&self, user_id: i64) -> AppResult<Vec<i64>>;

    /// Replace the additional memberships. Unknown role ids are skipped;
    /// the applied ids are returned.
    async fn replace_additional_roles(&self, user_id: i64, role_ids: &[i64])
    -> AppResult<Vec<i64>>;
}

/// Roles, the permission catalog and the grants between them.
#[async_trait]
pub trait RoleStore: Send + Sync + 'static {
    /// All roles ordered by id.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    async fn find_role(&self, id: i64) -> AppResult<Option<Role>>;

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Roles for the given ids; ids that do not exist are skipped.
    async fn find_roles(&self, ids: &[i64]) -> AppResult<Vec<Role>>;

    /// Fails with `Conflict` when the name is taken.
    async fn create_role(&self, role: &NewRole) -> AppResult<Role>;

    /// Delete a role and its grants. Returns `false` if it did not exist.
    async fn delete_role(&self, id: i64) -> AppResult<bool>;

    /// Distinct codes granted to any of the given roles.
    async fn granted_codes(&self, role_ids: &[i64]) -> AppResult<BTreeSet<String>>;

    async fn granted_permission_ids(&self, role_id: i64) -> AppResult<Vec<i64>>;

    /// Replace the grants of a role. Unknown permission ids are skipped;
    /// the applied ids are returned in ascending order.
    async fn replace_grants(&self, role_id: i64, permission_ids: &[i64]) -> AppResult<Vec<i64>>;

    /// The catalog ordered by group, then id.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Every code in the catalog.
    async fn permission_catalog(&self) -> AppResult<BTreeSet<String>>;

    /// Insert a catalog entry unless its code already exists.
    /// Returns the stored entry and whether it was created.
    async fn ensure_permission(&self, permission: &NewPermission)
    -> AppResult<(Permission, bool)>;
}

/// One page of a user's notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPage {
    /// Rows matching the filter across all pages.
    pub total: i64,
    /// Unread rows owned by the user, regardless of the filter.
    pub unread_count: i64,
    pub items: Vec<Notification>,
}

/// Persisted notifications. Every read-state operation is scoped to the
/// owning user.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Persist an unread notification timestamped now.
    async fn insert(&self, notification: &NewNotification) -> AppResult<Notification>;

    /// Unread first, then newest first.
    async fn list(
        &self,
        user_id: i64,
        only_unread: bool,
        page: &PageRequest,
    ) -> AppResult<NotificationPage>;

    async fn count_unread(&self, user_id: i64) -> AppResult<i64>;

    /// Returns `false` when no notification with this id belongs to the user.
    async fn mark_read(&self, id: i64, user_id: i64) -> AppResult<bool>;

    /// Marks the user's unread rows read; returns how many changed.
    async fn mark_all_read(&self, user_id: i64) -> AppResult<u64>;

    /// Returns `false` when no notification with this id belongs to the user.
    async fn delete(&self, id: i64, user_id: i64) -> AppResult<bool>;
}
