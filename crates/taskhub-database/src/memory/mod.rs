//! In-process store implementing every store trait.
//!
//! Used by the `memory` provider and by tests. Mirrors the PostgreSQL
//! schema rules: unique usernames, role names and permission codes,
//! unique grant and membership pairs, and cascading role deletion.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::types::PageRequest;
use taskhub_entity::notification::{NewNotification, Notification};
use taskhub_entity::permission::{NewPermission, Permission};
use taskhub_entity::role::{NewRole, Role};
use taskhub_entity::user::{CreateUser, LoginLog, NewLoginLog, UpdateProfile, User};

use crate::store::{NotificationPage, NotificationStore, RoleStore, UserStore};

#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i64, User>,
    user_ids: Sequence,
    user_roles: BTreeSet<(i64, i64)>,
    login_logs: Vec<LoginLog>,
    login_log_ids: Sequence,
    roles: BTreeMap<i64, Role>,
    role_ids: Sequence,
    permissions: BTreeMap<i64, Permission>,
    permission_ids: Sequence,
    grants: BTreeSet<(i64, i64)>,
    notifications: BTreeMap<i64, Notification>,
    notification_ids: Sequence,
}

/// Memory-backed implementation of [`UserStore`], [`RoleStore`] and
/// [`NotificationStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: &CreateUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AppError::conflict("Username already exists"));
        }
        let id = state.user_ids.next();
        let created = User {
            id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            avatar: None,
            password_hash: user.password_hash.clone(),
            is_admin: user.is_admin,
            role_id: user.role_id,
            is_active: true,
            online: false,
            created_at: Utc::now(),
            last_login: None,
        };
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn update_profile(&self, id: i64, profile: &UpdateProfile) -> AppResult<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(nickname) = &profile.nickname {
            user.nickname = Some(nickname.clone());
        }
        if let Some(email) = &profile.email {
            user.email = Some(email.clone());
        }
        if let Some(phone) = &profile.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(avatar) = &profile.avatar {
            user.avatar = Some(avatar.clone());
        }
        Ok(Some(user.clone()))
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> AppResult<()> {
        if let Some(user) = self.state.write().await.users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn set_active(&self, id: i64, active: bool) -> AppResult<bool> {
        match self.state.write().await.users.get_mut(&id) {
            Some(user) => {
                user.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_online(&self, id: i64, online: bool) -> AppResult<()> {
        if let Some(user) = self.state.write().await.users.get_mut(&id) {
            user.online = online;
        }
        Ok(())
    }

    async fn touch_last_login(&self, id: i64) -> AppResult<()> {
        if let Some(user) = self.state.write().await.users.get_mut(&id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn record_login(&self, entry: &NewLoginLog) -> AppResult<LoginLog> {
        let mut state = self.state.write().await;
        let id = state.login_log_ids.next();
        let log = LoginLog {
            id,
            user_id: entry.user_id,
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            login_at: Utc::now(),
        };
        if let Some(user) = state.users.get_mut(&entry.user_id) {
            user.last_login = Some(log.login_at);
        }
        state.login_logs.push(log.clone());
        Ok(log)
    }

    async fn login_logs(&self, user_id: i64, limit: u64) -> AppResult<Vec<LoginLog>> {
        let state = self.state.read().await;
        Ok(state
            .login_logs
            .iter()
            .rev()
            .filter(|log| log.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn additional_role_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let state = self.state.read().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, role_id)| *role_id)
            .collect())
    }

    async fn replace_additional_roles(
        &self,
        user_id: i64,
        role_ids: &[i64],
    ) -> AppResult<Vec<i64>> {
        let mut state = self.state.write().await;
        state.user_roles.retain(|(uid, _)| *uid != user_id);
        let applied: BTreeSet<i64> = role_ids
            .iter()
            .copied()
            .filter(|id| state.roles.contains_key(id))
            .collect();
        for role_id in &applied {
            state.user_roles.insert((user_id, *role_id));
        }
        Ok(applied.into_iter().collect())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.state.read().await.roles.values().cloned().collect())
    }

    async fn find_role(&self, id: i64) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.read().await;
        Ok(state.roles.values().find(|r| r.name == name).cloned())
    }

    async fn find_roles(&self, ids: &[i64]) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| state.roles.get(&id).cloned())
            .collect())
    }

    async fn create_role(&self, role: &NewRole) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if state.roles.values().any(|r| r.name == role.name) {
            return Err(AppError::conflict("Role name already exists"));
        }
        let id = state.role_ids.next();
        let created = Role {
            id,
            name: role.name.clone(),
            is_superadmin: role.is_superadmin,
            remark: role.remark.clone(),
            created_at: Utc::now(),
        };
        state.roles.insert(id, created.clone());
        Ok(created)
    }

    async fn delete_role(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.grants.retain(|(role_id, _)| *role_id != id);
        if state.roles.remove(&id).is_none() {
            return Ok(false);
        }
        state.user_roles.retain(|(_, role_id)| *role_id != id);
        for user in state.users.values_mut() {
            if user.role_id == Some(id) {
                user.role_id = None;
            }
        }
        Ok(true)
    }

    async fn granted_codes(&self, role_ids: &[i64]) -> AppResult<BTreeSet<String>> {
        let state = self.state.read().await;
        Ok(state
            .grants
            .iter()
            .filter(|(role_id, _)| role_ids.contains(role_id))
            .filter_map(|(_, permission_id)| state.permissions.get(permission_id))
            .map(|p| p.code.clone())
            .collect())
    }

    async fn granted_permission_ids(&self, role_id: i64) -> AppResult<Vec<i64>> {
        let state = self.state.read().await;
        Ok(state
            .grants
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .map(|(_, permission_id)| *permission_id)
            .collect())
    }

    async fn replace_grants(&self, role_id: i64, permission_ids: &[i64]) -> AppResult<Vec<i64>> {
        let mut state = self.state.write().await;
        state.grants.retain(|(rid, _)| *rid != role_id);
        let applied: BTreeSet<i64> = permission_ids
            .iter()
            .copied()
            .filter(|id| state.permissions.contains_key(id))
            .collect();
        for permission_id in &applied {
            state.grants.insert((role_id, *permission_id));
        }
        Ok(applied.into_iter().collect())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let mut permissions: Vec<Permission> = state.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| a.group.cmp(&b.group).then(a.id.cmp(&b.id)));
        Ok(permissions)
    }

    async fn permission_catalog(&self) -> AppResult<BTreeSet<String>> {
        let state = self.state.read().await;
        Ok(state.permissions.values().map(|p| p.code.clone()).collect())
    }

    async fn ensure_permission(
        &self,
        permission: &NewPermission,
    ) -> AppResult<(Permission, bool)> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .permissions
            .values()
            .find(|p| p.code == permission.code)
        {
            return Ok((existing.clone(), false));
        }
        let id = state.permission_ids.next();
        let created = Permission {
            id,
            code: permission.code.clone(),
            name: permission.name.clone(),
            group: permission.group.clone(),
            description: permission.description.clone(),
        };
        state.permissions.insert(id, created.clone());
        Ok((created, true))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, notification: &NewNotification) -> AppResult<Notification> {
        let mut state = self.state.write().await;
        let id = state.notification_ids.next();
        let created = Notification {
            id,
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title.clone(),
            content: notification.content.clone(),
            related_id: notification.related_id,
            related_type: notification.related_type.clone(),
            is_read: false,
            created_at: Utc::now(),
        };
        state.notifications.insert(id, created.clone());
        Ok(created)
    }

    async fn list(
        &self,
        user_id: i64,
        only_unread: bool,
        page: &PageRequest,
    ) -> AppResult<NotificationPage> {
        let state = self.state.read().await;
        let mut matching: Vec<&Notification> = state
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && (!only_unread || !n.is_read))
            .collect();
        matching.sort_by(|a, b| {
            a.is_read
                .cmp(&b.is_read)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        let unread_count = state
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64;

        Ok(NotificationPage {
            total: matching.len() as i64,
            unread_count,
            items: matching
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
                .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
        })
    }

    async fn count_unread(&self, user_id: i64) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.notifications.get_mut(&id) {
            Some(n) if n.user_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: i64) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for n in state.notifications.values_mut() {
            if n.user_id == user_id && !n.is_read {
                n.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete(&self, id: i64, user_id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .notifications
            .get(&id)
            .is_some_and(|n| n.user_id == user_id);
        if owned {
            state.notifications.remove(&id);
        }
        Ok(owned)
    }
}
