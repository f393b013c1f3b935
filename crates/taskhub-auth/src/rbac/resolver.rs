//! Effective permission resolution.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use taskhub_core::result::AppResult;
use taskhub_database::store::{RoleStore, UserStore};
use taskhub_entity::role::{Role, RoleAuthority};
use taskhub_entity::user::User;

/// Computes the permission codes a user holds through their primary and
/// additional roles.
///
/// Nothing is cached: every call reads the current roles and grants.
#[derive(Clone)]
pub struct PermissionResolver {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
}

impl PermissionResolver {
    pub fn new(users: Arc<dyn UserStore>, roles: Arc<dyn RoleStore>) -> Self {
        Self { users, roles }
    }

    /// Primary role plus additional roles, deduplicated and ascending.
    pub async fn role_ids(&self, user: &User) -> AppResult<Vec<i64>> {
        let mut ids: BTreeSet<i64> = self
            .users
            .additional_role_ids(user.id)
            .await?
            .into_iter()
            .collect();
        ids.extend(user.role_id);
        ids.retain(|id| *id > 0);
        Ok(ids.into_iter().collect())
    }

    /// The combined authority of the user's roles.
    ///
    /// Role ids that no longer exist are skipped. Grants are only read
    /// when no role is superadmin.
    pub async fn authority(&self, user: &User) -> AppResult<RoleAuthority> {
        let ids = self.role_ids(user).await?;
        if ids.is_empty() {
            return Ok(RoleAuthority::none());
        }

        let roles = self.roles.find_roles(&ids).await?;
        if roles.len() < ids.len() {
            debug!(
                user_id = user.id,
                requested = ids.len(),
                found = roles.len(),
                "Skipping dangling role references"
            );
        }

        let combined: RoleAuthority = roles
            .iter()
            .map(|role| RoleAuthority::of_role(role, std::iter::empty()))
            .collect();
        match combined {
            RoleAuthority::Superadmin => Ok(RoleAuthority::Superadmin),
            RoleAuthority::Scoped(_) => {
                let found: Vec<i64> = roles.iter().map(|r| r.id).collect();
                Ok(RoleAuthority::Scoped(self.roles.granted_codes(&found).await?))
            }
        }
    }

    /// The authority of a single role.
    pub async fn role_authority(&self, role: &Role) -> AppResult<RoleAuthority> {
        if role.is_superadmin {
            return Ok(RoleAuthority::Superadmin);
        }
        Ok(RoleAuthority::Scoped(
            self.roles.granted_codes(&[role.id]).await?,
        ))
    }

    /// Effective permission codes of `user`. A superadmin receives the
    /// whole catalog.
    pub async fn resolve(&self, user: &User) -> AppResult<BTreeSet<String>> {
        match self.authority(user).await? {
            RoleAuthority::Superadmin => self.roles.permission_catalog().await,
            RoleAuthority::Scoped(codes) => Ok(codes),
        }
    }
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskhub_database::Stores;
    use taskhub_entity::permission::NewPermission;
    use taskhub_entity::role::NewRole;
    use taskhub_entity::user::CreateUser;

    const CATALOG: &[&str] = &[
        "projects.view",
        "projects.create",
        "tasks.view",
        "tasks.create",
        "roles.delete",
    ];

    struct Fixture {
        stores: Stores,
        resolver: PermissionResolver,
    }

    impl Fixture {
        async fn new() -> Self {
            let stores = Stores::memory();
            for code in CATALOG {
                let group = code.split('.').next().unwrap().to_string();
                stores
                    .roles
                    .ensure_permission(&NewPermission {
                        code: code.to_string(),
                        name: code.to_string(),
                        group,
                        description: None,
                    })
                    .await
                    .unwrap();
            }
            let resolver =
                PermissionResolver::new(stores.users.clone(), stores.roles.clone());
            Self { stores, resolver }
        }

        async fn role(&self, name: &str, superadmin: bool, codes: &[&str]) -> Role {
            let role = self
                .stores
                .roles
                .create_role(&NewRole {
                    name: name.to_string(),
                    remark: None,
                    is_superadmin: superadmin,
                })
                .await
                .unwrap();
            self.grant(&role, codes).await;
            role
        }

        async fn grant(&self, role: &Role, codes: &[&str]) {
            let catalog = self.stores.roles.list_permissions().await.unwrap();
            let mut ids = self.stores.roles.granted_permission_ids(role.id).await.unwrap();
            ids.extend(
                catalog
                    .iter()
                    .filter(|p| codes.contains(&p.code.as_str()))
                    .map(|p| p.id),
            );
            self.stores.roles.replace_grants(role.id, &ids).await.unwrap();
        }

        async fn user(&self, name: &str, primary: Option<i64>, additional: &[i64]) -> User {
            let user = self
                .stores
                .users
                .create(&CreateUser {
                    username: name.to_string(),
                    nickname: None,
                    email: None,
                    phone: None,
                    password_hash: String::new(),
                    is_admin: false,
                    role_id: primary,
                })
                .await
                .unwrap();
            self.stores
                .users
                .replace_additional_roles(user.id, additional)
                .await
                .unwrap();
            user
        }
    }

    fn set(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_user_without_roles_has_nothing() {
        let fx = Fixture::new().await;
        let nobody = fx.user("nobody", None, &[]).await;
        assert!(fx.resolver.resolve(&nobody).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_primary_and_additional_roles_union() {
        let fx = Fixture::new().await;
        let editor = fx.role("editor", false, &["projects.view"]).await;
        let viewer = fx.role("viewer", false, &["tasks.view"]).await;
        let alice = fx.user("alice", Some(editor.id), &[viewer.id]).await;

        assert_eq!(
            fx.resolver.resolve(&alice).await.unwrap(),
            set(&["projects.view", "tasks.view"])
        );
    }

    #[tokio::test]
    async fn test_superadmin_gets_full_catalog_without_grants() {
        let fx = Fixture::new().await;
        let root = fx.role("root", true, &[]).await;
        let bob = fx.user("bob", Some(root.id), &[]).await;

        assert_eq!(fx.resolver.resolve(&bob).await.unwrap(), set(CATALOG));
        assert!(fx.resolver.authority(&bob).await.unwrap().is_superadmin());
    }

    #[tokio::test]
    async fn test_superadmin_through_additional_role() {
        let fx = Fixture::new().await;
        let viewer = fx.role("viewer", false, &["tasks.view"]).await;
        let root = fx.role("root", true, &[]).await;
        let carol = fx.user("carol", Some(viewer.id), &[root.id]).await;

        assert_eq!(fx.resolver.resolve(&carol).await.unwrap().len(), CATALOG.len());
    }

    #[tokio::test]
    async fn test_dangling_role_reference_is_skipped() {
        let fx = Fixture::new().await;
        let viewer = fx.role("viewer", false, &["tasks.view"]).await;
        let mut dave = fx.user("dave", Some(viewer.id), &[]).await;
        dave.role_id = Some(9_999);
        assert!(fx.resolver.resolve(&dave).await.unwrap().is_empty());

        dave.role_id = Some(viewer.id);
        assert_eq!(fx.resolver.resolve(&dave).await.unwrap(), set(&["tasks.view"]));
    }

    #[tokio::test]
    async fn test_adding_a_grant_only_grows_the_set() {
        let fx = Fixture::new().await;
        let editor = fx.role("editor", false, &["projects.view"]).await;
        let erin = fx.user("erin", Some(editor.id), &[]).await;
        let before = fx.resolver.resolve(&erin).await.unwrap();

        fx.grant(&editor, &["tasks.create"]).await;
        let after = fx.resolver.resolve(&erin).await.unwrap();
        assert!(after.is_superset(&before));
        assert!(after.contains("tasks.create"));
    }
}
