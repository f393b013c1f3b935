//! Bootstrap seeding of the permission catalog, roles and the default
//! administrator.
//!
//! Every step only inserts what is missing, so seeding can run on each
//! startup.

use serde::Serialize;
use tracing::info;

use taskhub_core::config::BootstrapConfig;
use taskhub_core::result::AppResult;
use taskhub_entity::permission::NewPermission;
use taskhub_entity::role::{NewRole, Role};
use taskhub_entity::user::CreateUser;

use crate::store::Stores;

/// Name of the seeded superadmin role.
pub const SUPERADMIN_ROLE: &str = "Super Administrator";

/// `(code, display name, group)` for every seeded permission.
pub const BASE_PERMISSIONS: &[(&str, &str, &str)] = &[
    ("users.view", "View users", "users"),
    ("users.create", "Create users", "users"),
    ("users.update", "Update users", "users"),
    ("users.delete", "Delete users", "users"),
    ("roles.view", "View roles", "roles"),
    ("roles.create", "Create roles", "roles"),
    ("roles.update", "Update roles", "roles"),
    ("roles.delete", "Delete roles", "roles"),
    ("projects.view", "View projects", "projects"),
    ("projects.create", "Create projects", "projects"),
    ("projects.update", "Update projects", "projects"),
    ("projects.delete", "Delete projects", "projects"),
    ("tasks.view", "View tasks", "tasks"),
    ("tasks.create", "Create tasks", "tasks"),
    ("tasks.update", "Update tasks", "tasks"),
    ("tasks.delete", "Delete tasks", "tasks"),
    ("teams.view", "View teams", "teams"),
    ("teams.create", "Create teams", "teams"),
    ("teams.update", "Update teams", "teams"),
    ("teams.delete", "Delete teams", "teams"),
    ("analytics.view", "View analytics", "analytics"),
    ("analytics.export", "Export analytics", "analytics"),
    ("analytics.delete", "Delete analytics", "analytics"),
];

/// Roles created without grants; administrators assign permissions later.
pub const BUILTIN_ROLES: &[&str] = &[
    "Administrator",
    "Project",
    "Operations",
    "Procurement",
    "Design",
    "Frontend",
    "Backend",
    "Fullstack",
    "Sales",
    "HR",
];

/// What a seeding run inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub permissions_created: usize,
    pub roles_created: usize,
    pub admin_created: bool,
}

/// Seed the catalog, the superadmin and built-in roles, and the default
/// administrator. `hash_password` turns the configured admin password into
/// a stored hash and is only called when the admin is missing.
pub async fn seed_defaults<F>(
    stores: &Stores,
    config: &BootstrapConfig,
    hash_password: F,
) -> AppResult<SeedReport>
where
    F: FnOnce(&str) -> AppResult<String>,
{
    let mut report = SeedReport::default();

    for (code, name, group) in BASE_PERMISSIONS {
        let (_, created) = stores
            .roles
            .ensure_permission(&NewPermission {
                code: (*code).to_string(),
                name: (*name).to_string(),
                group: (*group).to_string(),
                description: None,
            })
            .await?;
        if created {
            report.permissions_created += 1;
        }
    }

    let (superadmin, created) = ensure_role(stores, SUPERADMIN_ROLE, true).await?;
    if created {
        report.roles_created += 1;
    }
    for name in BUILTIN_ROLES {
        let (_, created) = ensure_role(stores, name, false).await?;
        if created {
            report.roles_created += 1;
        }
    }

    if stores
        .users
        .find_by_username(&config.admin_username)
        .await?
        .is_none()
    {
        let password_hash = hash_password(&config.admin_password)?;
        stores
            .users
            .create(&CreateUser {
                username: config.admin_username.clone(),
                nickname: Some(config.admin_nickname.clone()),
                email: None,
                phone: None,
                password_hash,
                is_admin: true,
                role_id: Some(superadmin.id),
            })
            .await?;
        report.admin_created = true;
    }

    info!(
        permissions_created = report.permissions_created,
        roles_created = report.roles_created,
        admin_created = report.admin_created,
        "Seed data applied"
    );
    Ok(report)
}

async fn ensure_role(stores: &Stores, name: &str, superadmin: bool) -> AppResult<(Role, bool)> {
    if let Some(existing) = stores.roles.find_role_by_name(name).await? {
        return Ok((existing, false));
    }
    let role = stores
        .roles
        .create_role(&NewRole {
            name: name.to_string(),
            remark: None,
            is_superadmin: superadmin,
        })
        .await?;
    Ok((role, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let stores = Stores::memory();
        let config = BootstrapConfig::default();

        let first = seed_defaults(&stores, &config, |p| Ok(format!("hashed:{p}")))
            .await
            .unwrap();
        assert_eq!(first.permissions_created, 23);
        assert_eq!(first.roles_created, BUILTIN_ROLES.len() + 1);
        assert!(first.admin_created);

        let second = seed_defaults(&stores, &config, |_| panic!("admin already exists"))
            .await
            .unwrap();
        assert_eq!(second, SeedReport::default());
    }

    #[tokio::test]
    async fn test_admin_holds_superadmin_role() {
        let stores = Stores::memory();
        let config = BootstrapConfig::default();
        seed_defaults(&stores, &config, |p| Ok(format!("hashed:{p}")))
            .await
            .unwrap();

        let admin = stores
            .users
            .find_by_username("admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.password_hash, "hashed:admin123");
        let role = stores
            .roles
            .find_role(admin.role_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(role.is_superadmin);
        assert_eq!(role.name, SUPERADMIN_ROLE);
    }
}
