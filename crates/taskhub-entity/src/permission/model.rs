//! Permission catalog model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Immutable catalog entry identified by its code, e.g. `projects.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: i64,
    /// Unique permission code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Module the permission belongs to, e.g. `projects`.
    #[sqlx(rename = "group_name")]
    pub group: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPermission {
    pub code: String,
    pub name: String,
    pub group: String,
    pub description: Option<String>,
}

/// Grant edge between a role and a permission; unique on the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct RolePermission {
    pub role_id: i64,
    pub permission_id: i64,
}

/// Permissions of one module, for grouped listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGroup {
    pub group: String,
    pub items: Vec<Permission>,
}

impl PermissionGroup {
    /// Group an already ordered permission list, preserving first-seen
    /// group order.
    pub fn group_all(permissions: Vec<Permission>) -> Vec<Self> {
        let mut groups: Vec<Self> = Vec::new();
        for permission in permissions {
            match groups.iter_mut().find(|g| g.group == permission.group) {
                Some(group) => group.items.push(permission),
                None => groups.push(Self {
                    group: permission.group.clone(),
                    items: vec![permission],
                }),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(id: i64, code: &str, group: &str) -> Permission {
        Permission {
            id,
            code: code.to_string(),
            name: code.to_string(),
            group: group.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_group_all_keeps_order() {
        let grouped = PermissionGroup::group_all(vec![
            perm(1, "projects.view", "projects"),
            perm(2, "projects.create", "projects"),
            perm(3, "roles.view", "roles"),
        ]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].group, "projects");
        assert_eq!(grouped[0].items.len(), 2);
        assert_eq!(grouped[1].items[0].code, "roles.view");
    }
}
