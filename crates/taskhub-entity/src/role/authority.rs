//! Authority granted by a set of roles.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::Role;

/// What a role (or a combination of roles) is allowed to do.
///
/// A superadmin role holds the whole catalog without grants; every other
/// role holds exactly the codes granted to it. Combining authorities is a
/// union in which `Superadmin` absorbs everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "codes", rename_all = "snake_case")]
pub enum RoleAuthority {
    Superadmin,
    Scoped(BTreeSet<String>),
}

impl RoleAuthority {
    /// Authority of no roles at all.
    pub fn none() -> Self {
        Self::Scoped(BTreeSet::new())
    }

    /// Authority of a single role, given the codes granted to it.
    ///
    /// The grants are ignored for superadmin roles.
    pub fn of_role(role: &Role, granted: impl IntoIterator<Item = String>) -> Self {
        if role.is_superadmin {
            Self::Superadmin
        } else {
            Self::Scoped(granted.into_iter().collect())
        }
    }

    /// Union of two authorities; superadmin wins.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Superadmin, _) | (_, Self::Superadmin) => Self::Superadmin,
            (Self::Scoped(mut left), Self::Scoped(right)) => {
                left.extend(right);
                Self::Scoped(left)
            }
        }
    }

    pub fn is_superadmin(&self) -> bool {
        matches!(self, Self::Superadmin)
    }

    /// Expand into concrete codes, reading the catalog only for superadmin.
    pub fn into_codes<F>(self, catalog: F) -> BTreeSet<String>
    where
        F: FnOnce() -> BTreeSet<String>,
    {
        match self {
            Self::Superadmin => catalog(),
            Self::Scoped(codes) => codes,
        }
    }
}

impl Default for RoleAuthority {
    fn default() -> Self {
        Self::none()
    }
}

impl FromIterator<RoleAuthority> for RoleAuthority {
    fn from_iter<I: IntoIterator<Item = RoleAuthority>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::combine)
    }
}
