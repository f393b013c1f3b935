//! Permission catalog entities.

pub mod model;

pub use model::{NewPermission, Permission, PermissionGroup, RolePermission};
