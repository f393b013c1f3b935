//! Role entities and role authority.

pub mod authority;
pub mod model;

pub use authority::RoleAuthority;
pub use model::{NewRole, Role, UserRole};
