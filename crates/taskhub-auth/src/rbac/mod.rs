//! Role-based access control: permission resolution and the access guard.

pub mod guard;
pub mod resolver;

pub use guard::{AccessGuard, SessionRejection};
pub use resolver::PermissionResolver;
