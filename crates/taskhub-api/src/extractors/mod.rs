//! Custom Axum extractors.

pub mod auth;
pub mod permission;

pub use auth::AuthUser;
pub use permission::{Authorized, RequiredPermissions};
