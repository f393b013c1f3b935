//! # taskhub-auth
//!
//! Authentication and authorization for TaskHub.
//!
//! ## Modules
//!
//! - `jwt`: signed access token issuance and decoding
//! - `password`: password hashing with pluggable legacy verifiers and policy
//! - `rbac`: permission resolution from roles and the request access guard

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{AccessGuard, PermissionResolver, SessionRejection};
