//! Password hashing, legacy scheme verification and policy.

pub mod hasher;
pub mod legacy;
pub mod scheme;
pub mod validator;

pub use hasher::PasswordHasher;
pub use legacy::Pbkdf2Sha256Scheme;
pub use scheme::{Argon2Scheme, PasswordScheme};
pub use validator::PasswordValidator;
