//! Password scheme abstraction and the primary Argon2 scheme.

use std::fmt;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use tracing::warn;

use taskhub_core::error::AppError;

/// A password hash format that can be recognized and verified.
pub trait PasswordScheme: Send + Sync + fmt::Debug {
    /// Short identifier used in logs.
    fn id(&self) -> &'static str;

    /// Whether `hash` is in this scheme's format.
    fn recognizes(&self, hash: &str) -> bool;

    /// Verify `password` against a hash this scheme recognizes.
    ///
    /// Returns `Ok(false)` on mismatch or when the stored hash is malformed,
    /// and `Err` only when verification itself fails.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError>;
}

/// Argon2id in PHC string format; the scheme new hashes are written in.
#[derive(Debug, Clone, Default)]
pub struct Argon2Scheme;

impl Argon2Scheme {
    /// Hash with a random salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }
}

impl PasswordScheme for Argon2Scheme {
    fn id(&self) -> &'static str {
        "argon2"
    }

    fn recognizes(&self, hash: &str) -> bool {
        hash.starts_with("$argon2")
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Malformed argon2 password hash");
                return Ok(false);
            }
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}
