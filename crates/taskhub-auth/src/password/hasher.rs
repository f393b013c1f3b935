//! Password hashing with scheme dispatch.

use std::sync::Arc;

use tracing::warn;

use taskhub_core::error::AppError;

use super::legacy::Pbkdf2Sha256Scheme;
use super::scheme::{Argon2Scheme, PasswordScheme};

/// Hashes new passwords with Argon2 and verifies hashes in any registered
/// scheme.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    primary: Argon2Scheme,
    legacy: Vec<Arc<dyn PasswordScheme>>,
}

impl PasswordHasher {
    /// Argon2 primary with the `pbkdf2-sha256` legacy verifier.
    pub fn new() -> Self {
        Self::primary_only().with_legacy(Arc::new(Pbkdf2Sha256Scheme))
    }

    /// Argon2 only; hashes in any other format never verify.
    pub fn primary_only() -> Self {
        Self {
            primary: Argon2Scheme,
            legacy: Vec::new(),
        }
    }

    /// Accept hashes in an additional scheme.
    pub fn with_legacy(mut self, scheme: Arc<dyn PasswordScheme>) -> Self {
        self.legacy.push(scheme);
        self
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        self.primary.hash(password)
    }

    /// Verify against whichever scheme recognizes `hash`.
    ///
    /// A hash no scheme recognizes never verifies.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        if self.primary.recognizes(hash) {
            return self.primary.verify(password, hash);
        }
        match self.legacy.iter().find(|s| s.recognizes(hash)) {
            Some(scheme) => scheme.verify(password, hash),
            None => {
                warn!("Password hash in unrecognized format");
                Ok(false)
            }
        }
    }

    /// Whether a stored hash should be replaced by a primary-scheme hash.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        !self.primary.recognizes(hash)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
