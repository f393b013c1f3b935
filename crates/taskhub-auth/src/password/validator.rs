//! Password policy for newly chosen passwords.

use taskhub_core::config::AuthConfig;
use taskhub_core::error::AppError;

#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Length is counted in characters, not bytes.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.trim().is_empty() {
            return Err(AppError::validation("Password must not be blank"));
        }
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }

    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_length_in_chars() {
        let validator = PasswordValidator::new(&AuthConfig::default());
        assert!(validator.validate("short").is_err());
        assert!(validator.validate("密码密码密码").is_ok());
        assert!(validator.validate("      ").is_err());
    }

    #[test]
    fn test_new_must_differ() {
        let validator = PasswordValidator::new(&AuthConfig::default());
        assert!(validator.validate_not_same("abc123", "abc123").is_err());
        assert!(validator.validate_not_same("abc123", "abc124").is_ok());
    }
}
