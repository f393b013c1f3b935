//! JWT token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;

use taskhub_core::config::AuthConfig;
use taskhub_core::error::{AppError, ErrorKind};

use super::claims::Claims;

/// Issues HS256-signed access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    default_ttl: Duration,
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl JwtEncoder {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            default_ttl: Duration::minutes(config.access_token_ttl_minutes as i64),
        }
    }

    /// Issue a token for `user_id` with the configured TTL.
    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, AppError> {
        self.issue_with_ttl(user_id, self.default_ttl)
    }

    /// Issue a token for `user_id` that expires `ttl` from now.
    pub fn issue_with_ttl(&self, user_id: i64, ttl: Duration) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to sign token", e))?;

        Ok(IssuedToken {
            access_token,
            expires_at,
        })
    }
}
