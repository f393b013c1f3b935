//! Request-time access guard.

use std::sync::Arc;

use tracing::debug;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_database::store::UserStore;
use taskhub_entity::user::User;

use super::resolver::PermissionResolver;
use crate::jwt::JwtDecoder;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a real-time session was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    /// No token, or a token that does not decode.
    InvalidToken,
    /// The token's user is missing or deactivated.
    UserUnavailable,
}

impl SessionRejection {
    /// WebSocket close code sent to the client.
    pub fn close_code(&self) -> u16 {
        match self {
            Self::InvalidToken => 4401,
            Self::UserUnavailable => 4403,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid token",
            Self::UserUnavailable => "user unavailable",
        }
    }
}

/// Two-stage gate: authenticate the bearer credential, then authorize the
/// user against the permission codes an operation declares.
///
/// The guard only reads state.
#[derive(Clone)]
pub struct AccessGuard {
    decoder: Arc<JwtDecoder>,
    users: Arc<dyn UserStore>,
    resolver: Arc<PermissionResolver>,
}

impl AccessGuard {
    pub fn new(
        decoder: Arc<JwtDecoder>,
        users: Arc<dyn UserStore>,
        resolver: Arc<PermissionResolver>,
    ) -> Self {
        Self {
            decoder,
            users,
            resolver,
        }
    }

    /// Authenticate from an `Authorization` header value.
    pub async fn authenticate(&self, authorization: Option<&str>) -> AppResult<User> {
        let header =
            authorization.ok_or_else(|| AppError::authentication("Missing credentials"))?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Malformed authorization header"))?;
        self.authenticate_token(token).await
    }

    /// Authenticate a raw token.
    ///
    /// An undecodable token or a vanished user is `Authentication`; a
    /// deactivated user is `Authorization`.
    pub async fn authenticate_token(&self, token: &str) -> AppResult<User> {
        let user_id = self
            .decoder
            .decode(token)
            .and_then(|claims| claims.user_id())
            .ok_or_else(|| AppError::authentication("Invalid or expired token"))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;

        if !user.is_active {
            return Err(AppError::authorization("Account is disabled"));
        }
        Ok(user)
    }

    /// Reject with `Authorization` unless the user holds every code.
    pub async fn authorize(&self, user: &User, required: &[&str]) -> AppResult<()> {
        if required.is_empty() {
            return Ok(());
        }
        let granted = self.resolver.resolve(user).await?;
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|code| !granted.contains(*code))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        debug!(user_id = user.id, missing = ?missing, "Permission denied");
        Err(AppError::authorization(format!(
            "Missing permission: {}",
            missing.join(", ")
        )))
    }

    /// Authenticate, then authorize.
    pub async fn check(&self, authorization: Option<&str>, required: &[&str]) -> AppResult<User> {
        let user = self.authenticate(authorization).await?;
        self.authorize(&user, required).await?;
        Ok(user)
    }

    /// Admission check for a real-time session token.
    pub async fn admit_session(&self, token: Option<&str>) -> Result<User, SessionRejection> {
        let user_id = token
            .filter(|t| !t.is_empty())
            .and_then(|t| self.decoder.decode(t))
            .and_then(|claims| claims.user_id())
            .ok_or(SessionRejection::InvalidToken)?;

        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) if user.is_active => Ok(user),
            Ok(_) => Err(SessionRejection::UserUnavailable),
            Err(e) => {
                debug!(user_id, error = %e, "User lookup failed during session admission");
                Err(SessionRejection::UserUnavailable)
            }
        }
    }
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}
