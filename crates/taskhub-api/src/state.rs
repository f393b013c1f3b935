//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use taskhub_auth::{AccessGuard, JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator, PermissionResolver};
use taskhub_core::config::AppConfig;
use taskhub_database::store::Stores;
use taskhub_realtime::RealtimeEngine;

/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Persistence ──────────────────────────────────────────
    pub stores: Stores,

    // ── Auth ─────────────────────────────────────────────────
    pub jwt_encoder: Arc<JwtEncoder>,
    pub password_hasher: Arc<PasswordHasher>,
    pub password_validator: Arc<PasswordValidator>,
    pub permission_resolver: Arc<PermissionResolver>,
    /// Authenticates bearer tokens and enforces permission codes.
    pub access_guard: Arc<AccessGuard>,

    // ── Realtime ─────────────────────────────────────────────
    pub realtime: Arc<RealtimeEngine>,
}

impl AppState {
    /// Wire every component over the given stores.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let config = Arc::new(config);

        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let password_hasher = Arc::new(PasswordHasher::new());
        let password_validator = Arc::new(PasswordValidator::new(&config.auth));
        let permission_resolver = Arc::new(PermissionResolver::new(
            Arc::clone(&stores.users),
            Arc::clone(&stores.roles),
        ));
        let access_guard = Arc::new(AccessGuard::new(
            jwt_decoder,
            Arc::clone(&stores.users),
            Arc::clone(&permission_resolver),
        ));
        let realtime = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            Arc::clone(&stores.users),
            Arc::clone(&stores.notifications),
        ));

        Self {
            config,
            stores,
            jwt_encoder,
            password_hasher,
            password_validator,
            permission_resolver,
            access_guard,
            realtime,
        }
    }
}
