//! Seed data configuration.

use serde::{Deserialize, Serialize};

/// Controls the idempotent seeding of the permission catalog, built-in
/// roles and the default administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_true")]
    pub seed_on_startup: bool,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_admin_nickname")]
    pub admin_nickname: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            seed_on_startup: true,
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            admin_nickname: default_admin_nickname(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_admin_nickname() -> String {
    "Default Administrator".to_string()
}
