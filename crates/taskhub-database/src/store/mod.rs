//! Store traits consumed by the auth, realtime and API layers.

mod traits;

pub use traits::{NotificationPage, NotificationStore, RoleStore, UserStore};

use std::sync::Arc;

use tracing::info;

use taskhub_core::config::{DatabaseConfig, StoreProvider};
use taskhub_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{NotificationRepository, RoleRepository, UserRepository};

/// The set of stores a running server uses.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pool: Option<DatabasePool>,
}

impl Stores {
    /// Build stores for the configured provider, running migrations for
    /// PostgreSQL when enabled.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            StoreProvider::Memory => {
                info!("Using in-memory store; data is not persisted");
                Ok(Self::memory())
            }
            StoreProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }

    /// Stores backed by a fresh [`MemoryStore`].
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            roles: store.clone(),
            notifications: store,
            pool: None,
        }
    }

    /// Stores backed by PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            users: Arc::new(UserRepository::new(pg.clone())),
            roles: Arc::new(RoleRepository::new(pg.clone())),
            notifications: Arc::new(NotificationRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// The PostgreSQL pool, absent for the memory provider.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Returns `true` when the backing store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("postgres", &self.pool.is_some())
            .finish()
    }
}
