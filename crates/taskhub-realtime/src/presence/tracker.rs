//! Presence tracker: keeps the persisted online flag and the connection
//! registry in step, and tells everyone about changes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use taskhub_core::result::AppResult;
use taskhub_database::store::UserStore;

use crate::connection::handle::{ConnectionHandle, close_code};
use crate::connection::registry::ConnectionRegistry;
use crate::message::types::OutboundMessage;

pub struct PresenceTracker {
    users: Arc<dyn UserStore>,
    registry: Arc<ConnectionRegistry>,
    /// Per-user gate; online and offline transitions of one user never
    /// interleave.
    transitions: DashMap<i64, Arc<Mutex<()>>>,
}

impl PresenceTracker {
    pub fn new(users: Arc<dyn UserStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            users,
            registry,
            transitions: DashMap::new(),
        }
    }

    async fn lock_user(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let gate = self
            .transitions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        gate.lock_owned().await
    }

    /// Bring a newly accepted session online.
    ///
    /// Marks the user online, stamps `last_login`, registers the handle and
    /// broadcasts the status change. A session this one displaces is asked
    /// to close and is returned.
    pub async fn go_online(
        &self,
        handle: Arc<ConnectionHandle>,
    ) -> AppResult<Option<Arc<ConnectionHandle>>> {
        let user_id = handle.user_id;
        let _guard = self.lock_user(user_id).await;
        self.users.set_online(user_id, true).await?;
        self.users.touch_last_login(user_id).await?;

        let displaced = self.registry.connect(handle);
        if let Some(previous) = &displaced {
            info!(user_id, connection = %previous.id, "Closing displaced session");
            previous.close(close_code::REPLACED);
        }

        let delivered = self
            .registry
            .broadcast(&OutboundMessage::status_change(user_id, true));
        info!(user_id, notified = delivered, "User online");
        Ok(displaced)
    }

    /// Take a finished session offline.
    ///
    /// Only the session that still owns the registry entry flips presence;
    /// a displaced session's exit changes nothing. Returns whether the
    /// user went offline.
    pub async fn go_offline(&self, handle: &ConnectionHandle) -> bool {
        handle.mark_dead();
        let user_id = handle.user_id;
        let _guard = self.lock_user(user_id).await;
        if !self.registry.release(user_id, handle.id) {
            return false;
        }

        if let Err(e) = self.users.set_online(user_id, false).await {
            warn!(user_id, error = %e, "Failed to persist offline state");
        }
        let delivered = self
            .registry
            .broadcast(&OutboundMessage::status_change(user_id, false));
        info!(user_id, notified = delivered, "User offline");
        true
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceTracker")
            .field("online", &self.registry.len())
            .finish()
    }
}
