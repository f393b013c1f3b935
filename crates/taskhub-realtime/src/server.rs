//! Top-level real-time engine that ties the subsystems together.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use taskhub_core::config::RealtimeConfig;
use taskhub_database::store::{NotificationStore, UserStore};

use crate::connection::handle::{ConnectionHandle, close_code};
use crate::connection::registry::ConnectionRegistry;
use crate::message::types::OutboundMessage;
use crate::notification::dispatcher::NotificationDispatcher;
use crate::presence::tracker::PresenceTracker;

/// Shared by every request handler and WebSocket session.
#[derive(Clone)]
pub struct RealtimeEngine {
    pub config: RealtimeConfig,
    pub registry: Arc<ConnectionRegistry>,
    pub presence: Arc<PresenceTracker>,
    pub notifications: Arc<NotificationDispatcher>,
}

impl RealtimeEngine {
    pub fn new(
        config: RealtimeConfig,
        users: Arc<dyn UserStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Arc::new(PresenceTracker::new(users, registry.clone()));
        let notifications = Arc::new(NotificationDispatcher::new(notifications, registry.clone()));

        info!(
            channel_buffer = config.channel_buffer_size,
            "Real-time engine initialized"
        );

        Self {
            config,
            registry,
            presence,
            notifications,
        }
    }

    /// A handle for a user's new session, sized from the configuration.
    pub fn new_connection(
        &self,
        user_id: i64,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        ConnectionHandle::new(user_id, self.config.channel_buffer_size)
    }

    /// Ask every live session to close.
    pub fn shutdown(&self) {
        let users = self.registry.online_user_ids();
        for user_id in &users {
            if let Some(handle) = self.registry.get(*user_id) {
                handle.close(close_code::GOING_AWAY);
            }
        }
        info!(closed = users.len(), "Real-time engine shut down");
    }
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskhub_database::memory::MemoryStore;

    #[tokio::test]
    async fn test_shutdown_closes_sessions() {
        let store = Arc::new(MemoryStore::new());
        let engine = RealtimeEngine::new(RealtimeConfig::default(), store.clone(), store);
        let (handle, _rx) = engine.new_connection(4);
        engine.registry.connect(handle.clone());

        engine.shutdown();
        assert_eq!(handle.close_code(), Some(close_code::GOING_AWAY));
    }
}
