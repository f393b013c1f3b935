//! The process-wide map from user id to that user's live connection.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use super::handle::{ConnectionHandle, DeliveryError};
use crate::message::types::OutboundMessage;

/// At most one live connection per user.
///
/// Safe for concurrent use from every session task and request handler.
/// No lock is held while a message is queued.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<i64, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` for its user, returning the handle it replaced.
    ///
    /// The replaced handle is not closed here; the caller decides.
    pub fn connect(&self, handle: Arc<ConnectionHandle>) -> Option<Arc<ConnectionHandle>> {
        let user_id = handle.user_id;
        let previous = self.connections.insert(user_id, handle);
        debug!(
            user_id,
            replaced = previous.is_some(),
            total = self.connections.len(),
            "Connection registered"
        );
        previous
    }

    /// Remove the user's entry, whichever connection it is. Idempotent.
    pub fn disconnect(&self, user_id: i64) -> Option<Arc<ConnectionHandle>> {
        let removed = self.connections.remove(&user_id).map(|(_, handle)| handle);
        if removed.is_some() {
            debug!(user_id, total = self.connections.len(), "Connection removed");
        }
        removed
    }

    /// Remove the user's entry only if it is still `connection_id`.
    ///
    /// Returns `true` when the entry was removed. A session that has been
    /// replaced gets `false` and leaves the newer entry in place.
    pub fn release(&self, user_id: i64, connection_id: Uuid) -> bool {
        let removed = self
            .connections
            .remove_if(&user_id, |_, handle| handle.id == connection_id)
            .is_some();
        if removed {
            debug!(user_id, %connection_id, "Connection released");
        }
        removed
    }

    pub fn get(&self, user_id: i64) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(&user_id).map(|entry| entry.value().clone())
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.connections.contains_key(&user_id)
    }

    /// Queue a message for one user.
    pub fn send_to(&self, user_id: i64, msg: OutboundMessage) -> Result<(), DeliveryError> {
        // Clone the handle out so the shard lock is released before sending.
        let handle = self.get(user_id).ok_or(DeliveryError::Closed)?;
        handle.send(msg)
    }

    /// Queue a message for every registered user; returns how many accepted
    /// it. Per-connection failures are logged and skipped.
    pub fn broadcast(&self, msg: &OutboundMessage) -> usize {
        let targets: Vec<Arc<ConnectionHandle>> = self
            .connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut delivered = 0;
        for handle in targets {
            match handle.send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(user_id = handle.user_id, error = %e, "Broadcast delivery failed"),
            }
        }
        delivered
    }

    /// Users with a registered connection, ascending.
    pub fn online_user_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.connections.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
