//! Notification dispatcher: persists notifications and pushes them to
//! recipients who are connected.

use std::sync::Arc;

use tracing::{debug, warn};

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::types::PageRequest;
use taskhub_database::store::{NotificationPage, NotificationStore};
use taskhub_entity::notification::{NewNotification, Notification};

use crate::connection::registry::ConnectionRegistry;
use crate::message::types::OutboundMessage;

pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    registry: Arc<ConnectionRegistry>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn NotificationStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }

    /// Persist a notification, then push it if the recipient is connected.
    ///
    /// The push is best effort: once the row is stored this succeeds
    /// whether or not delivery did.
    pub async fn create(&self, notification: NewNotification) -> AppResult<Notification> {
        let stored = self.store.insert(&notification).await?;
        self.push(&stored);
        Ok(stored)
    }

    /// Create each notification independently. Failures are logged and
    /// do not stop the rest; the stored notifications are returned.
    pub async fn dispatch_all(&self, batch: Vec<NewNotification>) -> Vec<Notification> {
        let mut stored = Vec::with_capacity(batch.len());
        for notification in batch {
            let user_id = notification.user_id;
            match self.create(notification).await {
                Ok(n) => stored.push(n),
                Err(e) => warn!(user_id, error = %e, "Failed to create notification"),
            }
        }
        stored
    }

    fn push(&self, notification: &Notification) -> bool {
        let Some(handle) = self.registry.get(notification.user_id) else {
            debug!(
                user_id = notification.user_id,
                id = notification.id,
                "Recipient offline, notification stored only"
            );
            return false;
        };
        match handle.send(OutboundMessage::notification(notification)) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    user_id = notification.user_id,
                    id = notification.id,
                    error = %e,
                    "Live notification push failed"
                );
                false
            }
        }
    }

    pub async fn list(
        &self,
        user_id: i64,
        only_unread: bool,
        page: PageRequest,
    ) -> AppResult<NotificationPage> {
        self.store.list(user_id, only_unread, &page.normalized()).await
    }

    pub async fn unread_count(&self, user_id: i64) -> AppResult<i64> {
        self.store.count_unread(user_id).await
    }

    /// Mark one of the user's notifications read. Already-read rows succeed.
    pub async fn mark_read(&self, id: i64, user_id: i64) -> AppResult<()> {
        if self.store.mark_read(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Notification not found"))
        }
    }

    pub async fn mark_all_read(&self, user_id: i64) -> AppResult<u64> {
        self.store.mark_all_read(user_id).await
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> AppResult<()> {
        if self.store.delete(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Notification not found"))
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher").finish_non_exhaustive()
    }
}
