//! A single live WebSocket session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use crate::message::types::OutboundMessage;

/// WebSocket close codes sent by the server.
pub mod close_code {
    pub const NORMAL: u16 = 1000;
    pub const GOING_AWAY: u16 = 1001;
    pub const INTERNAL_ERROR: u16 = 1011;
    /// Missing or invalid token.
    pub const INVALID_TOKEN: u16 = 4401;
    /// The user is missing or deactivated.
    pub const USER_UNAVAILABLE: u16 = 4403;
    /// A newer session of the same user took over.
    pub const REPLACED: u16 = 4409;
}

/// Why a message could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("connection is closed")]
    Closed,
    #[error("connection send buffer is full")]
    Full,
}

/// The server side of one user's WebSocket session.
///
/// Messages are queued on a bounded channel that the session's writer
/// task drains into the socket, so sending never waits on the network.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Distinguishes this session from a later one of the same user.
    pub id: Uuid,
    pub user_id: i64,
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundMessage>,
    alive: AtomicBool,
    close_code: AtomicU16,
    shutdown: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end its writer task drains.
    pub fn new(user_id: i64, buffer: usize) -> (Arc<Self>, mpsc::Receiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let handle = Arc::new(Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
            close_code: AtomicU16::new(0),
            shutdown: CancellationToken::new(),
        });
        (handle, receiver)
    }

    /// Queue a message without waiting.
    pub fn send(&self, msg: OutboundMessage) -> Result<(), DeliveryError> {
        if !self.is_alive() {
            return Err(DeliveryError::Closed);
        }
        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection = %self.id, "Send buffer full, dropping message");
                Err(DeliveryError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Err(DeliveryError::Closed)
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.sender.is_closed()
    }

    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Ask the session owning this handle to shut down with `code`.
    /// Only the first call picks the code.
    pub fn close(&self, code: u16) {
        let _ = self
            .close_code
            .compare_exchange(0, code, Ordering::SeqCst, Ordering::SeqCst);
        self.mark_dead();
        self.shutdown.cancel();
    }

    /// The code passed to the first [`close`](Self::close), if any.
    pub fn close_code(&self) -> Option<u16> {
        match self.close_code.load(Ordering::SeqCst) {
            0 => None,
            code => Some(code),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }
}
