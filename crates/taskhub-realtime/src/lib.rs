//! # taskhub-realtime
//!
//! Real-time delivery for TaskHub:
//!
//! - a registry holding at most one live connection per user
//! - presence coordination (online flag, status broadcasts)
//! - notification creation with best-effort live push
//! - rules turning domain events into notifications

pub mod connection;
pub mod message;
pub mod notification;
pub mod presence;
pub mod server;

pub use connection::handle::{ConnectionHandle, DeliveryError, close_code};
pub use connection::registry::ConnectionRegistry;
pub use message::types::{InboundMessage, NotificationPayload, OutboundMessage};
pub use notification::dispatcher::NotificationDispatcher;
pub use notification::rules::NotificationRules;
pub use presence::tracker::PresenceTracker;
pub use server::RealtimeEngine;
