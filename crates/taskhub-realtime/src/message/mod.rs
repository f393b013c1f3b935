//! WebSocket wire messages.

pub mod types;
