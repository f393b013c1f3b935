//! Real-time WebSocket configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound messages buffered per connection before pushes are dropped.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum inbound text frame size in bytes.
    #[serde(default = "default_max_message")]
    pub max_message_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            max_message_size: default_max_message(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_message() -> usize {
    64 * 1024
}
