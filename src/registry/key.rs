//! Routing key types

use serde::{Deserialize, Serialize};

/// Identifies an event within a channel (e.g. `system` / `start`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    /// Coarse namespace (e.g., "system", "ui", "account")
    pub channel: String,
    /// Event name within the channel
    pub event: String,
}

impl EventKey {
    /// Create a new event key
    pub fn new(channel: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            event: event.into(),
        }
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.channel, self.event)
    }
}
