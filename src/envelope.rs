//! Delivered event records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::EventKey;

/// The full record handed to each subscriber
///
/// Carries the sender's identity alongside the channel, event and payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Name of the sending component
    pub component_name: String,
    /// Code of the sending component
    pub component_code: String,
    pub channel: String,
    pub event: String,
    /// Event payload
    pub data: Value,
    /// Sender-supplied timestamp in epoch milliseconds
    pub timestamp: i64,
}

impl Envelope {
    /// Key this envelope is routed by
    pub fn key(&self) -> EventKey {
        EventKey::new(self.channel.as_str(), self.event.as_str())
    }
}
