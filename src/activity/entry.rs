//! Activity log entry types

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::component::ComponentSpec;
use crate::envelope::Envelope;

/// Kind of recorded occurrence
///
/// Parses from and renders to the lowercase name (`"publish"`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityKind {
    Register,
    Unregister,
    Publish,
    Subscription,
}

/// A component subscribing to one `(channel, event)` at registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRecord {
    pub name: String,
    pub code: String,
    pub channel: String,
    pub event: String,
}

/// Record-specific payload; the variant decides the entry's kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActivityPayload {
    Register(ComponentSpec),
    Unregister(ComponentSpec),
    Publish(Envelope),
    Subscription(SubscriptionRecord),
}

impl ActivityPayload {
    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityPayload::Register(_) => ActivityKind::Register,
            ActivityPayload::Unregister(_) => ActivityKind::Unregister,
            ActivityPayload::Publish(_) => ActivityKind::Publish,
            ActivityPayload::Subscription(_) => ActivityKind::Subscription,
        }
    }
}

/// One immutable record in the activity log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLogEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,

    /// When the entry was appended, in epoch milliseconds
    pub timestamp: i64,

    /// Append order, used to break timestamp ties
    #[serde(skip)]
    pub sequence: u64,

    pub payload: ActivityPayload,
}
