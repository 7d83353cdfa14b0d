//! Mediator error types
//!
//! None of these cross the public boundary: `register`, `unregister` and
//! `publish` log them and carry on.

use thiserror::Error;

use crate::registry::EventKey;

/// Error type for contract validation and delivery
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediatorError {
    /// `name`, `code` or `description` is empty
    #[error("component {field} must not be empty")]
    EmptyIdentity { field: &'static str },

    /// The code the mediator publishes its own notifications under
    #[error("component code '{code}' is reserved for the mediator")]
    ReservedCode { code: String },

    /// A subscription group without a channel name
    #[error("subscription group #{index} has an empty channel")]
    EmptyChannel { index: usize },

    /// A subscription group without events
    #[error("subscription channel '{channel}' declares no events")]
    NoEvents { channel: String },

    /// A subscription event without a name
    #[error("subscription channel '{channel}' has an unnamed event at #{index}")]
    UnnamedEvent { channel: String, index: usize },

    /// A publication entry missing one of its six required fields
    #[error("publication #{index} ('{channel}:{event}') is missing '{field}'")]
    IncompletePublication {
        index: usize,
        channel: String,
        event: String,
        field: &'static str,
    },

    /// A subscriber returned an error or panicked while handling an event
    #[error("subscriber '{code}' failed on {key}: {reason}")]
    SubscriberFailed {
        code: String,
        key: EventKey,
        reason: String,
    },
}

/// Result type for mediator-internal operations
pub type Result<T> = std::result::Result<T, MediatorError>;
