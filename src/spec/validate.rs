//! Contract validation
//!
//! Every check runs over the whole contract before the registry applies any
//! of it, so a rejected component leaves no catalog rows or index entries
//! behind.

use serde_json::Value;

use super::types::{PublicationSpec, SubscriptionSpec};
use crate::error::{MediatorError, Result};

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_blank(s),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Check that a component's identity fields are all present
pub fn validate_identity(name: &str, code: &str, description: &str) -> Result<()> {
    for (field, value) in [("code", code), ("name", name), ("description", description)] {
        if is_blank(value) {
            return Err(MediatorError::EmptyIdentity { field });
        }
    }
    Ok(())
}

/// Check that every channel group has a channel, events, and named events
pub fn validate_subscriptions(spec: &SubscriptionSpec) -> Result<()> {
    for (index, group) in spec.subscriptions.iter().enumerate() {
        if is_blank(&group.channel) {
            return Err(MediatorError::EmptyChannel { index });
        }
        if group.events.is_empty() {
            return Err(MediatorError::NoEvents {
                channel: group.channel.clone(),
            });
        }
        if let Some(index) = group.events.iter().position(|e| is_blank(&e.name)) {
            return Err(MediatorError::UnnamedEvent {
                channel: group.channel.clone(),
                index,
            });
        }
    }
    Ok(())
}

/// Check that every publication entry carries all six fields
pub fn validate_publications(spec: &PublicationSpec) -> Result<()> {
    for (index, publication) in spec.publications.iter().enumerate() {
        let text_fields = [
            ("channel", &publication.channel),
            ("event", &publication.event),
            ("description", &publication.description),
            ("condition", &publication.condition),
            ("dataFormat", &publication.data_format),
        ];

        let missing = text_fields
            .iter()
            .find(|(_, value)| is_blank(value))
            .map(|(field, _)| *field)
            .or_else(|| is_blank_value(&publication.example_data).then_some("exampleData"));

        if let Some(field) = missing {
            return Err(MediatorError::IncompletePublication {
                index,
                channel: publication.channel.clone(),
                event: publication.event.clone(),
                field,
            });
        }
    }
    Ok(())
}
