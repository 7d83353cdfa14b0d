//! Diagnostic projections of registry state
//!
//! Every type here is an owned copy taken at call time; nothing holds a
//! reference into the live registry.

use serde::Serialize;

use crate::component::Component;
use crate::registry::{ComponentRegistry, EventKey};

/// Subscribers of one `(channel, event)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionStatus {
    pub channel: String,
    pub event: String,
    /// Subscriber names in delivery order
    pub subscribers: Vec<String>,
}

/// One catalog row, reduced to its routing fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationStatus {
    pub channel: String,
    pub event: String,
    pub contributor: String,
}

/// Current subscriptions and declarations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PubSubStatus {
    pub subscriptions: Vec<SubscriptionStatus>,
    pub publications: Vec<PublicationStatus>,
}

impl PubSubStatus {
    pub(crate) fn capture(registry: &ComponentRegistry) -> Self {
        let subscriptions = registry
            .index()
            .iter()
            .map(|(key, subscribers)| SubscriptionStatus {
                channel: key.channel,
                event: key.event,
                subscribers: subscribers.iter().map(|c| c.name().to_string()).collect(),
            })
            .collect();

        let publications = registry
            .catalog()
            .rows()
            .iter()
            .map(|row| PublicationStatus {
                channel: row.channel.clone(),
                event: row.event.clone(),
                contributor: row.contributor.clone(),
            })
            .collect();

        Self {
            subscriptions,
            publications,
        }
    }
}

/// A registered component with its contracts flattened to keys
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSnapshot {
    pub name: String,
    pub code: String,
    pub description: String,
    pub subscriptions: Vec<EventKey>,
    pub publications: Vec<EventKey>,
}

impl ComponentSnapshot {
    pub(crate) fn of(component: &dyn Component) -> Self {
        Self {
            name: component.name().to_string(),
            code: component.code().to_string(),
            description: component.description().to_string(),
            subscriptions: component.subscription_spec().keys(),
            publications: component.publication_spec().keys(),
        }
    }
}

/// Result of a registered-components query
///
/// Serializes as `{"registeredComponents": [...]}` or `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegisteredComponents {
    Components {
        #[serde(rename = "registeredComponents")]
        registered_components: Vec<ComponentSnapshot>,
    },
    Empty {
        message: String,
    },
}

impl RegisteredComponents {
    pub(crate) fn capture(registry: &ComponentRegistry) -> Self {
        if registry.is_empty() {
            return RegisteredComponents::Empty {
                message: "No components are registered".to_string(),
            };
        }

        RegisteredComponents::Components {
            registered_components: registry
                .components()
                .iter()
                .map(|c| ComponentSnapshot::of(c.as_ref()))
                .collect(),
        }
    }

    /// The snapshots, empty for the message variant
    pub fn components(&self) -> &[ComponentSnapshot] {
        match self {
            RegisteredComponents::Components {
                registered_components,
            } => registered_components,
            RegisteredComponents::Empty { .. } => &[],
        }
    }
}
