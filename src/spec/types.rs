//! Subscription and publication spec types

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::EventKey;

/// A single event a component wants to receive
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSpec {
    /// Event name, unique within its channel group
    pub name: String,
    /// What the subscriber does with the event
    pub description: String,
    /// Expected shape of the payload
    pub data_format: String,
}

impl EventSpec {
    /// Create a new event spec
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        data_format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            data_format: data_format.into(),
        }
    }

    /// Create an event spec carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// All the events a component wants from one channel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelSubscription {
    /// Channel name
    pub channel: String,
    /// Events of interest on this channel
    pub events: Vec<EventSpec>,
}

impl ChannelSubscription {
    /// Create a new channel group
    pub fn new(channel: impl Into<String>, events: Vec<EventSpec>) -> Self {
        Self {
            channel: channel.into(),
            events,
        }
    }
}

/// What a component wants to receive, grouped by channel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    pub subscriptions: Vec<ChannelSubscription>,
}

impl SubscriptionSpec {
    /// Create an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel group
    pub fn channel(mut self, channel: impl Into<String>, events: Vec<EventSpec>) -> Self {
        self.subscriptions.push(ChannelSubscription::new(channel, events));
        self
    }

    /// Add a single named event, joining an existing group for the channel
    pub fn event(mut self, channel: impl Into<String>, event: impl Into<String>) -> Self {
        let channel = channel.into();
        let event = EventSpec::named(event);

        match self
            .subscriptions
            .iter_mut()
            .find(|group| group.channel == channel)
        {
            Some(group) => group.events.push(event),
            None => self
                .subscriptions
                .push(ChannelSubscription::new(channel, vec![event])),
        }
        self
    }

    /// Check whether the spec declares no channel groups
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Flatten into `(channel, event)` keys, in declaration order
    ///
    /// A key listed more than once is yielded at its first occurrence only.
    pub fn keys(&self) -> Vec<EventKey> {
        let mut seen = HashSet::new();
        self.subscriptions
            .iter()
            .flat_map(|group| {
                group
                    .events
                    .iter()
                    .map(move |event| EventKey::new(group.channel.as_str(), event.name.as_str()))
            })
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}

/// A declaration that a component may emit `channel:event`
///
/// All six documentation fields are required for the declaration to be
/// accepted into the catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub channel: String,
    pub event: String,
    /// What the event means
    pub description: String,
    /// When the event is emitted
    pub condition: String,
    /// Shape of the payload
    pub data_format: String,
    /// A representative payload
    pub example_data: Value,
}

impl Publication {
    /// Create a publication with the channel and event set
    pub fn new(channel: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            event: event.into(),
            ..Default::default()
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the emit condition
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Set the payload format
    pub fn data_format(mut self, data_format: impl Into<String>) -> Self {
        self.data_format = data_format.into();
        self
    }

    /// Set the example payload
    pub fn example(mut self, example_data: Value) -> Self {
        self.example_data = example_data;
        self
    }

    /// Key of this declaration
    pub fn key(&self) -> EventKey {
        EventKey::new(self.channel.as_str(), self.event.as_str())
    }
}

/// What a component may emit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublicationSpec {
    pub publications: Vec<Publication>,
}

impl PublicationSpec {
    /// Create an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration
    pub fn publication(mut self, publication: Publication) -> Self {
        self.publications.push(publication);
        self
    }

    /// Check whether the spec declares nothing
    pub fn is_empty(&self) -> bool {
        self.publications.is_empty()
    }

    /// Declarations with repeated keys collapsed to their first occurrence
    pub fn declarations(&self) -> Vec<&Publication> {
        let mut seen = HashSet::new();
        self.publications
            .iter()
            .filter(|publication| seen.insert(publication.key()))
            .collect()
    }

    /// Flatten into `(channel, event)` keys, in declaration order
    pub fn keys(&self) -> Vec<EventKey> {
        self.declarations().into_iter().map(Publication::key).collect()
    }
}
