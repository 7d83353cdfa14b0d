//! Channel index
//!
//! Maps `channel -> event -> subscribers`. Paths are created on the first
//! subscription and pruned, event first and then channel, when the last
//! subscriber leaves, so an existing path always has at least one member.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::component::Component;

use super::key::EventKey;

type Subscribers = Vec<Rc<dyn Component>>;

/// Live mapping from `(channel, event)` to current subscribers
///
/// Subscribers keep their insertion order, which is the delivery order.
#[derive(Default)]
pub struct ChannelIndex {
    channels: BTreeMap<String, BTreeMap<String, Subscribers>>,
}

impl ChannelIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber for a key
    ///
    /// Returns false if a component with the same code is already present.
    pub fn insert(&mut self, key: &EventKey, component: &Rc<dyn Component>) -> bool {
        let subscribers = self
            .channels
            .entry(key.channel.clone())
            .or_default()
            .entry(key.event.clone())
            .or_default();

        if subscribers.iter().any(|c| c.code() == component.code()) {
            return false;
        }

        subscribers.push(Rc::clone(component));
        true
    }

    /// Remove a component from every key it subscribes to
    ///
    /// Returns the number of keys it was removed from.
    pub fn remove_component(&mut self, code: &str) -> usize {
        let mut removed = 0;

        for events in self.channels.values_mut() {
            for subscribers in events.values_mut() {
                let before = subscribers.len();
                subscribers.retain(|c| c.code() != code);
                removed += before - subscribers.len();
            }
            events.retain(|_, subscribers| !subscribers.is_empty());
        }
        self.channels.retain(|_, events| !events.is_empty());

        removed
    }

    /// Current subscribers for a key, in delivery order
    pub fn subscribers(&self, key: &EventKey) -> Vec<Rc<dyn Component>> {
        self.channels
            .get(&key.channel)
            .and_then(|events| events.get(&key.event))
            .cloned()
            .unwrap_or_default()
    }

    /// Check whether a path exists for the key
    pub fn contains(&self, key: &EventKey) -> bool {
        self.channels
            .get(&key.channel)
            .is_some_and(|events| events.contains_key(&key.event))
    }

    /// Iterate over every key and its subscribers, ordered by key
    pub fn iter(&self) -> impl Iterator<Item = (EventKey, &[Rc<dyn Component>])> + '_ {
        self.channels.iter().flat_map(|(channel, events)| {
            events.iter().map(move |(event, subscribers)| {
                (
                    EventKey::new(channel.as_str(), event.as_str()),
                    subscribers.as_slice(),
                )
            })
        })
    }

    /// Drop every path
    pub fn clear(&mut self) {
        self.channels.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
