//! Spec merging
//!
//! Both merges are first-wins: when the same key appears in both inputs the
//! entry from `a` is kept and the one from `b` is dropped. An absent or empty
//! input yields the other input unchanged, and two absent inputs yield an
//! empty spec rather than nothing.

use std::collections::HashSet;

use super::types::{ChannelSubscription, PublicationSpec, SubscriptionSpec};

/// Merge two subscription specs, deduplicating events by name per channel
///
/// Channel order follows `a`, then channels only present in `b` in `b`'s
/// order. Repeated groups for the same channel are folded together.
pub fn merge_subscriptions(
    a: Option<&SubscriptionSpec>,
    b: Option<&SubscriptionSpec>,
) -> SubscriptionSpec {
    let a = a.filter(|spec| !spec.is_empty());
    let b = b.filter(|spec| !spec.is_empty());

    match (a, b) {
        (None, None) => SubscriptionSpec::default(),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (Some(a), Some(b)) => {
            let mut merged: Vec<ChannelSubscription> = Vec::new();

            for group in a.subscriptions.iter().chain(b.subscriptions.iter()) {
                let target = match merged.iter().position(|g| g.channel == group.channel) {
                    Some(pos) => &mut merged[pos],
                    None => {
                        merged.push(ChannelSubscription::new(group.channel.clone(), Vec::new()));
                        let last = merged.len() - 1;
                        &mut merged[last]
                    }
                };

                for event in &group.events {
                    if !target.events.iter().any(|e| e.name == event.name) {
                        target.events.push(event.clone());
                    }
                }
            }

            SubscriptionSpec {
                subscriptions: merged,
            }
        }
    }
}

/// Merge two publication specs, deduplicating by `(channel, event)`
pub fn merge_publications(
    a: Option<&PublicationSpec>,
    b: Option<&PublicationSpec>,
) -> PublicationSpec {
    let a = a.filter(|spec| !spec.is_empty());
    let b = b.filter(|spec| !spec.is_empty());

    match (a, b) {
        (None, None) => PublicationSpec {
            publications: Vec::new(),
        },
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (Some(a), Some(b)) => {
            let mut seen = HashSet::new();
            let publications = a
                .publications
                .iter()
                .chain(b.publications.iter())
                .filter(|p| seen.insert((p.channel.clone(), p.event.clone())))
                .cloned()
                .collect();

            PublicationSpec { publications }
        }
    }
}
