//! Bounded activity log
//!
//! A FIFO ring of [`ActivityLogEntry`] records: once `capacity` is reached
//! the oldest entry is evicted for each new one. Every appended entry is
//! also sent on a broadcast feed for live diagnostic views; a missing or
//! lagging receiver never affects the log itself.

use std::collections::VecDeque;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::MediatorConfig;

use super::entry::{ActivityKind, ActivityLogEntry, ActivityPayload};

/// One page of log entries, most recent first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogPage {
    pub logs: Vec<ActivityLogEntry>,
    /// Number of entries matching the query across all pages
    pub total: usize,
}

/// Bounded, append-only record of register/unregister/publish activity
pub struct ActivityLog {
    entries: VecDeque<ActivityLogEntry>,
    capacity: usize,
    next_sequence: u64,
    evicted: u64,
    default_page: usize,
    default_page_size: usize,
    feed: broadcast::Sender<ActivityLogEntry>,
}

impl ActivityLog {
    /// Create a log with default configuration
    pub fn new() -> Self {
        Self::with_config(&MediatorConfig::default())
    }

    /// Create a log sized by `config`
    pub fn with_config(config: &MediatorConfig) -> Self {
        let (feed, _) = broadcast::channel(config.feed_capacity.max(1));

        Self {
            entries: VecDeque::new(),
            capacity: config.log_capacity.max(1),
            next_sequence: 0,
            evicted: 0,
            default_page: config.default_page.max(1),
            default_page_size: config.default_page_size.max(1),
            feed,
        }
    }

    /// Record an occurrence stamped with the current time
    pub fn append(&mut self, payload: ActivityPayload) -> &ActivityLogEntry {
        self.append_at(payload, chrono::Utc::now().timestamp_millis())
    }

    /// Record an occurrence with an explicit timestamp
    pub fn append_at(&mut self, payload: ActivityPayload, timestamp: i64) -> &ActivityLogEntry {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
        }

        let entry = ActivityLogEntry {
            kind: payload.kind(),
            timestamp,
            sequence: self.next_sequence,
            payload,
        };
        self.next_sequence += 1;

        // No receivers is the normal case
        let _ = self.feed.send(entry.clone());

        self.entries.push_back(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Entries whose kind is in `kinds`, newest first, paginated
    ///
    /// `page` is 1-indexed. Non-positive `page` or `page_size` fall back to
    /// the configured defaults.
    pub fn query_by_types(&self, kinds: &[ActivityKind], page: i64, page_size: i64) -> LogPage {
        self.query(|entry| kinds.contains(&entry.kind), page, page_size)
    }

    /// All entries, newest first, paginated
    pub fn query_recent(&self, page: i64, page_size: i64) -> LogPage {
        self.query(|_| true, page, page_size)
    }

    fn query<F>(&self, filter: F, page: i64, page_size: i64) -> LogPage
    where
        F: Fn(&ActivityLogEntry) -> bool,
    {
        let page = self.coerce(page, self.default_page, "page");
        let page_size = self.coerce(page_size, self.default_page_size, "page_size");

        let mut matching: Vec<&ActivityLogEntry> =
            self.entries.iter().filter(|entry| filter(entry)).collect();
        matching.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });

        let total = matching.len();
        let logs = matching
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        LogPage { logs, total }
    }

    fn coerce(&self, value: i64, default: usize, what: &'static str) -> usize {
        match usize::try_from(value) {
            Ok(v) if v > 0 => v,
            _ => {
                tracing::warn!(
                    parameter = what,
                    value = value,
                    default = default,
                    "Invalid pagination parameter, using default"
                );
                default
            }
        }
    }

    /// Receive every entry appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityLogEntry> {
        self.feed.subscribe()
    }

    /// Entries in append order
    pub fn entries(&self) -> impl Iterator<Item = &ActivityLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries dropped to stay within capacity
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
