//! Publication catalog
//!
//! One row per accepted publication declaration. Several components may
//! declare the same `(channel, event)`; every row is kept and each is
//! removed with its own contributor.

use serde::Serialize;
use serde_json::Value;

use crate::spec::Publication;

use super::key::EventKey;

/// A declared publication and who declared it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub channel: String,
    pub event: String,
    pub description: String,
    pub condition: String,
    pub data_format: String,
    pub example_data: Value,
    /// Code of the declaring component
    pub contributor: String,
}

impl CatalogEntry {
    /// Build a row from a declaration
    pub fn new(publication: &Publication, contributor: impl Into<String>) -> Self {
        Self {
            channel: publication.channel.clone(),
            event: publication.event.clone(),
            description: publication.description.clone(),
            condition: publication.condition.clone(),
            data_format: publication.data_format.clone(),
            example_data: publication.example_data.clone(),
            contributor: contributor.into(),
        }
    }

    pub fn key(&self) -> EventKey {
        EventKey::new(self.channel.as_str(), self.event.as_str())
    }

    fn matches(&self, key: &EventKey) -> bool {
        self.channel == key.channel && self.event == key.event
    }
}

/// Every `(channel, event)` some component may emit
#[derive(Debug, Default)]
pub struct PublicationCatalog {
    rows: Vec<CatalogEntry>,
}

impl PublicationCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration
    pub fn declare(&mut self, publication: &Publication, contributor: &str) {
        self.rows.push(CatalogEntry::new(publication, contributor));
    }

    /// Remove every row declared by `contributor`
    ///
    /// Returns the number of rows removed.
    pub fn remove_contributor(&mut self, contributor: &str) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.contributor != contributor);
        before - self.rows.len()
    }

    /// Check whether any component has declared the key
    pub fn is_declared(&self, key: &EventKey) -> bool {
        self.rows.iter().any(|row| row.matches(key))
    }

    /// All rows in declaration order
    pub fn rows(&self) -> &[CatalogEntry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn start() -> Publication {
        Publication::new("system", "start")
            .description("clock started")
            .condition("on boot")
            .data_format("{timestamp}")
            .example(json!({ "timestamp": 0 }))
    }

    #[test]
    fn test_rows_kept_per_contributor() {
        let mut catalog = PublicationCatalog::new();
        catalog.declare(&start(), "clk1");
        catalog.declare(&start(), "clk2");

        let key = EventKey::new("system", "start");
        assert!(catalog.is_declared(&key));
        assert_eq!(catalog.len(), 2);

        assert_eq!(catalog.remove_contributor("clk1"), 1);
        assert!(catalog.is_declared(&key));

        assert_eq!(catalog.remove_contributor("clk2"), 1);
        assert!(!catalog.is_declared(&key));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_undeclared_key() {
        let mut catalog = PublicationCatalog::new();
        catalog.declare(&start(), "clk1");

        assert!(!catalog.is_declared(&EventKey::new("room", "knock")));
        assert!(!catalog.is_declared(&EventKey::new("system", "stop")));
    }

    #[test]
    fn test_entry_carries_documentation() {
        let entry = CatalogEntry::new(&start(), "clk1");

        assert_eq!(entry.key(), EventKey::new("system", "start"));
        assert_eq!(entry.condition, "on boot");
        assert_eq!(entry.contributor, "clk1");
    }
}
