//! Component registry implementation
//!
//! Holds the registered components together with the channel index and the
//! publication catalog built from their contracts.

use std::rc::Rc;

use crate::component::Component;
use crate::error::Result;
use crate::spec::{validate_identity, validate_publications, validate_subscriptions};

use super::catalog::PublicationCatalog;
use super::index::ChannelIndex;

/// What a successful `register` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The component was validated and indexed
    Registered,
    /// A component with the same code was already present; nothing changed
    AlreadyRegistered,
}

/// Registered components, their subscriptions and their declarations
///
/// Codes are unique. Catalog rows and index memberships live exactly as long
/// as the component that contributed them.
#[derive(Default)]
pub struct ComponentRegistry {
    /// Components in registration order
    components: Vec<Rc<dyn Component>>,

    /// `(channel, event)` to subscribers
    index: ChannelIndex,

    /// Declared publications
    catalog: PublicationCatalog,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component
    ///
    /// The whole contract is validated before anything is applied, so a
    /// rejected component leaves the registry untouched.
    pub fn register(&mut self, component: Rc<dyn Component>) -> Result<RegisterOutcome> {
        validate_identity(component.name(), component.code(), component.description())?;

        if self.contains(component.code()) {
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        let subscriptions = component.subscription_spec();
        let publications = component.publication_spec();
        validate_subscriptions(subscriptions)?;
        validate_publications(publications)?;

        // A key repeated within one contract counts once
        let declarations = publications.declarations();
        let keys = subscriptions.keys();

        for publication in &declarations {
            self.catalog.declare(publication, component.code());
        }
        for key in &keys {
            self.index.insert(key, &component);
        }

        tracing::debug!(
            code = %component.code(),
            subscriptions = keys.len(),
            publications = declarations.len(),
            "Component indexed"
        );

        self.components.push(component);
        Ok(RegisterOutcome::Registered)
    }

    /// Remove a component and everything it contributed
    ///
    /// Returns the removed component, or `None` if the code is unknown.
    pub fn unregister(&mut self, code: &str) -> Option<Rc<dyn Component>> {
        let pos = self.components.iter().position(|c| c.code() == code)?;
        let component = self.components.remove(pos);

        let memberships = self.index.remove_component(code);
        let rows = self.catalog.remove_contributor(code);

        tracing::debug!(
            code = %code,
            memberships = memberships,
            catalog_rows = rows,
            "Component removed from index"
        );

        Some(component)
    }

    /// Check whether a code is registered
    pub fn contains(&self, code: &str) -> bool {
        self.components.iter().any(|c| c.code() == code)
    }

    /// Registered components in registration order
    pub fn components(&self) -> &[Rc<dyn Component>] {
        &self.components
    }

    pub fn index(&self) -> &ChannelIndex {
        &self.index
    }

    pub fn catalog(&self) -> &PublicationCatalog {
        &self.catalog
    }

    /// Mutable catalog access, for rows not owned by a component
    pub(crate) fn catalog_mut(&mut self) -> &mut PublicationCatalog {
        &mut self.catalog
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Remove every component, subscription and declaration
    ///
    /// Returns the removed components so the caller decides where they drop.
    pub fn clear(&mut self) -> Vec<Rc<dyn Component>> {
        self.index.clear();
        self.catalog.clear();
        std::mem::take(&mut self.components)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::component::ComponentDescriptor;
    use crate::envelope::Envelope;
    use crate::error::MediatorError;
    use crate::registry::EventKey;
    use crate::spec::{EventSpec, Publication, PublicationSpec, SubscriptionSpec};

    fn clock(code: &str) -> Rc<dyn Component> {
        Rc::new(
            ComponentDescriptor::builder("Clock", code)
                .description("emits ticks")
                .subscribe("system", "stop")
                .publish(
                    Publication::new("system", "start")
                        .description("clock started")
                        .condition("on boot")
                        .data_format("{timestamp}")
                        .example(json!({ "timestamp": "2024-01-01T00:00:00Z" })),
                )
                .build(),
        )
    }

    #[test]
    fn test_register_indexes_contract() {
        let mut registry = ComponentRegistry::new();

        let outcome = registry.register(clock("clk1")).unwrap();
        assert_eq!(outcome, RegisterOutcome::Registered);

        assert!(registry.contains("clk1"));
        assert!(registry.catalog().is_declared(&EventKey::new("system", "start")));
        assert_eq!(registry.index().subscribers(&EventKey::new("system", "stop")).len(), 1);
    }

    #[test]
    fn test_register_same_code_twice() {
        let mut registry = ComponentRegistry::new();

        registry.register(clock("clk1")).unwrap();
        let outcome = registry.register(clock("clk1")).unwrap();

        assert_eq!(outcome, RegisterOutcome::AlreadyRegistered);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.catalog().len(), 1);
    }

    #[test]
    fn test_register_rejects_empty_identity() {
        let mut registry = ComponentRegistry::new();
        let nameless: Rc<dyn Component> = Rc::new(
            ComponentDescriptor::builder("Nameless", "n1")
                .subscribe("chat", "message")
                .build(),
        );

        let result = registry.register(nameless);
        assert_eq!(
            result,
            Err(MediatorError::EmptyIdentity {
                field: "description"
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejected_contract_leaves_no_trace() {
        let mut registry = ComponentRegistry::new();
        let extra = PublicationSpec::new().publication(Publication::new("system", "stop"));
        let broken: Rc<dyn Component> = Rc::new(
            ComponentDescriptor::builder("Broken", "b1")
                .description("second publication is incomplete")
                .subscribe("chat", "message")
                .publish(
                    Publication::new("system", "start")
                        .description("d")
                        .condition("c")
                        .data_format("f")
                        .example(json!(1)),
                )
                .merge_publications(&extra)
                .build(),
        );

        assert!(registry.register(broken).is_err());
        assert!(registry.catalog().is_empty());
        assert!(registry.index().is_empty());
        assert!(!registry.contains("b1"));
    }

    /// Hand-written contract that repeats its keys
    struct Repetitive {
        subscriptions: SubscriptionSpec,
        publications: PublicationSpec,
    }

    impl Repetitive {
        fn new() -> Self {
            let x = Publication::new("ui", "x")
                .description("d")
                .condition("c")
                .data_format("f")
                .example(json!(1));

            Self {
                subscriptions: SubscriptionSpec::new()
                    .channel("chat", vec![EventSpec::named("m"), EventSpec::named("m")]),
                publications: PublicationSpec::new().publication(x.clone()).publication(x),
            }
        }
    }

    impl Component for Repetitive {
        fn name(&self) -> &str {
            "Repetitive"
        }

        fn code(&self) -> &str {
            "rep1"
        }

        fn description(&self) -> &str {
            "lists the same keys twice"
        }

        fn subscription_spec(&self) -> &SubscriptionSpec {
            &self.subscriptions
        }

        fn publication_spec(&self) -> &PublicationSpec {
            &self.publications
        }

        fn on_event(&self, _envelope: &Envelope) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_repeated_keys_in_one_contract_apply_once() {
        let mut registry = ComponentRegistry::new();

        registry.register(Rc::new(Repetitive::new())).unwrap();

        assert_eq!(registry.catalog().len(), 1);
        assert_eq!(registry.index().subscribers(&EventKey::new("chat", "m")).len(), 1);

        registry.unregister("rep1");
        assert!(registry.catalog().is_empty());
        assert!(registry.index().is_empty());
    }

    #[test]
    fn test_unregister_removes_contributions() {
        let mut registry = ComponentRegistry::new();
        registry.register(clock("clk1")).unwrap();
        registry.register(clock("clk2")).unwrap();

        let removed = registry.unregister("clk1").unwrap();
        assert_eq!(removed.code(), "clk1");

        assert_eq!(registry.catalog().len(), 1);
        assert_eq!(registry.catalog().rows()[0].contributor, "clk2");
        assert_eq!(registry.index().subscribers(&EventKey::new("system", "stop")).len(), 1);

        assert!(registry.unregister("clk1").is_none());
    }

    #[test]
    fn test_clear() {
        let mut registry = ComponentRegistry::new();
        registry.register(clock("clk1")).unwrap();

        let removed = registry.clear();

        assert_eq!(removed.len(), 1);
        assert!(registry.is_empty());
        assert!(registry.catalog().is_empty());
        assert!(registry.index().is_empty());
    }
}
