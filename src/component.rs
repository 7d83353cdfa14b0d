//! Mediator participants
//!
//! Anything that joins the mediator implements [`Component`]. UI code that
//! does not want a dedicated type can build a [`ComponentDescriptor`] from
//! closures instead.
//!
//! # Example
//! ```
//! use std::rc::Rc;
//! use mediator_bus::{ComponentDescriptor, Mediator};
//!
//! let mediator = Mediator::new();
//! let logger = ComponentDescriptor::builder("Logger", "log1")
//!     .description("Writes system events to the console")
//!     .subscribe("system", "start")
//!     .on_event(|envelope| {
//!         println!("{} from {}", envelope.key(), envelope.component_name);
//!         Ok(())
//!     })
//!     .build();
//!
//! mediator.register(Rc::new(logger));
//! assert!(mediator.is_registered("log1"));
//! ```

use serde::Serialize;

use crate::envelope::Envelope;
use crate::spec::{
    merge_publications, merge_subscriptions, EventSpec, Publication, PublicationSpec,
    SubscriptionSpec,
};

/// A participant in the mediator
///
/// The accessors are read while the mediator holds its internal state, so
/// they must not call back into the mediator. `on_event` runs with no state
/// held and may publish, register or unregister freely.
pub trait Component {
    /// Human-readable label
    fn name(&self) -> &str;

    /// Stable identifier, unique among registered components
    fn code(&self) -> &str;

    fn description(&self) -> &str;

    /// What this component wants delivered
    fn subscription_spec(&self) -> &SubscriptionSpec;

    /// What this component may emit
    fn publication_spec(&self) -> &PublicationSpec;

    /// Handle a delivered event
    ///
    /// Errors are logged by the dispatcher and do not stop delivery to
    /// other subscribers.
    fn on_event(&self, envelope: &Envelope) -> anyhow::Result<()>;

    /// Called by the owner after registration; the mediator never calls it
    fn on_init(&self) {}

    /// Called by the owner before unregistration; the mediator never calls it
    fn on_destroy(&self) {}

    /// Identity plus both contracts, for logging and snapshots
    fn full_spec(&self) -> ComponentSpec {
        ComponentSpec {
            name: self.name().to_string(),
            code: self.code().to_string(),
            description: self.description().to_string(),
            subscription_spec: self.subscription_spec().clone(),
            publication_spec: self.publication_spec().clone(),
        }
    }
}

/// Owned copy of a component's identity and contracts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    pub name: String,
    pub code: String,
    pub description: String,
    pub subscription_spec: SubscriptionSpec,
    pub publication_spec: PublicationSpec,
}

type EventHandler = Box<dyn Fn(&Envelope) -> anyhow::Result<()>>;
type LifecycleHook = Box<dyn Fn()>;

fn ignore_event(_: &Envelope) -> anyhow::Result<()> {
    Ok(())
}

/// A closure-backed [`Component`]
pub struct ComponentDescriptor {
    name: String,
    code: String,
    description: String,
    subscription_spec: SubscriptionSpec,
    publication_spec: PublicationSpec,
    on_event: EventHandler,
    on_init: Option<LifecycleHook>,
    on_destroy: Option<LifecycleHook>,
}

impl ComponentDescriptor {
    /// Start building a descriptor
    pub fn builder(name: impl Into<String>, code: impl Into<String>) -> ComponentDescriptorBuilder {
        ComponentDescriptorBuilder {
            name: name.into(),
            code: code.into(),
            description: String::new(),
            subscription_spec: SubscriptionSpec::default(),
            publication_spec: PublicationSpec::default(),
            on_event: None,
            on_init: None,
            on_destroy: None,
        }
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("subscriptions", &self.subscription_spec.keys())
            .field("publications", &self.publication_spec.keys())
            .finish()
    }
}

impl Component for ComponentDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn subscription_spec(&self) -> &SubscriptionSpec {
        &self.subscription_spec
    }

    fn publication_spec(&self) -> &PublicationSpec {
        &self.publication_spec
    }

    fn on_event(&self, envelope: &Envelope) -> anyhow::Result<()> {
        (self.on_event)(envelope)
    }

    fn on_init(&self) {
        if let Some(hook) = &self.on_init {
            hook();
        }
    }

    fn on_destroy(&self) {
        if let Some(hook) = &self.on_destroy {
            hook();
        }
    }
}

/// Builder for [`ComponentDescriptor`]
///
/// Every contract setter merges into what is already there, first-wins.
pub struct ComponentDescriptorBuilder {
    name: String,
    code: String,
    description: String,
    subscription_spec: SubscriptionSpec,
    publication_spec: PublicationSpec,
    on_event: Option<EventHandler>,
    on_init: Option<LifecycleHook>,
    on_destroy: Option<LifecycleHook>,
}

impl ComponentDescriptorBuilder {
    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Subscribe to a single event
    pub fn subscribe(self, channel: impl Into<String>, event: impl Into<String>) -> Self {
        let extra = SubscriptionSpec::new().event(channel, event);
        self.merge_subscriptions(&extra)
    }

    /// Subscribe to a documented event
    pub fn subscribe_with(self, channel: impl Into<String>, event: EventSpec) -> Self {
        let extra = SubscriptionSpec::new().channel(channel, vec![event]);
        self.merge_subscriptions(&extra)
    }

    /// Declare a publication
    pub fn publish(self, publication: Publication) -> Self {
        let extra = PublicationSpec::new().publication(publication);
        self.merge_publications(&extra)
    }

    /// Merge another subscription spec into this one
    pub fn merge_subscriptions(mut self, extra: &SubscriptionSpec) -> Self {
        self.subscription_spec = merge_subscriptions(Some(&self.subscription_spec), Some(extra));
        self
    }

    /// Merge another publication spec into this one
    pub fn merge_publications(mut self, extra: &PublicationSpec) -> Self {
        self.publication_spec = merge_publications(Some(&self.publication_spec), Some(extra));
        self
    }

    /// Set the event handler
    pub fn on_event<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + 'static,
    {
        self.on_event = Some(Box::new(handler));
        self
    }

    /// Set the init hook
    pub fn on_init<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.on_init = Some(Box::new(hook));
        self
    }

    /// Set the destroy hook
    pub fn on_destroy<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    /// Finish the descriptor; without a handler delivered events are ignored
    pub fn build(self) -> ComponentDescriptor {
        ComponentDescriptor {
            name: self.name,
            code: self.code,
            description: self.description,
            subscription_spec: self.subscription_spec,
            publication_spec: self.publication_spec,
            on_event: self.on_event.unwrap_or_else(|| Box::new(ignore_event)),
            on_init: self.on_init,
            on_destroy: self.on_destroy,
        }
    }
}
