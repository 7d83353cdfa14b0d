//! Mediator facade
//!
//! [`Mediator`] is the context object UI code shares: a cheap-to-clone
//! handle over the registry, the activity log and the dispatcher. It is
//! single-threaded (`Rc`/`RefCell`) and every operation runs to completion
//! before returning.
//!
//! Subscriber callbacks run with no internal state borrowed, so a callback
//! may publish, register or unregister through its own clone of the
//! mediator. Nested publishes are allowed up to
//! [`MediatorConfig::max_publish_depth`]; deeper ones are dropped with a
//! warning, which turns a cycle of mutually triggering events into a
//! bounded cascade instead of a stack overflow.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::activity::{
    ActivityKind, ActivityLog, ActivityLogEntry, ActivityPayload, LogPage, SubscriptionRecord,
};
use crate::component::{Component, ComponentSpec};
use crate::config::MediatorConfig;
use crate::envelope::Envelope;
use crate::error::MediatorError;
use crate::registry::{ComponentRegistry, EventKey, RegisterOutcome};
use crate::snapshot::{PubSubStatus, RegisteredComponents};
use crate::spec::Publication;

/// Channel carrying the mediator's own notifications
pub const SYSTEM_CHANNEL: &str = "system";

/// Published after a component registers, with its full spec as data
pub const COMPONENT_REGISTERED: &str = "componentRegistered";

/// Published after a component unregisters, with its full spec as data
pub const COMPONENT_UNREGISTERED: &str = "componentUnregistered";

const MEDIATOR_NAME: &str = "Mediator";

struct Shared {
    config: MediatorConfig,
    registry: RefCell<ComponentRegistry>,
    log: RefCell<ActivityLog>,
    /// Current publish nesting
    depth: Cell<usize>,
}

/// Tracks publish nesting; restores the depth even if a subscriber unwinds
struct DepthGuard<'a>(&'a Cell<usize>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// In-process channel/event broker for UI components
///
/// Nothing here fails across the boundary: rejected registrations,
/// refused unregistrations, undeclared publishes and failing subscribers
/// are all logged and skipped.
///
/// # Example
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use mediator_bus::{ComponentDescriptor, Mediator, Publication};
/// use serde_json::json;
///
/// let mediator = Mediator::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
///
/// mediator.register(Rc::new(
///     ComponentDescriptor::builder("Logger", "log1")
///         .description("Records system start")
///         .subscribe("system", "start")
///         .on_event(move |envelope| {
///             sink.borrow_mut().push(envelope.data.clone());
///             Ok(())
///         })
///         .build(),
/// ));
/// mediator.register(Rc::new(
///     ComponentDescriptor::builder("Clock", "clk1")
///         .description("Announces the start time")
///         .publish(
///             Publication::new("system", "start")
///                 .description("Clock started")
///                 .condition("Once at boot")
///                 .data_format("{timestamp: string}")
///                 .example(json!({ "timestamp": "2024-01-01T00:00:00Z" })),
///         )
///         .build(),
/// ));
///
/// mediator.publish("Clock", "clk1", "system", "start", json!({ "timestamp": "now" }), 1000);
/// assert_eq!(seen.borrow().len(), 1);
/// ```
#[derive(Clone)]
pub struct Mediator {
    inner: Rc<Shared>,
}

impl Mediator {
    /// Create a mediator with default configuration
    pub fn new() -> Self {
        Self::with_config(MediatorConfig::default())
    }

    /// Create a mediator with custom configuration
    pub fn with_config(config: MediatorConfig) -> Self {
        let log = ActivityLog::with_config(&config);
        let mediator = Self {
            inner: Rc::new(Shared {
                config,
                registry: RefCell::new(ComponentRegistry::new()),
                log: RefCell::new(log),
                depth: Cell::new(0),
            }),
        };
        mediator.seed_system_catalog();
        mediator
    }

    /// Get the mediator configuration
    pub fn config(&self) -> &MediatorConfig {
        &self.inner.config
    }

    /// Register a component
    ///
    /// Components with an empty identity field, a malformed contract or the
    /// mediator's own code are rejected; a code that is already registered
    /// is ignored. On success
    /// the registration is logged and, unless disabled, announced on
    /// `system:componentRegistered`.
    pub fn register(&self, component: Rc<dyn Component>) {
        if component.code() == self.inner.config.mediator_code() {
            let err = MediatorError::ReservedCode {
                code: component.code().to_string(),
            };
            tracing::error!(name = %component.name(), error = %err, "Component registration rejected");
            return;
        }

        let outcome = self
            .inner
            .registry
            .borrow_mut()
            .register(Rc::clone(&component));

        match outcome {
            Err(err) => {
                tracing::error!(
                    code = %component.code(),
                    name = %component.name(),
                    error = %err,
                    "Component registration rejected"
                );
                return;
            }
            Ok(RegisterOutcome::AlreadyRegistered) => {
                tracing::info!(
                    code = %component.code(),
                    "Component already registered, ignoring"
                );
                return;
            }
            Ok(RegisterOutcome::Registered) => {}
        }

        let spec = component.full_spec();
        {
            let mut log = self.inner.log.borrow_mut();
            log.append(ActivityPayload::Register(spec.clone()));
            for key in spec.subscription_spec.keys() {
                log.append(ActivityPayload::Subscription(SubscriptionRecord {
                    name: spec.name.clone(),
                    code: spec.code.clone(),
                    channel: key.channel,
                    event: key.event,
                }));
            }
        }

        tracing::info!(
            code = %spec.code,
            name = %spec.name,
            subscriptions = spec.subscription_spec.keys().len(),
            publications = spec.publication_spec.keys().len(),
            "Component registered"
        );

        if self.inner.config.announce_lifecycle {
            self.announce(COMPONENT_REGISTERED, &spec);
        }
    }

    /// Unregister a component
    ///
    /// System components (code starting with the configured prefix) are
    /// never removed. Otherwise the component's subscriptions and catalog
    /// rows go with it.
    pub fn unregister(&self, component: &dyn Component) {
        let code = component.code();

        if self.inner.config.is_system_code(code) {
            tracing::info!(code = %code, "System component cannot be unregistered");
            return;
        }

        let removed = self.inner.registry.borrow_mut().unregister(code);
        let Some(removed) = removed else {
            tracing::debug!(code = %code, "Unregister of unknown component ignored");
            return;
        };

        let spec = removed.full_spec();
        self.inner
            .log
            .borrow_mut()
            .append(ActivityPayload::Unregister(spec.clone()));

        tracing::info!(code = %spec.code, name = %spec.name, "Component unregistered");

        if self.inner.config.announce_lifecycle {
            self.announce(COMPONENT_UNREGISTERED, &spec);
        }
    }

    /// Publish an event to every current subscriber of `channel:event`
    ///
    /// The event must have been declared by some registered component (any
    /// contributor will do); undeclared events are dropped without an
    /// activity entry. Delivery is synchronous, in subscription order, and
    /// each subscriber is isolated: an error or panic in one is logged and
    /// the rest still receive the event.
    pub fn publish(
        &self,
        component_name: &str,
        component_code: &str,
        channel: &str,
        event: &str,
        data: Value,
        timestamp: i64,
    ) {
        let key = EventKey::new(channel, event);

        let depth = self.inner.depth.get();
        if depth >= self.inner.config.max_publish_depth {
            tracing::warn!(
                channel = %key,
                sender = %component_code,
                depth = depth,
                "Publish nesting limit reached, dropping event"
            );
            return;
        }

        let subscribers = {
            let registry = self.inner.registry.borrow();
            if !registry.catalog().is_declared(&key) {
                tracing::warn!(
                    channel = %key,
                    sender = %component_code,
                    "Event not declared by any component, dropping"
                );
                return;
            }
            registry.index().subscribers(&key)
        };

        let envelope = Envelope {
            component_name: component_name.to_string(),
            component_code: component_code.to_string(),
            channel: key.channel.clone(),
            event: key.event.clone(),
            data,
            timestamp,
        };

        self.inner
            .log
            .borrow_mut()
            .append(ActivityPayload::Publish(envelope.clone()));

        let _depth = DepthGuard::enter(&self.inner.depth);
        for subscriber in &subscribers {
            deliver(subscriber.as_ref(), &envelope);
        }

        tracing::debug!(
            channel = %key,
            sender = %component_code,
            subscribers = subscribers.len(),
            "Event dispatched"
        );
    }

    /// Log entries of the given kinds, newest first
    pub fn get_logs_by_types(&self, kinds: &[ActivityKind], page: i64, page_size: i64) -> LogPage {
        self.inner.log.borrow().query_by_types(kinds, page, page_size)
    }

    /// All log entries, newest first
    pub fn get_recent_logs(&self, page: i64, page_size: i64) -> LogPage {
        self.inner.log.borrow().query_recent(page, page_size)
    }

    /// Current subscribers per key and every catalog row
    pub fn get_pub_sub_status(&self) -> PubSubStatus {
        PubSubStatus::capture(&self.inner.registry.borrow())
    }

    /// Snapshot of every registered component
    pub fn get_registered_components(&self) -> RegisteredComponents {
        RegisteredComponents::capture(&self.inner.registry.borrow())
    }

    /// Receive activity log entries as they are appended
    pub fn subscribe_activity(&self) -> broadcast::Receiver<ActivityLogEntry> {
        self.inner.log.borrow().subscribe()
    }

    /// Check whether a code is registered
    pub fn is_registered(&self, code: &str) -> bool {
        self.inner.registry.borrow().contains(code)
    }

    /// Number of registered components
    pub fn component_count(&self) -> usize {
        self.inner.registry.borrow().len()
    }

    /// Names of the current subscribers of `channel:event`, in delivery order
    pub fn subscribers_of(&self, channel: &str, event: &str) -> Vec<String> {
        self.inner
            .registry
            .borrow()
            .index()
            .subscribers(&EventKey::new(channel, event))
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Check whether any component has declared `channel:event`
    pub fn is_declared(&self, channel: &str, event: &str) -> bool {
        self.inner
            .registry
            .borrow()
            .catalog()
            .is_declared(&EventKey::new(channel, event))
    }

    /// Drop every component, system ones included
    ///
    /// The activity log is kept. Components are released after the
    /// registry is emptied, and `on_destroy` is left to their owners.
    pub fn teardown(&self) {
        let removed = self.inner.registry.borrow_mut().clear();
        self.seed_system_catalog();

        tracing::info!(components = removed.len(), "Mediator torn down");
        drop(removed);
    }

    /// Declare the lifecycle notifications, when they are enabled
    fn seed_system_catalog(&self) {
        if !self.inner.config.announce_lifecycle {
            return;
        }

        let code = self.inner.config.mediator_code();
        let mut registry = self.inner.registry.borrow_mut();

        for publication in system_publications() {
            registry.catalog_mut().declare(&publication, &code);
        }
    }

    fn announce(&self, event: &str, spec: &ComponentSpec) {
        let data = serde_json::to_value(spec).unwrap_or_else(|err| {
            tracing::warn!(code = %spec.code, error = %err, "Could not encode component spec");
            Value::Null
        });

        self.publish(
            MEDIATOR_NAME,
            &self.inner.config.mediator_code(),
            SYSTEM_CHANNEL,
            event,
            data,
            chrono::Utc::now().timestamp_millis(),
        );
    }
}

impl Default for Mediator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.try_borrow();
        let log = self.inner.log.try_borrow();
        f.debug_struct("Mediator")
            .field("components", &registry.as_ref().map(|r| r.len()).ok())
            .field("catalog_rows", &registry.as_ref().map(|r| r.catalog().len()).ok())
            .field("log_entries", &log.as_ref().map(|l| l.len()).ok())
            .field("log_capacity", &log.as_ref().map(|l| l.capacity()).ok())
            .field("log_evicted", &log.as_ref().map(|l| l.evicted()).ok())
            .field("depth", &self.inner.depth.get())
            .finish()
    }
}

fn system_publications() -> [Publication; 2] {
    let example = json!({
        "name": "Logger",
        "code": "log1",
        "description": "Writes system events to the console",
        "subscriptionSpec": { "subscriptions": [] },
        "publicationSpec": { "publications": [] }
    });

    [
        Publication::new(SYSTEM_CHANNEL, COMPONENT_REGISTERED)
            .description("A component joined the mediator")
            .condition("After every successful registration")
            .data_format("{name, code, description, subscriptionSpec, publicationSpec}")
            .example(example.clone()),
        Publication::new(SYSTEM_CHANNEL, COMPONENT_UNREGISTERED)
            .description("A component left the mediator")
            .condition("After every successful unregistration")
            .data_format("{name, code, description, subscriptionSpec, publicationSpec}")
            .example(example),
    ]
}

fn deliver(subscriber: &dyn Component, envelope: &Envelope) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_event(envelope)));

    let reason = match outcome {
        Ok(Ok(())) => {
            tracing::debug!(subscriber = %subscriber.code(), channel = %envelope.key(), "Delivered");
            return;
        }
        Ok(Err(err)) => format!("{err:#}"),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };

    let err = MediatorError::SubscriberFailed {
        code: subscriber.code().to_string(),
        key: envelope.key(),
        reason,
    };
    tracing::error!(
        subscriber = %subscriber.name(),
        error = %err,
        "Subscriber failed, continuing delivery"
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
