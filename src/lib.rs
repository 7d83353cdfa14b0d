//! # mediator-bus
//!
//! An in-process, channel/event publish–subscribe mediator for UI
//! components. Components register a contract (what they subscribe to and
//! what they may publish), the mediator validates and indexes it, and
//! published events are fanned out synchronously to every current
//! subscriber of the `channel:event` pair.
//!
//! ```text
//!  collaborator ──register()──►  Mediator  ──► ComponentRegistry
//!                                   │              ├─ ChannelIndex
//!  collaborator ──publish()───►     │              └─ PublicationCatalog
//!                                   │
//!                                   ├──► ActivityLog (bounded, paginated)
//!                                   │        └─► live feed (broadcast)
//!                                   ▼
//!                         subscriber.on_event(envelope)
//! ```
//!
//! The mediator is single-threaded: it is shared by cloning a [`Mediator`]
//! handle, never across threads. Nothing it does fails across its
//! boundary; invalid input is logged through `tracing` and skipped.

pub mod activity;
pub mod component;
pub mod config;
pub mod envelope;
pub mod error;
pub mod mediator;
pub mod registry;
pub mod snapshot;
pub mod spec;

pub use activity::{ActivityKind, ActivityLogEntry, ActivityPayload, LogPage};
pub use component::{Component, ComponentDescriptor, ComponentSpec};
pub use config::MediatorConfig;
pub use envelope::Envelope;
pub use error::MediatorError;
pub use mediator::{Mediator, COMPONENT_REGISTERED, COMPONENT_UNREGISTERED, SYSTEM_CHANNEL};
pub use registry::EventKey;
pub use snapshot::{ComponentSnapshot, PubSubStatus, RegisteredComponents};
pub use spec::{
    merge_publications, merge_subscriptions, EventSpec, Publication, PublicationSpec,
    SubscriptionSpec,
};
