//! Component contracts
//!
//! A component declares two contracts when it joins the mediator:
//!
//! - a [`SubscriptionSpec`]: the channels and events it wants delivered
//! - a [`PublicationSpec`]: the channel/event pairs it may emit, with the
//!   documentation shown in diagnostic views
//!
//! Contracts are usually assembled from a base spec plus extensions, so the
//! [`merge`] functions combine two specs with first-wins deduplication. The
//! [`validate`] functions check a contract before anything is applied.

pub mod merge;
pub mod types;
pub mod validate;

pub use merge::{merge_publications, merge_subscriptions};
pub use types::{ChannelSubscription, EventSpec, Publication, PublicationSpec, SubscriptionSpec};
pub use validate::{validate_identity, validate_publications, validate_subscriptions};
