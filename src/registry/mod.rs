//! Component registry for channel/event routing
//!
//! The registry owns every registered component and the two structures built
//! from their contracts: the channel index (who receives what) and the
//! publication catalog (what may be emitted at all).
//!
//! # Architecture
//!
//! ```text
//!                        ComponentRegistry
//!              ┌──────────────────────────────────┐
//!              │ components: [Rc<dyn Component>]  │
//!              │ index:   channel → event → [..]  │
//!              │ catalog: [CatalogEntry]          │
//!              └────────────────┬─────────────────┘
//!                               │
//!      register()               │               publish()
//!   validate contract ──► index + catalog ──► gate on catalog
//!                                                  │
//!                                    ┌─────────────┼─────────────┐
//!                                    ▼             ▼             ▼
//!                                on_event()    on_event()    on_event()
//! ```
//!
//! Keys are typed [`EventKey`] pairs rather than joined strings.

pub mod catalog;
pub mod index;
pub mod key;
pub mod store;

pub use catalog::{CatalogEntry, PublicationCatalog};
pub use index::ChannelIndex;
pub use key::EventKey;
pub use store::{ComponentRegistry, RegisterOutcome};
