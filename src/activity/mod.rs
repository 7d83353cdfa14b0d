//! Activity log
//!
//! Auditable record of registration and traffic:
//! - `entry`: entry, kind and payload types
//! - `log`: the bounded log with filtered, paginated queries and a live feed

pub mod entry;
pub mod log;

pub use entry::{ActivityKind, ActivityLogEntry, ActivityPayload, SubscriptionRecord};
pub use log::{ActivityLog, LogPage};
