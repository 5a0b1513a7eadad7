//! Timeline aggregation, filtering and channel routing for client folders and
//! the billing activity log.
//!
//! Everything here is synchronous and operates on snapshots handed over by an
//! [`store::EventStore`]. State changes are whole-record replacements; callers
//! persist the returned record and publish the returned [`EngineEvent`].
//!
//! [`EngineEvent`]: folio_types::events::EngineEvent

pub mod callback;
pub mod channel;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod format;
pub mod organizer;
pub mod paging;
pub mod session;
pub mod sort;
pub mod stats;
pub mod store;
pub mod thread;
pub mod timeline;
pub mod tracking;
pub mod urgency;

pub use error::{EngineError, StoreError};
