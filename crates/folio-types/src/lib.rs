//! Shared data model for folio: the records the event store supplies, the
//! request/response shapes of the HTTP surface, and the typed engine events.

pub mod api;
pub mod events;
pub mod models;
