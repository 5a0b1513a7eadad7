//! Out-of-band reporting for records the engine had to degrade or exclude.
//!
//! Nothing reported here is an error for the caller: the affected read still
//! succeeds, minus (or with a fallback for) the offending record.

use std::fmt;
use std::sync::Mutex;

use folio_types::models::ChannelKind;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A record's timestamp could not be parsed; it was left out of a time-bucketed view
    MalformedTimestamp {
        record_id: Uuid,
        raw: String,
        surface: &'static str,
    },
    /// An activity kind outside the known taxonomy; it is shown under `system`
    UnknownKind { record_id: Uuid, raw: String },
    /// A second channel of the same kind was supplied for a client; the later one won
    DuplicateChannel {
        client_id: Uuid,
        kind: ChannelKind,
        replaced: Uuid,
        kept: Uuid,
    },
    /// A fetch result arrived for a selection that is no longer current
    StaleFetchDiscarded { channel_id: Uuid, ticket: u64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTimestamp { record_id, raw, surface } => {
                write!(f, "malformed_timestamp record={} raw={:?} surface={}", record_id, raw, surface)
            }
            Self::UnknownKind { record_id, raw } => {
                write!(f, "unknown_kind record={} raw={:?}", record_id, raw)
            }
            Self::DuplicateChannel { client_id, kind, replaced, kept } => {
                write!(
                    f,
                    "duplicate_channel client={} kind={} replaced={} kept={}",
                    client_id,
                    kind.as_str(),
                    replaced,
                    kept
                )
            }
            Self::StaleFetchDiscarded { channel_id, ticket } => {
                write!(f, "stale_fetch_discarded channel={} ticket={}", channel_id, ticket)
            }
        }
    }
}

/// Receiver for diagnostics. Implementations can forward to `tracing`,
/// collect for the response, or discard.
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Sink that uses the `tracing` crate.
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MalformedTimestamp { .. } | Diagnostic::DuplicateChannel { .. } => {
                tracing::warn!(target: "folio::diagnostics", "{}", diagnostic);
            }
            _ => {
                tracing::debug!(target: "folio::diagnostics", "{}", diagnostic);
            }
        }
    }
}

/// No-op sink that discards everything.
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Keeps every diagnostic so the caller can surface it, and forwards to tracing.
#[derive(Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains everything collected so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *entries)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticsSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        TracingSink.report(diagnostic.clone());
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_drains() {
        let sink = CollectingSink::new();
        let id = Uuid::new_v4();
        sink.report(Diagnostic::UnknownKind {
            record_id: id,
            raw: "fax-received".into(),
        });
        assert_eq!(sink.len(), 1);

        let drained = sink.take();
        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());
        assert!(drained[0].to_string().contains("fax-received"));
    }
}
