use thiserror::Error;
use uuid::Uuid;

/// Rejected state changes. Reads and derivations never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("callback cannot move from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("callback {0} is completed and can no longer change")]
    TerminalState(Uuid),

    #[error("urgency is only supported on internal discussion, not {0}")]
    UrgencyUnsupported(&'static str),

    #[error("no escalation is pending for message {0}")]
    NoPendingEscalation(Uuid),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("question {0} not found")]
    QuestionNotFound(String),

    #[error("invalid pagination cursor")]
    InvalidCursor,
}

/// Failures at the read-contract boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("store backend failure: {0}")]
    Backend(String),
}
