use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, FixedOffset, Utc};
use tracing::{error, warn};

use folio_db::{Database, UpdateError};
use folio_engine::{EngineError, StoreError};

use crate::dispatcher::Dispatcher;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub dispatcher: Dispatcher,
    /// Firm-local offset; calendar buckets and display times use it.
    pub utc_offset: FixedOffset,
    /// Page size when a request does not ask for one.
    pub page_limit: u32,
}

impl AppStateInner {
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.utc_offset)
    }

    /// Requested page size, falling back to the configured default. Capped at 200.
    pub fn limit(&self, requested: Option<u32>) -> usize {
        requested.unwrap_or(self.page_limit).clamp(1, 200) as usize
    }
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

pub(crate) fn store_status(e: StoreError) -> StatusCode {
    match e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Malformed(_) => {
            error!("Stored record rejected: {}", e);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StoreError::Backend(_) => {
            error!("Store failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// A rejected update already carries its status.
pub(crate) fn update_status(e: UpdateError<StatusCode>) -> StatusCode {
    match e {
        UpdateError::Store(e) => store_status(e),
        UpdateError::Rejected(status) => status,
    }
}

pub(crate) fn db_status(e: anyhow::Error) -> StatusCode {
    error!("Database write failed: {:#}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

pub(crate) fn engine_status(e: EngineError) -> StatusCode {
    warn!("Rejected: {}", e);
    match e {
        EngineError::InvalidTransition { .. }
        | EngineError::TerminalState(_)
        | EngineError::NoPendingEscalation(_) => StatusCode::CONFLICT,
        EngineError::UrgencyUnsupported(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::EmptyField(_) | EngineError::InvalidCursor => StatusCode::BAD_REQUEST,
        EngineError::QuestionNotFound(_) => StatusCode::NOT_FOUND,
    }
}
