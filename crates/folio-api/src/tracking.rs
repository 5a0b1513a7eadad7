use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use folio_engine::tracking::{self, TrackingStatus};
use folio_types::api::RecordTrackingRequest;
use folio_types::events::EngineEvent;
use folio_types::models::{ActivityEvent, TrackingState};

use crate::state::{AppState, join_error, update_status};

#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub record_id: Uuid,
    pub tracking: TrackingState,
    pub status: TrackingStatus,
}

/// Records a view, download or open receipt against an activity record.
pub async fn record_tracking(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(req): Json<RecordTrackingRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let RecordTrackingRequest { kind, at } = req;
    let db = state.clone();
    let event = tokio::task::spawn_blocking(move || {
        db.db.modify_activity(record_id, |mut event| -> Result<ActivityEvent, StatusCode> {
            let current = event
                .tracking
                .clone()
                .or_else(|| tracking::initial_for(&event.kind))
                .filter(|t| tracking::accepts(t, kind))
                .ok_or_else(|| {
                    warn!("Record {} ({}) does not take {:?} receipts", record_id, event.kind.as_str(), kind);
                    StatusCode::UNPROCESSABLE_ENTITY
                })?;
            event.tracking = Some(tracking::record(&current, kind, at));
            Ok(event)
        })
    })
    .await
    .map_err(join_error)?
    .map_err(update_status)?
    .ok_or(StatusCode::NOT_FOUND)?;

    let updated = event.tracking.ok_or_else(|| {
        error!("Record {} lost its tracking state on write", record_id);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    debug!("Tracking receipt {:?} recorded on {}", kind, record_id);

    state.dispatcher.broadcast(EngineEvent::TrackingRecorded {
        record_id,
        kind,
        tracking: updated.clone(),
    });

    Ok(Json(TrackingResponse {
        record_id,
        status: tracking::derive_status(Some(&updated), &state.utc_offset),
        tracking: updated,
    }))
}
