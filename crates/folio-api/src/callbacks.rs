use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use folio_engine::callback;
use folio_engine::filter::{self, FilterQuery};
use folio_engine::paging;
use folio_engine::store::EventStore;
use folio_types::api::{CreateCallbackRequest, ReassignCallbackRequest, SetCallbackStatusRequest};
use folio_types::events::EngineEvent;
use folio_types::models::CallbackMessage;

use crate::state::{AppState, db_status, engine_status, join_error, store_status, update_status};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Only callbacks not yet completed.
    #[serde(default)]
    pub active: bool,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

pub async fn list_callbacks(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Query(q): Query<CallbackQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let callbacks = tokio::task::spawn_blocking(move || db.db.list_callbacks(client_id))
        .await
        .map_err(join_error)?
        .map_err(store_status)?;

    let query = FilterQuery {
        status: q.status.clone(),
        priority: q.priority.clone(),
        search_text: q.search.clone(),
        ..FilterQuery::default()
    };
    let mut visible = filter::apply(&callbacks, &query, &state.now());
    if q.active {
        visible.retain(callback::is_active);
    }
    let page = paging::paginate(visible, q.cursor.as_deref(), state.limit(q.limit)).map_err(engine_status)?;

    Ok(Json(page))
}

pub async fn create_callback(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Json(req): Json<CreateCallbackRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let created = callback::create(client_id, req, Utc::now()).map_err(engine_status)?;

    let db = state.clone();
    let stored = created.clone();
    tokio::task::spawn_blocking(move || db.db.upsert_callback(&stored))
        .await
        .map_err(join_error)?
        .map_err(db_status)?;

    info!("Callback {} logged for client {}", created.id, client_id);
    state.dispatcher.broadcast(EngineEvent::CallbackCreated {
        callback_id: created.id,
        client_id,
    });

    Ok((StatusCode::CREATED, Json(created)))
}

/// Updates one callback inside a single store transaction.
async fn update_callback<F>(state: &AppState, callback_id: Uuid, f: F) -> Result<CallbackMessage, StatusCode>
where
    F: FnOnce(&CallbackMessage) -> Result<CallbackMessage, StatusCode> + Send + 'static,
{
    let db = state.clone();
    tokio::task::spawn_blocking(move || db.db.modify_callback(callback_id, |current| f(&current)))
        .await
        .map_err(join_error)?
        .map_err(update_status)?
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(callback_id): Path<Uuid>,
    Json(req): Json<SetCallbackStatusRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let today = state.now().date_naive();
    let updated = update_callback(&state, callback_id, move |current| {
        callback::transition(current, req.status, req.completion_date, today).map_err(engine_status)
    })
    .await?;

    info!("Callback {} moved to {}", updated.id, updated.status.as_str());
    state.dispatcher.broadcast(EngineEvent::CallbackStatusChanged {
        callback_id: updated.id,
        client_id: updated.client_id,
        status: updated.status,
        completion_date: updated.completion_date,
    });

    Ok(Json(updated))
}

pub async fn reassign(
    State(state): State<AppState>,
    Path(callback_id): Path<Uuid>,
    Json(req): Json<ReassignCallbackRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let updated = update_callback(&state, callback_id, move |current| {
        callback::reassign(current, &req.assigned_to).map_err(engine_status)
    })
    .await?;

    state.dispatcher.broadcast(EngineEvent::CallbackReassigned {
        callback_id: updated.id,
        client_id: updated.client_id,
        assigned_to: updated.assigned_to.clone().unwrap_or_default(),
    });

    Ok(Json(updated))
}
