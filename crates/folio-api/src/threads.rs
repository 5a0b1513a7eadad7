use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use folio_engine::paging;
use folio_engine::store::EventStore;
use folio_engine::thread;
use folio_types::models::EmailThread;

use crate::activity::newest_first;
use crate::state::{AppState, engine_status, join_error, store_status, update_status};

#[derive(Debug, Deserialize)]
pub struct ThreadQuery {
    pub search: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

/// A client's email threads, most recent activity first.
pub async fn list_threads(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Query(q): Query<ThreadQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let threads = tokio::task::spawn_blocking(move || db.db.list_email_threads(client_id))
        .await
        .map_err(join_error)?
        .map_err(store_status)?;

    let visible: Vec<EmailThread> = match q.search.as_deref() {
        Some(text) => thread::search(&threads, text).into_iter().cloned().collect(),
        None => threads,
    };
    let page = paging::paginate(newest_first(visible), q.cursor.as_deref(), state.limit(q.limit))
        .map_err(engine_status)?;

    Ok(Json(page))
}

/// Emails of one thread in the order they were received.
pub async fn list_emails(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Query(q): Query<PageQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let emails = tokio::task::spawn_blocking(move || db.db.list_emails(thread_id))
        .await
        .map_err(join_error)?
        .map_err(store_status)?;

    let page = paging::paginate(emails, q.cursor.as_deref(), state.limit(q.limit)).map_err(engine_status)?;
    Ok(Json(page))
}

async fn update_thread(
    state: AppState,
    thread_id: Uuid,
    f: fn(EmailThread) -> EmailThread,
) -> Result<EmailThread, StatusCode> {
    tokio::task::spawn_blocking(move || state.db.modify_thread(thread_id, |t| Ok::<_, StatusCode>(f(t))))
        .await
        .map_err(join_error)?
        .map_err(update_status)?
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    Ok(Json(update_thread(state, thread_id, thread::mark_read).await?))
}

pub async fn toggle_star(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    Ok(Json(update_thread(state, thread_id, thread::toggle_star).await?))
}
