use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use folio_engine::filter::{self, FilterQuery};
use folio_engine::format;
use folio_engine::paging;
use folio_engine::store::EventStore;
use folio_engine::urgency;
use folio_types::api::{Page, SetUrgencyRequest};
use folio_types::events::EngineEvent;
use folio_types::models::{ChannelKind, Message};

use crate::state::{AppState, AppStateInner, engine_status, join_error, store_status, update_status};

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub search: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MessageEntry {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_time: Option<String>,
}

/// Messages of one channel kind, oldest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Path((client_id, kind)): Path<(Uuid, ChannelKind)>,
    Query(q): Query<MessageQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let messages = tokio::task::spawn_blocking(move || db.db.list_messages(client_id, kind))
        .await
        .map_err(join_error)?
        .map_err(store_status)?;

    let now = state.now();
    let query = FilterQuery {
        search_text: q.search.clone(),
        ..FilterQuery::default()
    };
    let visible = filter::apply(&messages, &query, &now);
    let page = paging::paginate(visible, q.cursor.as_deref(), state.limit(q.limit)).map_err(engine_status)?;

    let offset = state.utc_offset;
    Ok(Json(Page {
        items: page
            .items
            .into_iter()
            .map(|message| MessageEntry {
                display_time: message.sent_at.get().map(|ts| format::message_time(ts, &offset)),
                message,
            })
            .collect(),
        next_cursor: page.next_cursor,
    }))
}

/// Kind of the channel a message was posted on. The message's channel
/// never changes, so the lookup can sit outside the update.
fn channel_kind_of(state: &AppStateInner, message_id: Uuid) -> Result<ChannelKind, StatusCode> {
    let message = state
        .db
        .get_message(message_id)
        .map_err(store_status)?
        .ok_or(StatusCode::NOT_FOUND)?;
    let channel = state
        .db
        .get_channel(message.channel_id)
        .map_err(store_status)?
        .ok_or_else(|| {
            error!("Message {} references missing channel {}", message.id, message.channel_id);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(channel.kind)
}

/// Applies `f` to the stored message in one transaction.
fn update_message<F>(state: &AppStateInner, message_id: Uuid, f: F) -> Result<Message, StatusCode>
where
    F: FnOnce(ChannelKind, Message) -> Result<Message, StatusCode>,
{
    let kind = channel_kind_of(state, message_id)?;
    state
        .db
        .modify_message(message_id, |message| f(kind, message))
        .map_err(update_status)?
        .ok_or(StatusCode::NOT_FOUND)
}

/// Applies a menu selection. An escalation without an assignee is a
/// cancelled prompt and leaves the message untouched.
pub async fn set_urgency(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Json(req): Json<SetUrgencyRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let (message, changed) = tokio::task::spawn_blocking(move || -> Result<(Message, bool), StatusCode> {
        let mut changed = false;
        let message = update_message(&db, message_id, |kind, message| {
            let next = urgency::set_urgency(kind, &message, req.level, req.assignee.as_deref())
                .map_err(engine_status)?;
            changed = next != message;
            Ok(next)
        })?;
        Ok((message, changed))
    })
    .await
    .map_err(join_error)??;

    if changed {
        info!("Message {} urgency set to {}", message.id, message.urgency.label());
        state.dispatcher.broadcast(EngineEvent::UrgencyChanged {
            message_id: message.id,
            channel_id: message.channel_id,
            urgency: message.urgency,
            assigned_to: message.assigned_to.clone(),
        });
    }

    Ok(Json(message))
}

pub async fn resolve_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let message = tokio::task::spawn_blocking(move || {
        update_message(&db, message_id, |kind, message| {
            urgency::mark_resolved(kind, &message).map_err(engine_status)
        })
    })
    .await
    .map_err(join_error)??;

    state.dispatcher.broadcast(EngineEvent::MessageResolved {
        message_id: message.id,
        channel_id: message.channel_id,
    });

    Ok(Json(message))
}
