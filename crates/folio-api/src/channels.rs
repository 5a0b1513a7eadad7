use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use folio_engine::channel::ChannelRegistry;
use folio_engine::diagnostics::TracingSink;
use folio_engine::store::EventStore;
use folio_types::models::Channel;

use crate::state::{AppState, join_error, store_status};

#[derive(Debug, Serialize)]
pub struct ChannelList {
    /// One channel per kind, in kind order.
    pub channels: Vec<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<Uuid>,
    pub total_unread: u32,
}

pub async fn list_channels(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let channels = tokio::task::spawn_blocking(move || db.db.list_channels(client_id))
        .await
        .map_err(join_error)?
        .map_err(store_status)?;

    let registry = ChannelRegistry::from_channels(client_id, channels, &TracingSink);

    Ok(Json(ChannelList {
        default_channel: registry.default_channel().map(|c| c.id),
        total_unread: registry.total_unread(),
        channels: registry.channels().cloned().collect(),
    }))
}
