use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_engine::filter::{self, FilterQuery};
use folio_engine::organizer::{self, OrganizerField};
use folio_engine::paging;
use folio_engine::sort::{self, SortDirection, SortState};
use folio_engine::store::EventStore;
use folio_types::api::Page;
use folio_types::models::Organizer;

use crate::activity::split_list;
use crate::state::{AppState, engine_status, join_error, store_status};

#[derive(Debug, Deserialize)]
pub struct OrganizerQuery {
    pub search: Option<String>,
    /// Comma-separated organizer types
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub sort: Option<OrganizerField>,
    #[serde(default)]
    pub direction: SortDirection,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OrganizerEntry {
    #[serde(flatten)]
    pub organizer: Organizer,
    pub progress: u8,
}

pub async fn list_organizers(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Query(q): Query<OrganizerQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let organizers = tokio::task::spawn_blocking(move || db.db.list_organizers(client_id))
        .await
        .map_err(join_error)?
        .map_err(store_status)?;

    let query = FilterQuery {
        categories: split_list(q.kind.as_deref()),
        status: q.status.clone(),
        search_text: q.search.clone(),
        ..FilterQuery::default()
    };
    let visible = filter::apply(&organizers, &query, &state.now());
    let ordering = SortState {
        field: q.sort,
        direction: q.direction,
    };
    let ordered = sort::sort_by_state(visible, &ordering);
    let page = paging::paginate(ordered, q.cursor.as_deref(), state.limit(q.limit)).map_err(engine_status)?;

    Ok(Json(Page {
        items: page
            .items
            .into_iter()
            .map(|organizer| OrganizerEntry {
                progress: organizer::progress(&organizer),
                organizer,
            })
            .collect(),
        next_cursor: page.next_cursor,
    }))
}
