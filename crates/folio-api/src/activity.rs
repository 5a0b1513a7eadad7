use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_engine::diagnostics::TracingSink;
use folio_engine::filter::{self, EmptyState, FilterQuery};
use folio_engine::format;
use folio_engine::paging;
use folio_engine::store::EventStore;
use folio_engine::timeline::{self, Timeline, TimelineGroup, Timestamped};
use folio_engine::tracking::{self, TrackingStatus};
use folio_types::api::DateRange;
use folio_types::models::ActivityEvent;

use crate::state::{AppState, engine_status, join_error, store_status};

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub search: Option<String>,
    /// Comma-separated chip keys, e.g. `email,call`
    pub categories: Option<String>,
    #[serde(default)]
    pub date_range: DateRange,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

impl ActivityQuery {
    fn filter(&self) -> FilterQuery {
        FilterQuery {
            categories: split_list(self.categories.as_deref()),
            search_text: self.search.clone(),
            date_range: self.date_range,
            ..FilterQuery::default()
        }
    }
}

pub(crate) fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct EmptyView {
    pub kind: EmptyState,
    pub message: String,
}

impl EmptyView {
    pub(crate) fn classify(noun: &str, total: usize, matched: usize, query: &FilterQuery) -> Option<Self> {
        EmptyState::classify(total, matched).map(|kind| Self {
            message: kind.message(noun, query),
            kind,
        })
    }
}

/// One page of a day-grouped surface.
#[derive(Debug, Serialize)]
pub struct TimelinePage<T> {
    pub groups: Vec<TimelineGroup<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Records on this page that could not be placed on the timeline.
    pub excluded: Vec<Uuid>,
    pub total: usize,
    pub matched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyView>,
}

#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub event: ActivityEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_time: Option<String>,
    pub tracking_status: TrackingStatus,
}

impl ActivityEntry {
    fn new(event: ActivityEvent, now: &DateTime<FixedOffset>) -> Self {
        Self {
            relative_time: event.timestamp.get().map(|ts| format::relative_time(ts, now)),
            tracking_status: tracking::derive_status(event.tracking.as_ref(), now.offset()),
            event,
        }
    }
}

/// Orders records newest first; unparseable timestamps sink to the end.
pub(crate) fn newest_first<T: Timestamped>(mut records: Vec<T>) -> Vec<T> {
    records.sort_by(|a, b| b.event_time().get().cmp(&a.event_time().get()));
    records
}

pub(crate) fn map_groups<T, U>(timeline: Timeline<T>, f: impl Fn(T) -> U) -> (Vec<TimelineGroup<U>>, Vec<Uuid>) {
    let groups = timeline
        .groups
        .into_iter()
        .map(|g| TimelineGroup {
            key: g.key,
            label: g.label,
            records: g.records.into_iter().map(&f).collect(),
        })
        .collect();
    (groups, timeline.excluded)
}

pub async fn get_activity(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Query(q): Query<ActivityQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let events = tokio::task::spawn_blocking(move || db.db.list_activity(client_id))
        .await
        .map_err(join_error)?
        .map_err(store_status)?;

    let now = state.now();
    let query = q.filter();
    filter::flag_unknown_kinds(&events, &TracingSink);

    let total = events.len();
    let visible = newest_first(filter::apply(&events, &query, &now));
    let matched = visible.len();
    let page = paging::paginate(visible, q.cursor.as_deref(), state.limit(q.limit)).map_err(engine_status)?;

    let grouped = timeline::group(page.items, &now, &TracingSink);
    let (groups, excluded) = map_groups(grouped, |e| ActivityEntry::new(e, &now));

    Ok(Json(TimelinePage {
        groups,
        next_cursor: page.next_cursor,
        excluded,
        total,
        matched,
        empty_state: EmptyView::classify("activities", total, matched, &query),
    }))
}

pub async fn get_categories(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let events = tokio::task::spawn_blocking(move || db.db.list_activity(client_id))
        .await
        .map_err(join_error)?
        .map_err(store_status)?;

    Ok(Json(filter::category_counts(&events)))
}
