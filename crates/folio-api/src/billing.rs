use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use folio_engine::StoreError;
use folio_engine::diagnostics::TracingSink;
use folio_engine::filter::{self, FilterQuery};
use folio_engine::format;
use folio_engine::paging;
use folio_engine::stats::{self, BillingStats};
use folio_engine::store::{BillingEventFilter, EventStore};
use folio_engine::timeline;
use folio_engine::tracking::{self, TrackingStatus};
use folio_types::api::{BillingPreset, DateRange};
use folio_types::models::{ActivityEvent, BillingCategory};

use crate::activity::{EmptyView, TimelinePage, map_groups, newest_first};
use crate::state::{AppState, engine_status, join_error, store_status};

#[derive(Debug, Deserialize)]
pub struct BillingQuery {
    pub preset: Option<BillingPreset>,
    pub category: Option<BillingCategory>,
    #[serde(default)]
    pub date_range: DateRange,
    pub search: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BillingEntry {
    #[serde(flatten)]
    pub event: ActivityEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_time: Option<String>,
    pub tracking_status: TrackingStatus,
}

impl BillingEntry {
    fn new(event: ActivityEvent, now: &DateTime<FixedOffset>) -> Self {
        Self {
            display_time: event
                .timestamp
                .get()
                .map(|ts| format::billing_timeline_timestamp(ts, now)),
            tracking_status: tracking::derive_status(event.tracking.as_ref(), now.offset()),
            event,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BillingLog {
    #[serde(flatten)]
    pub page: TimelinePage<BillingEntry>,
    /// Computed over the whole log, not just the filtered view.
    pub stats: BillingStats,
}

/// Firm-wide billing log in fixed buckets with the summary tiles.
pub async fn get_billing_activity(
    State(state): State<AppState>,
    Query(q): Query<BillingQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let now = state.now();
    let scope = BillingEventFilter {
        category: q.category,
        date_range: q.date_range,
        relative_to: Some(now),
    };
    let (everything, scoped) = tokio::task::spawn_blocking(move || -> Result<_, StoreError> {
        let everything = db.db.list_billing_events(&BillingEventFilter::default())?;
        let scoped = db.db.list_billing_events(&scope)?;
        Ok((everything, scoped))
    })
    .await
    .map_err(join_error)?
    .map_err(store_status)?;

    let summary = stats::billing_stats(&everything, &now);

    let query = FilterQuery {
        preset: q.preset,
        search_text: q.search.clone(),
        date_range: q.date_range,
        ..FilterQuery::default()
    };
    let total = everything.len();
    let visible = newest_first(filter::apply(&scoped, &query, &now));
    let matched = visible.len();
    let page = paging::paginate(visible, q.cursor.as_deref(), state.limit(q.limit)).map_err(engine_status)?;

    let grouped = timeline::group_billing(page.items, &now, &TracingSink);
    let (groups, excluded) = map_groups(grouped, |e| BillingEntry::new(e, &now));

    Ok(Json(BillingLog {
        page: TimelinePage {
            groups,
            next_cursor: page.next_cursor,
            excluded,
            total,
            matched,
            empty_state: EmptyView::classify("billing events", total, matched, &query),
        },
        stats: summary,
    }))
}
