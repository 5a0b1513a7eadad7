//! Relative date buckets for the activity timeline and the billing log.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use folio_types::models::{ActivityEvent, CallbackMessage, Email, EmailThread, EventTime, Message};

use crate::diagnostics::{Diagnostic, DiagnosticsSink};

/// A record that can be placed on a timeline.
pub trait Timestamped {
    fn record_id(&self) -> Uuid;
    fn event_time(&self) -> &EventTime;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineGroup<T> {
    pub key: String,
    pub label: String,
    pub records: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline<T> {
    pub groups: Vec<TimelineGroup<T>>,
    /// Records left out because their timestamp could not be parsed.
    pub excluded: Vec<Uuid>,
}

impl<T> Timeline<T> {
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }
}

/// Groups records by calendar day relative to `relative_to`.
///
/// Buckets are ordered most recent first, as are records inside a bucket.
/// Future-dated records are shown under "Today".
pub fn group<T: Timestamped>(
    records: Vec<T>,
    relative_to: &DateTime<FixedOffset>,
    sink: &dyn DiagnosticsSink,
) -> Timeline<T> {
    let today = relative_to.date_naive();
    let (placed, excluded) = place(records, relative_to, sink, "activity-timeline");

    let mut by_day: BTreeMap<NaiveDate, Vec<(DateTime<Utc>, T)>> = BTreeMap::new();
    for (ts, day, record) in placed {
        by_day.entry(day.min(today)).or_default().push((ts, record));
    }

    let groups = by_day
        .into_iter()
        .rev()
        .map(|(day, records)| {
            let (key, label) = day_label(day, today);
            TimelineGroup {
                key,
                label,
                records: newest_first(records),
            }
        })
        .collect();

    Timeline { groups, excluded }
}

/// `(key, label)` for a calendar day. Past yesterday the label doubles as
/// the key.
pub fn day_label(day: NaiveDate, today: NaiveDate) -> (String, String) {
    let diff = (today - day).num_days();
    let label = match diff {
        d if d <= 0 => return ("today".into(), "Today".into()),
        1 => return ("yesterday".into(), "Yesterday".into()),
        d if d < 7 => day.format("%A, %b %-d").to_string(),
        _ => day.format("%B %-d, %Y").to_string(),
    };
    (label.clone(), label)
}

/// Fixed billing log buckets, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingBucket {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    Older,
}

impl BillingBucket {
    pub const ORDER: [BillingBucket; 5] = [
        Self::Today,
        Self::Yesterday,
        Self::ThisWeek,
        Self::ThisMonth,
        Self::Older,
    ];

    pub fn for_day(day: NaiveDate, today: NaiveDate) -> Self {
        match (today - day).num_days() {
            d if d <= 0 => Self::Today,
            1 => Self::Yesterday,
            d if d < 7 => Self::ThisWeek,
            d if d < 30 => Self::ThisMonth,
            _ => Self::Older,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "this-week",
            Self::ThisMonth => "this-month",
            Self::Older => "older",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::ThisMonth => "This Month",
            Self::Older => "Older",
        }
    }
}

/// Groups billing events into the fixed buckets. Empty buckets are omitted.
pub fn group_billing<T: Timestamped>(
    records: Vec<T>,
    relative_to: &DateTime<FixedOffset>,
    sink: &dyn DiagnosticsSink,
) -> Timeline<T> {
    let today = relative_to.date_naive();
    let (placed, excluded) = place(records, relative_to, sink, "billing-log");

    let mut by_bucket: BTreeMap<BillingBucket, Vec<(DateTime<Utc>, T)>> = BTreeMap::new();
    for (ts, day, record) in placed {
        by_bucket
            .entry(BillingBucket::for_day(day, today))
            .or_default()
            .push((ts, record));
    }

    let groups = BillingBucket::ORDER
        .iter()
        .filter_map(|bucket| {
            by_bucket.remove(bucket).map(|records| TimelineGroup {
                key: bucket.key().to_string(),
                label: bucket.label().to_string(),
                records: newest_first(records),
            })
        })
        .collect();

    Timeline { groups, excluded }
}

type Placed<T> = Vec<(DateTime<Utc>, NaiveDate, T)>;

fn place<T: Timestamped>(
    records: Vec<T>,
    relative_to: &DateTime<FixedOffset>,
    sink: &dyn DiagnosticsSink,
    surface: &'static str,
) -> (Placed<T>, Vec<Uuid>) {
    let mut placed = Vec::with_capacity(records.len());
    let mut excluded = Vec::new();
    for record in records {
        match record.event_time() {
            EventTime::Parsed(ts) => {
                let day = ts.with_timezone(relative_to.offset()).date_naive();
                placed.push((*ts, day, record));
            }
            EventTime::Malformed(raw) => {
                sink.report(Diagnostic::MalformedTimestamp {
                    record_id: record.record_id(),
                    raw: raw.clone(),
                    surface,
                });
                excluded.push(record.record_id());
            }
        }
    }
    (placed, excluded)
}

fn newest_first<T>(mut records: Vec<(DateTime<Utc>, T)>) -> Vec<T> {
    records.sort_by(|a, b| b.0.cmp(&a.0));
    records.into_iter().map(|(_, r)| r).collect()
}

impl Timestamped for ActivityEvent {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn event_time(&self) -> &EventTime {
        &self.timestamp
    }
}

impl Timestamped for Message {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn event_time(&self) -> &EventTime {
        &self.sent_at
    }
}

impl Timestamped for CallbackMessage {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn event_time(&self) -> &EventTime {
        &self.created_at
    }
}

impl Timestamped for Email {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn event_time(&self) -> &EventTime {
        &self.sent_at
    }
}

impl Timestamped for EmailThread {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn event_time(&self) -> &EventTime {
        &self.timestamp
    }
}
