//! Filter composition over activity, messages, callbacks and threads.
//!
//! Every supplied predicate is ANDed. A dimension the record kind does not
//! carry (e.g. priority on an activity event) does not constrain it.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use folio_types::api::{BillingPreset, DateRange};
use folio_types::models::{
    ActivityEvent, ActivityKind, CallbackMessage, EmailThread, EventStatus, Message,
};

use crate::diagnostics::{Diagnostic, DiagnosticsSink};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<BillingPreset>,
    /// Record passes if it matches any one of these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl FilterQuery {
    /// Whether any predicate would actually narrow the result.
    pub fn is_active(&self) -> bool {
        !matches!(self.preset, None | Some(BillingPreset::All))
            || !self.categories.is_empty()
            || self.search().is_some()
            || self.date_range != DateRange::All
            || self.status.is_some()
            || self.priority.is_some()
    }

    fn search(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A record the filter engine can evaluate.
pub trait Filterable {
    /// Fields searched case-insensitively; any one containing the text matches.
    fn search_fields(&self) -> Vec<&str>;

    /// `None` when the timestamp is malformed.
    fn timestamp(&self) -> Option<DateTime<Utc>>;

    /// `None` when the record kind has no category dimension.
    fn matches_category(&self, _category: &str) -> Option<bool> {
        None
    }

    fn matches_preset(&self, _preset: BillingPreset) -> Option<bool> {
        None
    }

    fn status_key(&self) -> Option<&str> {
        None
    }

    fn priority_key(&self) -> Option<&str> {
        None
    }
}

/// Keeps the records that pass `query`, in input order.
pub fn apply<T: Filterable + Clone>(
    records: &[T],
    query: &FilterQuery,
    now: &DateTime<FixedOffset>,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| matches(*r, query, now))
        .cloned()
        .collect()
}

pub fn matches<T: Filterable + ?Sized>(
    record: &T,
    query: &FilterQuery,
    now: &DateTime<FixedOffset>,
) -> bool {
    preset_matches(record, query.preset)
        && categories_match(record, &query.categories)
        && query.search().is_none_or(|text| search_matches(record, text))
        && date_range_matches(record.timestamp(), query.date_range, now)
        && exact_matches(record.status_key(), query.status.as_deref())
        && exact_matches(record.priority_key(), query.priority.as_deref())
}

fn preset_matches<T: Filterable + ?Sized>(record: &T, preset: Option<BillingPreset>) -> bool {
    match preset {
        None | Some(BillingPreset::All) => true,
        Some(preset) => record.matches_preset(preset).unwrap_or(true),
    }
}

fn categories_match<T: Filterable + ?Sized>(record: &T, categories: &[String]) -> bool {
    if categories.is_empty() {
        return true;
    }
    let mut carried = false;
    for category in categories {
        match record.matches_category(category) {
            Some(true) => return true,
            Some(false) => carried = true,
            None => {}
        }
    }
    !carried
}

fn exact_matches(value: Option<&str>, wanted: Option<&str>) -> bool {
    match (value, wanted) {
        (_, None) => true,
        (None, Some(_)) => true,
        (Some(value), Some(wanted)) => value == wanted,
    }
}

/// Case-insensitive substring match against any search field.
pub fn search_matches<T: Filterable + ?Sized>(record: &T, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Malformed timestamps only pass an unbounded range.
pub fn date_range_matches(
    timestamp: Option<DateTime<Utc>>,
    range: DateRange,
    now: &DateTime<FixedOffset>,
) -> bool {
    if range == DateRange::All {
        return true;
    }
    let Some(ts) = timestamp else {
        return false;
    };
    match range {
        DateRange::Today => ts.with_timezone(now.offset()).date_naive() == now.date_naive(),
        DateRange::Week => elapsed_days(ts, now) <= 7,
        DateRange::Month => elapsed_days(ts, now) <= 30,
        DateRange::All => true,
    }
}

/// `floor((now - ts) / 1 day)`.
pub fn elapsed_days(ts: DateTime<Utc>, now: &DateTime<FixedOffset>) -> i64 {
    let secs = now.with_timezone(&Utc).signed_duration_since(ts).num_seconds();
    secs.div_euclid(86_400)
}

// -- Activity filter chips --

/// The fixed chip table shown above the activity timeline.
pub const ACTIVITY_CHIPS: [(&str, &str); 8] = [
    ("email", "Email"),
    ("call", "Calls"),
    ("sms", "SMS"),
    ("meeting", "Meetings"),
    ("document", "Documents"),
    ("invoice", "Invoices"),
    ("signature", "Signatures"),
    ("task", "Tasks"),
];

/// Keyword match of a chip against the kind text. Unknown chips match nothing.
pub fn activity_chip_matches(kind: &ActivityKind, chip: &str) -> bool {
    let t = kind.as_str();
    match chip {
        "email" => t.contains("email"),
        "call" => t.contains("phone-call"),
        "sms" => t.contains("sms"),
        "meeting" => t.contains("meeting"),
        "document" => t.contains("document"),
        "invoice" => t.contains("invoice") || t.contains("payment"),
        "signature" => t.contains("signature") || t.contains("signed"),
        "task" => t.contains("task"),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChip {
    pub key: &'static str,
    pub label: &'static str,
    pub count: usize,
}

/// Each chip with the number of events it would select on its own.
pub fn category_counts(events: &[ActivityEvent]) -> Vec<CategoryChip> {
    ACTIVITY_CHIPS
        .iter()
        .map(|&(key, label)| CategoryChip {
            key,
            label,
            count: events
                .iter()
                .filter(|e| activity_chip_matches(&e.kind, key))
                .count(),
        })
        .collect()
}

/// Reports events whose kind fell outside the taxonomy.
pub fn flag_unknown_kinds(events: &[ActivityEvent], sink: &dyn DiagnosticsSink) {
    for event in events {
        if let ActivityKind::Other(raw) = &event.kind {
            sink.report(Diagnostic::UnknownKind {
                record_id: event.id,
                raw: raw.clone(),
            });
        }
    }
}

// -- Empty state --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyState {
    /// Nothing exists for this surface yet
    NoRecords,
    /// Records exist but the current filters hide all of them
    NoMatches,
}

impl EmptyState {
    /// `None` when there is something to show.
    pub fn classify(total: usize, visible: usize) -> Option<Self> {
        match (total, visible) {
            (_, v) if v > 0 => None,
            (0, _) => Some(Self::NoRecords),
            _ => Some(Self::NoMatches),
        }
    }

    pub fn message(&self, noun: &str, query: &FilterQuery) -> String {
        match self {
            Self::NoRecords => format!("No {} yet", noun),
            Self::NoMatches => match query.search() {
                Some(text) => format!(
                    "No {} matching \"{}\". Try adjusting your search or filters.",
                    noun, text
                ),
                None => format!("No {} match the selected filters", noun),
            },
        }
    }
}

// -- Record kinds --

impl Filterable for ActivityEvent {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.actor.name.as_str(), self.action.as_str()];
        fields.extend(self.detail.as_deref());
        fields.extend(self.metadata.as_deref());
        fields.extend(self.client_name.as_deref());
        fields
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.get()
    }

    /// Billing events match their billing category exactly; client activity
    /// matches by keyword.
    fn matches_category(&self, category: &str) -> Option<bool> {
        Some(match self.billing_category {
            Some(billing) => billing.as_str() == category,
            None => activity_chip_matches(&self.kind, category),
        })
    }

    fn matches_preset(&self, preset: BillingPreset) -> Option<bool> {
        use ActivityKind::*;
        let kind = &self.kind;
        Some(match preset {
            BillingPreset::All => true,
            BillingPreset::ActionRequired => {
                matches!(self.status, Some(EventStatus::Failed | EventStatus::Warning))
            }
            BillingPreset::Payments => {
                matches!(kind, PaymentSuccess | PaymentFailed | PaymentAttempt)
            }
            BillingPreset::Communications => matches!(kind, EmailSent),
            BillingPreset::Documents => matches!(kind, InvoiceCreated | SubscriptionCreated),
            BillingPreset::System => {
                matches!(kind, StatusChange | RetryScheduled | PaymentMethodUpdated)
            }
            BillingPreset::NotSeen => self.tracking.as_ref().is_some_and(|t| match kind {
                EmailSent => t.open.is_some() && !t.opened(),
                InvoiceCreated => t.view.is_some() && !t.viewed(),
                _ => false,
            }),
        })
    }

    fn status_key(&self) -> Option<&str> {
        self.status.map(|s| s.as_str())
    }
}

impl Filterable for Message {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.sender.as_str(), self.content.as_str()];
        fields.extend(self.assigned_to.as_deref());
        fields
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.sent_at.get()
    }
}

impl Filterable for CallbackMessage {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.client_name.as_str(),
            self.message.as_str(),
            self.assigned_by.as_str(),
        ];
        fields.extend(self.assigned_to.as_deref());
        fields
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at.get()
    }

    fn status_key(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn priority_key(&self) -> Option<&str> {
        Some(self.priority.as_str())
    }
}

impl Filterable for EmailThread {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.subject.as_str(),
            self.last_sender.as_str(),
            self.preview.as_str(),
        ]
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.get()
    }
}
