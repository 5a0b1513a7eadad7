use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CallbackPriority, CallbackStatus, Urgency};

// -- Pagination --

/// One page of a read endpoint. `next_cursor` is absent on the last page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

// -- Filter vocabulary --

/// Coarse date window. Day distance is `floor((now - ts) / 1 day)`, except
/// `Today` which means the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    Today,
    Week,
    Month,
    #[default]
    All,
}

/// Named billing log filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingPreset {
    #[default]
    All,
    ActionRequired,
    Payments,
    Communications,
    Documents,
    System,
    NotSeen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingKind {
    View,
    Download,
    Open,
}

// -- Messages --

/// `assignee` absent on an escalation means the assignment prompt was cancelled.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetUrgencyRequest {
    pub level: Urgency,
    #[serde(default)]
    pub assignee: Option<String>,
}

// -- Callbacks --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetCallbackStatusRequest {
    pub status: CallbackStatus,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCallbackRequest {
    pub client_name: String,
    pub scheduled_date: NaiveDate,
    pub assigned_by: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub priority: CallbackPriority,
    pub message: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReassignCallbackRequest {
    pub assigned_to: String,
}

// -- Tracking --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordTrackingRequest {
    pub kind: TrackingKind,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
