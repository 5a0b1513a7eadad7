//! Delivery receipts on invoice and email events.
//!
//! Updates are pure: each takes the current state and returns the next one.
//! The first timestamp of a facet is fixed once set; counts only grow.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use folio_types::api::TrackingKind;
use folio_types::models::{ActivityKind, Facet, TrackingState};

use crate::format;

pub fn record_view(tracking: &TrackingState, at: DateTime<Utc>) -> TrackingState {
    TrackingState {
        view: Some(bump(tracking.view, at)),
        ..tracking.clone()
    }
}

pub fn record_download(tracking: &TrackingState, at: DateTime<Utc>) -> TrackingState {
    TrackingState {
        download: Some(bump(tracking.download, at)),
        ..tracking.clone()
    }
}

pub fn record_open(tracking: &TrackingState, at: DateTime<Utc>) -> TrackingState {
    TrackingState {
        open: Some(bump(tracking.open, at)),
        ..tracking.clone()
    }
}

pub fn record(tracking: &TrackingState, kind: TrackingKind, at: DateTime<Utc>) -> TrackingState {
    match kind {
        TrackingKind::View => record_view(tracking, at),
        TrackingKind::Download => record_download(tracking, at),
        TrackingKind::Open => record_open(tracking, at),
    }
}

/// Whether `tracking` carries the facet a receipt of `kind` would update.
pub fn accepts(tracking: &TrackingState, kind: TrackingKind) -> bool {
    match kind {
        TrackingKind::View => tracking.view.is_some(),
        TrackingKind::Download => tracking.download.is_some(),
        TrackingKind::Open => tracking.open.is_some(),
    }
}

/// Receipts a freshly recorded event of `kind` starts with.
pub fn initial_for(kind: &ActivityKind) -> Option<TrackingState> {
    match kind {
        ActivityKind::EmailSent => Some(TrackingState::for_email()),
        k if k.is_trackable() => Some(TrackingState::for_invoice()),
        _ => None,
    }
}

fn bump(facet: Option<Facet>, at: DateTime<Utc>) -> Facet {
    match facet {
        None | Some(Facet::Pending) => Facet::Seen {
            first_at: at,
            last_at: at,
            count: 1,
        },
        // A late receipt must not move last_at backwards.
        Some(Facet::Seen { first_at, last_at, count }) => Facet::Seen {
            first_at,
            last_at: last_at.max(at),
            count: count.saturating_add(1),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeIcon {
    NotViewed,
    Viewed,
    Downloaded,
    NotOpened,
    Opened,
    Bounced,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingBadge {
    pub label: String,
    pub icon: BadgeIcon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TrackingBadge {
    fn plain(label: &str, icon: BadgeIcon) -> Self {
        Self {
            label: label.to_string(),
            icon,
            timestamp: None,
        }
    }

    fn seen(label: String, icon: BadgeIcon, at: DateTime<Utc>, offset: &FixedOffset) -> Self {
        Self {
            label,
            icon,
            timestamp: Some(format::tracking_timestamp(at, offset)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "badges", rename_all = "kebab-case")]
pub enum TrackingStatus {
    /// The record kind carries no receipts
    NotApplicable,
    Badges(Vec<TrackingBadge>),
}

/// Presentation badges for a record's receipts. Timestamps are absolute.
pub fn derive_status(tracking: Option<&TrackingState>, offset: &FixedOffset) -> TrackingStatus {
    let Some(t) = tracking else {
        return TrackingStatus::NotApplicable;
    };
    if t.bounced {
        return TrackingStatus::Badges(vec![TrackingBadge::plain("BOUNCED", BadgeIcon::Bounced)]);
    }
    if t.failed {
        return TrackingStatus::Badges(vec![TrackingBadge::plain("FAILED", BadgeIcon::Failed)]);
    }

    let mut badges = Vec::new();
    match t.open {
        Some(Facet::Seen { first_at, count, .. }) => {
            badges.push(TrackingBadge::seen(
                with_count("Opened", count),
                BadgeIcon::Opened,
                first_at,
                offset,
            ));
        }
        Some(Facet::Pending) => badges.push(TrackingBadge::plain("NOT OPENED", BadgeIcon::NotOpened)),
        None => {}
    }
    match t.view {
        Some(Facet::Seen { first_at, count, .. }) => {
            badges.push(TrackingBadge::seen(
                with_count("Viewed", count),
                BadgeIcon::Viewed,
                first_at,
                offset,
            ));
        }
        Some(Facet::Pending) => badges.push(TrackingBadge::plain("NOT VIEWED", BadgeIcon::NotViewed)),
        None => {}
    }
    if let Some(Facet::Seen { first_at, .. }) = t.download {
        badges.push(TrackingBadge::seen(
            "Downloaded".to_string(),
            BadgeIcon::Downloaded,
            first_at,
            offset,
        ));
    }

    if badges.is_empty() {
        TrackingStatus::NotApplicable
    } else {
        TrackingStatus::Badges(badges)
    }
}

fn with_count(label: &str, count: u32) -> String {
    if count > 1 {
        format!("{} ({}x)", label, count)
    } else {
        label.to_string()
    }
}
