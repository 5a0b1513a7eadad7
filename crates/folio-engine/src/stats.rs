//! Summary tiles above the billing activity log.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use folio_types::models::{ActivityEvent, ActivityKind, EventStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BillingStats {
    pub payments_succeeded_today: usize,
    pub payments_failed_today: usize,
    pub emails_sent_today: usize,
    pub revenue_today_cents: i64,
    pub revenue_today: String,
    /// Failed or warning events across the whole log.
    pub action_required: usize,
}

pub fn billing_stats(events: &[ActivityEvent], now: &DateTime<FixedOffset>) -> BillingStats {
    let today = now.date_naive();
    let mut stats = BillingStats::default();

    for event in events {
        if matches!(event.status, Some(EventStatus::Failed | EventStatus::Warning)) {
            stats.action_required += 1;
        }
        let is_today = event
            .timestamp
            .get()
            .is_some_and(|ts| ts.with_timezone(now.offset()).date_naive() == today);
        if !is_today {
            continue;
        }
        match event.kind {
            ActivityKind::PaymentSuccess => {
                stats.payments_succeeded_today += 1;
                let amount = event
                    .extended_details
                    .as_ref()
                    .and_then(|d| d.amount.as_deref())
                    .and_then(parse_amount_cents)
                    .unwrap_or(0);
                stats.revenue_today_cents = stats.revenue_today_cents.saturating_add(amount);
            }
            ActivityKind::PaymentFailed => stats.payments_failed_today += 1,
            ActivityKind::EmailSent => stats.emails_sent_today += 1,
            _ => {}
        }
    }

    stats.revenue_today = format_cents(stats.revenue_today_cents);
    stats
}

/// Parses display amounts such as `$2,500.00` or `1500` into cents.
pub fn parse_amount_cents(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > 2 || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    let cents = whole.checked_mul(100)?.checked_add(frac)?;
    Some(if negative { -cents } else { cents })
}

/// `$1,234.56`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use folio_types::models::{ActivityCategory, Actor, ExtendedDetails};

    fn now() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2025, 12, 8, 18, 0, 0).unwrap().fixed_offset()
    }

    fn event(kind: ActivityKind, ago: Duration, status: EventStatus, amount: Option<&str>) -> ActivityEvent {
        let mut e = ActivityEvent::new(
            kind,
            Actor::system(),
            "billing",
            now().with_timezone(&Utc) - ago,
            ActivityCategory::Financial,
        );
        e.status = Some(status);
        e.extended_details = amount.map(|a| ExtendedDetails {
            amount: Some(a.to_string()),
            ..ExtendedDetails::default()
        });
        e
    }

    #[test]
    fn amounts() {
        assert_eq!(parse_amount_cents("$2,500.00"), Some(250_000));
        assert_eq!(parse_amount_cents("1500"), Some(150_000));
        assert_eq!(parse_amount_cents("$19.9"), Some(1_990));
        assert_eq!(parse_amount_cents("-$5.25"), Some(-525));
        assert_eq!(parse_amount_cents("TBD"), None);
        assert_eq!(parse_amount_cents("1.234"), None);
        assert_eq!(format_cents(123_456_789), "$1,234,567.89");
        assert_eq!(format_cents(5), "$0.05");
    }

    #[test]
    fn today_counts_and_revenue() {
        let events = vec![
            event(ActivityKind::PaymentSuccess, Duration::hours(1), EventStatus::Success, Some("$2,500.00")),
            event(ActivityKind::PaymentSuccess, Duration::hours(2), EventStatus::Success, Some("$99.50")),
            event(ActivityKind::PaymentSuccess, Duration::days(2), EventStatus::Success, Some("$1,000.00")),
            event(ActivityKind::PaymentFailed, Duration::hours(3), EventStatus::Failed, None),
            event(ActivityKind::RetryScheduled, Duration::days(3), EventStatus::Warning, None),
            event(ActivityKind::EmailSent, Duration::minutes(5), EventStatus::Success, None),
        ];
        let stats = billing_stats(&events, &now());
        assert_eq!(stats.payments_succeeded_today, 2);
        assert_eq!(stats.payments_failed_today, 1);
        assert_eq!(stats.emails_sent_today, 1);
        assert_eq!(stats.revenue_today, "$2,599.50");
        assert_eq!(stats.action_required, 2);
    }

    #[test]
    fn revenue_saturates_on_huge_amounts() {
        let huge = "$90,000,000,000,000,000";
        let events = vec![
            event(ActivityKind::PaymentSuccess, Duration::hours(1), EventStatus::Success, Some(huge)),
            event(ActivityKind::PaymentSuccess, Duration::hours(2), EventStatus::Success, Some(huge)),
        ];
        let stats = billing_stats(&events, &now());
        assert_eq!(stats.payments_succeeded_today, 2);
        assert_eq!(stats.revenue_today_cents, i64::MAX);
        assert_eq!(stats.revenue_today, format_cents(i64::MAX));
        assert_eq!(format_cents(i64::MIN), "-$92,233,720,368,547,758.08");
    }
}
