//! Display strings for timestamps.
//!
//! Relative time and the billing timeline timestamp depend on `now`; the
//! tracking timestamp is always absolute.

use chrono::{DateTime, FixedOffset, Utc};

/// "Just now", "5 min ago", "3 hours ago", "Yesterday", "4 days ago",
/// "2 weeks ago", then a plain date.
pub fn relative_time(ts: DateTime<Utc>, now: &DateTime<FixedOffset>) -> String {
    let elapsed = now.with_timezone(&Utc).signed_duration_since(ts);
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{} min ago", mins)
    } else if hours < 24 {
        format!("{} {} ago", hours, plural(hours, "hour"))
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{} days ago", days)
    } else if days < 30 {
        let weeks = days / 7;
        format!("{} {} ago", weeks, plural(weeks, "week"))
    } else {
        ts.with_timezone(now.offset()).format("%-m/%-d/%Y").to_string()
    }
}

/// Billing log row time: relative inside today, otherwise "Dec 8, 2:30 PM".
pub fn billing_timeline_timestamp(ts: DateTime<Utc>, now: &DateTime<FixedOffset>) -> String {
    let local = ts.with_timezone(now.offset());
    if local.date_naive() == now.date_naive() {
        let elapsed = now.with_timezone(&Utc).signed_duration_since(ts);
        let mins = elapsed.num_minutes().max(0);
        if mins < 60 {
            return format!("{} min ago", mins);
        }
        return format!("{} hr ago", elapsed.num_hours());
    }
    local.format("%b %-d, %-I:%M %p").to_string()
}

/// Absolute receipt time, e.g. "12/8/2025 | 2:30 PM".
pub fn tracking_timestamp(ts: DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format("%-m/%-d/%Y | %-I:%M %p").to_string()
}

/// Clock time shown next to a message, e.g. "9:05 AM".
pub fn message_time(ts: DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format("%-I:%M %p").to_string()
}

fn plural(n: i64, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
