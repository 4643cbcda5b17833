//! Relative-time formatting for reply and refresh timestamps.

use chrono::Utc;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Average month length in seconds (30.44 days).
const MONTH: f64 = 86_400.0 * 30.44;
const YEAR: f64 = MONTH * 12.0;

/// Format `unix_time` relative to `now`, e.g. `"2 minutes ago"`.
///
/// Both arguments are seconds since the Unix epoch. Timestamps in the future
/// are reported as `"just now"`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn time_ago(unix_time: i64, now: i64) -> String {
    let diff = now.saturating_sub(unix_time);
    let diff_f = diff as f64;

    if diff < 2 {
        "just now".to_string()
    } else if diff < MINUTE {
        format!("{diff} seconds ago")
    } else if diff < 2 * MINUTE {
        "1 minute ago".to_string()
    } else if diff < HOUR {
        format!("{} minutes ago", diff / MINUTE)
    } else if diff < 2 * HOUR {
        "1 hour ago".to_string()
    } else if diff < DAY {
        format!("{} hours ago", diff / HOUR)
    } else if diff < 2 * DAY {
        "1 day ago".to_string()
    } else if diff < WEEK {
        format!("{} days ago", diff / DAY)
    } else if diff < 2 * WEEK {
        "1 week ago".to_string()
    } else if diff_f < MONTH {
        format!("{} weeks ago", diff / WEEK)
    } else if diff_f < MONTH * 2.0 {
        "1 month ago".to_string()
    } else if diff_f < YEAR {
        format!("{} months ago", (diff_f / MONTH).floor() as i64)
    } else if diff_f < YEAR * 2.0 {
        "1 year ago".to_string()
    } else {
        format!("{} years ago", (diff_f / YEAR).floor() as i64)
    }
}

/// Format `unix_time` relative to the current wall clock.
#[must_use]
pub fn time_ago_now(unix_time: i64) -> String {
    time_ago(unix_time, Utc::now().timestamp())
}
