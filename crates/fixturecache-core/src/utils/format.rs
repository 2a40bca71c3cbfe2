use chrono::{Duration, NaiveDate};

/// Countdown to kickoff, e.g. `2D 3H 15M 9S`.
///
/// Leading zero units are dropped; non-positive durations render as `0S`.
pub fn format_countdown(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{}D {}H {}M {}S", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}H {}M {}S", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}M {}S", minutes, seconds)
    } else {
        format!("{}S", seconds)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Some(day) = date.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
        day.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}
