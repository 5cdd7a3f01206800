//! Formatting utilities for currency, dates and relative times.

use chrono::{DateTime, Utc};

/// Format an amount in Kenyan shillings with no decimals (e.g., "Ksh 1,500").
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}Ksh {}", sign, group_thousands(rounded.abs() as u64))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format a date as "5 Jan 2025", or "5 Jan 2025, 14:05" with the time.
pub fn format_date(date: &DateTime<Utc>, include_time: bool) -> String {
    if include_time {
        date.format("%-d %b %Y, %H:%M").to_string()
    } else {
        date.format("%-d %b %Y").to_string()
    }
}

/// Parse an RFC 3339 timestamp and format it with [`format_date`].
pub fn format_date_str(date: &str, include_time: bool) -> Option<String> {
    DateTime::parse_from_rfc3339(date)
        .ok()
        .map(|dt| format_date(&dt.with_timezone(&Utc), include_time))
}

/// Describe how long ago `then` was relative to `now` (e.g., "3 hours ago").
///
/// Months count as 30 days and years as 365; the coarser unit never reads as zero.
pub fn time_ago(then: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(*then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return ago(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return ago(hours, "hour");
    }

    let days = hours / 24;
    if days < 7 {
        return ago(days, "day");
    }

    let weeks = days / 7;
    if weeks < 4 {
        return ago(weeks, "week");
    }

    let months = (days / 30).max(1);
    if months < 12 {
        return ago(months, "month");
    }

    ago((days / 365).max(1), "year")
}

fn ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}
