//! Reusable formatting utilities for CLI output
//!
//! Lap times, timestamps, sizes and other display values used across
//! multiple commands.

use std::time::Duration;

use chrono::DateTime;

/// Format a lap time as `M:SS.mmm`.
///
/// Returns "N/A" for untimed laps.
///
/// # Example output
/// `1:32.123`
pub fn format_lap_time(time: Option<Duration>) -> String {
    match time {
        Some(time) => format_lap_millis(time.as_millis() as u64),
        None => "N/A".to_string(),
    }
}

/// Format milliseconds as `M:SS.mmm`.
pub fn format_lap_millis(millis: u64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1000;
    let ms = millis % 1000;
    format!("{}:{:02}.{:03}", minutes, seconds, ms)
}

/// Format a Unix timestamp (seconds) as local date/time.
///
/// Returns "unknown" if the timestamp is out of range.
///
/// # Example output
/// `2025-01-15 14:30`
pub fn format_timestamp_local(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|d| {
            d.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format a position change with an explicit sign (`+3`, `-1`, `0`).
pub fn format_delta(delta: Option<i64>) -> String {
    match delta {
        Some(d) if d > 0 => format!("+{}", d),
        Some(d) => d.to_string(),
        None => "-".to_string(),
    }
}

/// Format a millisecond time gap as signed seconds (`+2.500s`).
pub fn format_gap_millis(gap: Option<i64>) -> String {
    match gap {
        Some(ms) => {
            let sign = if ms < 0 { "-" } else { "+" };
            let abs = ms.unsigned_abs();
            format!("{}{}.{:03}s", sign, abs / 1000, abs % 1000)
        }
        None => "-".to_string(),
    }
}

/// Format an optional value, "-" when absent.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
