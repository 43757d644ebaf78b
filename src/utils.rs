//! Utility functions for the premarket options library.

use chrono::{DateTime, Utc};

/// Formats a millisecond UNIX timestamp as a human readable UTC string.
///
/// # Arguments
///
/// * `timestamp_ms` - Milliseconds since the UNIX epoch
///
/// # Returns
///
/// A string in `YYYY-MM-DD HH:MM:SS UTC` format, or the raw millisecond
/// value when the timestamp falls outside the representable date range.
///
/// # Examples
///
/// ```rust
/// use premarket_options::utils::format_timestamp_ms;
///
/// let formatted = format_timestamp_ms(1_700_000_000_000);
/// assert_eq!(formatted, "2023-11-14 22:13:20 UTC");
/// ```
#[must_use]
pub fn format_timestamp_ms(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(
            || format!("{timestamp_ms} ms"),
            |date| date.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}
