use chrono::{DateTime, Utc};
use questionnaire_core::time::parse_service_timestamp;

pub const NOT_AVAILABLE: &str = "Not available";
pub const INVALID_DATE: &str = "Invalid date";

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y, %-I:%M:%S %p").to_string()
}

/// Render a timestamp string from the questionnaire service for display.
#[must_use]
pub fn format_service_timestamp(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => NOT_AVAILABLE.to_string(),
        Some(value) => parse_service_timestamp(value)
            .map_or_else(|| INVALID_DATE.to_string(), format_datetime),
    }
}
