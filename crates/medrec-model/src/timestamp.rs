//! Minute precision timestamps in the fixed `YYYY-MM-DD HH:MM` layout.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{Field, ValidationError};

/// chrono format string for every timestamp in the text and CSV formats.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Zero padded `YYYY-MM-DD HH:MM`; the calendar check is left to chrono.
static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$")
        .expect("Invalid timestamp regex")
});

/// Parse a timestamp that must match `YYYY-MM-DD HH:MM` exactly.
///
/// chrono alone accepts unpadded fields, so the layout is checked first.
pub fn parse_timestamp(text: &str, field: Field) -> Result<NaiveDateTime, ValidationError> {
    let trimmed = text.trim();
    if !TIMESTAMP_REGEX.is_match(trimmed) {
        return Err(ValidationError::new(
            field,
            format!("'{trimmed}' must use the format YYYY-MM-DD HH:MM"),
        ));
    }
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
        .map_err(|e| ValidationError::new(field, format!("'{trimmed}' is not a valid date: {e}")))
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}
