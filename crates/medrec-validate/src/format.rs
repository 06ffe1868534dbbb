//! Text shape predicates.

use medrec_model::{Field, PatientId, Turnaround, ValidationError, parse_timestamp};

/// True when `text`, after removing at most one `.`, is a non-empty run of
/// ASCII digits. Signs and exponents are rejected, so negative values and
/// scientific notation never pass.
pub fn is_valid_float(text: &str) -> bool {
    let without_point = text.replacen('.', "", 1);
    !without_point.is_empty() && without_point.bytes().all(|b| b.is_ascii_digit())
}

/// `DD-hh-mm` with numeric components, hours below 24 and minutes below 60.
pub fn is_valid_turnaround(text: &str) -> bool {
    text.parse::<Turnaround>().is_ok()
}

/// `YYYY-MM-DD HH:MM` exactly, naming a real calendar minute.
pub fn is_valid_date(text: &str) -> bool {
    parse_timestamp(text, Field::TestDate).is_ok()
}

/// Exactly seven ASCII digits.
pub fn is_valid_patient_id(text: &str) -> bool {
    text.parse::<PatientId>().is_ok()
}

/// Parse a user supplied result value, enforcing [`is_valid_float`].
pub fn parse_result_value(text: &str) -> Result<f64, ValidationError> {
    parse_unsigned_float(text, Field::ResultValue)
}

/// Parse a user supplied range bound; empty input means "no bound".
pub fn parse_bound(text: &str, field: Field) -> Result<Option<f64>, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_unsigned_float(trimmed, field).map(Some)
}

fn parse_unsigned_float(text: &str, field: Field) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    if !is_valid_float(trimmed) {
        return Err(ValidationError::new(
            field,
            format!("'{trimmed}' is not a valid number"),
        ));
    }
    trimmed
        .parse::<f64>()
        .map_err(|e| ValidationError::new(field, e.to_string()))
}
