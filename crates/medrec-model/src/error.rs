use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The user-facing field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Abbreviation,
    Range,
    LowerBound,
    UpperBound,
    Unit,
    Turnaround,
    PatientId,
    Test,
    TestDate,
    ResultValue,
    Status,
    ResultDate,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Abbreviation => "abbreviation",
            Field::Range => "range",
            Field::LowerBound => "lower range",
            Field::UpperBound => "upper range",
            Field::Unit => "unit",
            Field::Turnaround => "turnaround time",
            Field::PatientId => "patient id",
            Field::Test => "test",
            Field::TestDate => "test date",
            Field::ResultValue => "result value",
            Field::Status => "status",
            Field::ResultDate => "result date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value rejected by a validator, naming the field and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_field_and_reason() {
        let error = ValidationError::new(Field::Range, "lower range must be less than upper range");
        assert_eq!(
            error.to_string(),
            "invalid range: lower range must be less than upper range"
        );
    }
}
