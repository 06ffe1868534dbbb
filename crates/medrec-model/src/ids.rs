#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::error::{Field, ValidationError};

const PATIENT_ID_DIGITS: usize = 7;
const PATIENT_ID_LIMIT: u32 = 10_000_000;

/// Seven digit patient identifier.
///
/// Stored as an integer and always rendered zero padded to seven digits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct PatientId(u32);

impl PatientId {
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value >= PATIENT_ID_LIMIT {
            return Err(ValidationError::new(
                Field::PatientId,
                format!("{value} has more than {PATIENT_ID_DIGITS} digits"),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for PatientId {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PatientId> for u32 {
    fn from(id: PatientId) -> Self {
        id.0
    }
}

impl FromStr for PatientId {
    type Err = ValidationError;

    /// Accepts exactly seven ASCII digits (leading zeros allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != PATIENT_ID_DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::new(
                Field::PatientId,
                format!("'{trimmed}' must be a {PATIENT_ID_DIGITS}-digit number"),
            ));
        }
        let value = trimmed
            .parse::<u32>()
            .map_err(|e| ValidationError::new(Field::PatientId, e.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:07}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seven_digits() {
        let id: PatientId = "1234567".parse().unwrap();
        assert_eq!(id.get(), 1_234_567);
        assert_eq!(id.to_string(), "1234567");
    }

    #[test]
    fn keeps_leading_zeros_when_rendered() {
        let id: PatientId = "0012345".parse().unwrap();
        assert_eq!(id.get(), 12_345);
        assert_eq!(id.to_string(), "0012345");
    }

    #[test]
    fn rejects_wrong_length_and_non_digits() {
        assert!("123456".parse::<PatientId>().is_err());
        assert!("12345678".parse::<PatientId>().is_err());
        assert!("12a4567".parse::<PatientId>().is_err());
        assert!("-123456".parse::<PatientId>().is_err());
        assert!(PatientId::new(10_000_000).is_err());
    }
}
