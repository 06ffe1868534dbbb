//! Lifecycle status of a test record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Field, ValidationError};

/// Record status.
///
/// Parsing is case-insensitive; the stored and serialized form is always the
/// lowercase name, so `Completed` on disk is read back as `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Ordered, no result yet.
    Pending,
    /// Result available; carries a result date.
    Completed,
    /// Result reviewed by a clinician.
    Reviewed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Completed, Status::Reviewed];

    /// Lowercase name as written to the record file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
            Status::Reviewed => "reviewed",
        }
    }

    /// Capitalised name for prompts and tables.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
            Status::Reviewed => "Reviewed",
        }
    }

    /// Case-insensitive comparison against a free-text status name.
    pub fn matches(&self, text: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(text.trim())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.matches(s))
            .ok_or_else(|| {
                ValidationError::new(
                    Field::Status,
                    format!(
                        "'{}' is not one of Pending, Completed, Reviewed",
                        s.trim()
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("completed".parse::<Status>().unwrap(), Status::Completed);
        assert_eq!("Completed".parse::<Status>().unwrap(), Status::Completed);
        assert_eq!(" PENDING ".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!("reviewed".parse::<Status>().unwrap(), Status::Reviewed);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Status::Completed.to_string(), "completed");
        assert_eq!(Status::Completed.label(), "Completed");
    }
}
