//! Store error types.
//!
//! Bulk ingestion reports per-line problems as diagnostics; these errors are
//! for whole operations that were rejected and left the store unchanged.

use std::path::PathBuf;

use medrec_model::{PatientId, ValidationError};
use thiserror::Error;

/// Something a mutation referred to does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("test '{0}' not found in the catalog")]
    Test(String),
    #[error("patient {0} not found")]
    Patient(PatientId),
    #[error("record index {index} is out of range for patient {patient} ({len} records)")]
    Record {
        patient: PatientId,
        index: usize,
        len: usize,
    },
}

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A catalog line could not be parsed; the whole catalog load fails.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A value failed validation; the operation was not applied.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// The abbreviation is already used by another catalog entry.
    #[error("test abbreviation '{0}' already exists")]
    DuplicateKey(String),

    /// File I/O error.
    #[error("failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// A hint for resolving the error, when there is an obvious one.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Parse { .. } => {
                Some("Fix the catalog line; the expected layout is `Name: <name> (<abbr>); Range: > <lower>, < <upper>; Unit: <unit>, DD-hh-mm`.")
            }
            Self::DuplicateKey(_) => Some("Choose a different abbreviation or update the existing test."),
            Self::NotFound(NotFound::Test(_)) => Some("Run `medrec tests list` to see the known abbreviations."),
            Self::NotFound(NotFound::Record { .. }) => {
                Some("Run `medrec records list` to see the record numbers for the patient.")
            }
            Self::Io { operation, .. } if *operation == "read" => {
                Some("Check that the file exists and you have permission to read it.")
            }
            Self::Io { .. } => Some("Check that you have permission to write to this location."),
            Self::Validation(_) | Self::NotFound(NotFound::Patient(_)) | Self::Csv(_) => None,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
