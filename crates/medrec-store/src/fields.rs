//! Field conversion shared by the native record lines and CSV rows.

use std::fmt;

use medrec_model::{
    Diagnostic, Field, PatientId, Severity, Status, TestLookup, TestRecord, ValidationError,
    parse_timestamp,
};
use medrec_validate::validate_result_date_on_edit;

/// Why one input line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line is well formed but names a test that is not in the catalog.
    UnknownTest(String),
    /// A field could not be parsed.
    Malformed(String),
}

impl LineError {
    pub fn into_diagnostic(self, line: usize) -> Diagnostic {
        match self {
            LineError::UnknownTest(abbr) => Diagnostic::warning(
                line,
                format!("test '{abbr}' not found in the list of valid medical tests"),
            ),
            LineError::Malformed(message) => Diagnostic::error(line, message),
        }
    }
}

/// Emit the tracing event for a skipped line: `warn!` for unknown tests,
/// `error!` for malformed lines. The message may quote field values, so it
/// stays in the diagnostic and is not logged.
pub(crate) fn log_skipped(diagnostic: &Diagnostic, source: &'static str) {
    match diagnostic.severity {
        Severity::Warning => {
            tracing::warn!(line = diagnostic.line, source, "skipping line with unknown test");
        }
        Severity::Error => {
            tracing::error!(line = diagnostic.line, source, "skipping malformed line");
        }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::UnknownTest(abbr) => write!(f, "unknown test '{abbr}'"),
            LineError::Malformed(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for LineError {}

impl From<ValidationError> for LineError {
    fn from(error: ValidationError) -> Self {
        LineError::Malformed(error.to_string())
    }
}

/// The raw text of one record, split into its seven fields.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawRecord<'a> {
    pub patient_id: &'a str,
    pub test: &'a str,
    pub test_date: &'a str,
    pub result_value: &'a str,
    pub unit: &'a str,
    pub status: &'a str,
    pub result_date: Option<&'a str>,
}

impl RawRecord<'_> {
    /// Convert to a typed record. Field errors win over an unknown test, so
    /// a broken line is always reported as an error.
    pub fn parse(&self, catalog: &impl TestLookup) -> Result<(PatientId, TestRecord), LineError> {
        let patient_id: PatientId = self.patient_id.parse()?;
        let test = self.test.trim();
        if test.is_empty() {
            return Err(LineError::Malformed("test abbreviation is empty".to_string()));
        }
        let test_date = parse_timestamp(self.test_date, Field::TestDate)?;
        let result_value = parse_stored_value(self.result_value)?;
        let status: Status = self.status.parse()?;
        let result_date = self
            .result_date
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| parse_timestamp(text, Field::ResultDate))
            .transpose()?;
        if let Some(result_date) = result_date {
            validate_result_date_on_edit(result_date, test_date)?;
        }
        if !catalog.contains_test(test) {
            return Err(LineError::UnknownTest(test.to_string()));
        }
        Ok((
            patient_id,
            TestRecord {
                test: test.to_string(),
                test_date,
                result_value,
                unit: self.unit.trim().to_string(),
                status,
                result_date,
            },
        ))
    }
}

/// Stored values accept any finite decimal, including ones the interactive
/// validators would refuse (older files may hold negative values).
fn parse_stored_value(text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            ValidationError::new(Field::ResultValue, format!("'{trimmed}' is not a number"))
        })
}
