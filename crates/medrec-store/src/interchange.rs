//! CSV export and import.
//!
//! Columns are fixed: `Patient ID,Abbreviation,Test Date,Result Value,Unit,Status,Result Date`.
//! Import applies the same per-line policy as the record file: rows naming
//! unknown tests or holding malformed fields are reported and skipped.

use std::io::{Read, Write};
use std::path::Path;

use medrec_model::{
    Diagnostic, Parsed, PatientId, PatientMap, TestLookup, TestRecord, format_timestamp,
    format_value,
};
use serde::Serialize;
use tracing::info;

use crate::backing::BackingFile;
use crate::error::{Result, StoreError};
use crate::fields::{LineError, RawRecord, log_skipped};

pub const CSV_HEADER: [&str; 7] = [
    "Patient ID",
    "Abbreviation",
    "Test Date",
    "Result Value",
    "Unit",
    "Status",
    "Result Date",
];

/// One exported row, already rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    #[serde(rename = "Patient ID")]
    pub patient_id: String,
    #[serde(rename = "Abbreviation")]
    pub abbreviation: String,
    #[serde(rename = "Test Date")]
    pub test_date: String,
    #[serde(rename = "Result Value")]
    pub result_value: String,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Status")]
    pub status: String,
    /// Empty when the record has no result date.
    #[serde(rename = "Result Date")]
    pub result_date: String,
}

impl CsvRow {
    pub fn from_record(patient_id: PatientId, record: &TestRecord) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            abbreviation: record.test.clone(),
            test_date: format_timestamp(&record.test_date),
            result_value: format_value(record.result_value),
            unit: record.unit.clone(),
            status: record.status.to_string(),
            result_date: record
                .result_date
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
        }
    }
}

/// One row per record, patients in map order and records in list order.
pub fn export_rows(patients: &PatientMap) -> Vec<CsvRow> {
    patients
        .values()
        .flat_map(|patient| {
            patient
                .records
                .iter()
                .map(|record| CsvRow::from_record(patient.id, record))
        })
        .collect()
}

/// Write the header and one row per record; returns the number of rows.
pub fn write_csv<W: Write>(writer: W, patients: &PatientMap) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    let rows = export_rows(patients);
    for row in &rows {
        csv_writer.serialize(row)?;
    }
    csv_writer
        .flush()
        .map_err(|e| StoreError::Csv(csv::Error::from(e)))?;
    Ok(rows.len())
}

/// Export to a file, replacing it atomically.
pub fn export_csv_file(path: &Path, patients: &PatientMap) -> Result<usize> {
    let mut buffer = Vec::new();
    let count = write_csv(&mut buffer, patients)?;
    BackingFile::new(path).replace_contents(&buffer)?;
    info!(path = %path.display(), records = count, "exported medical records");
    Ok(count)
}

/// Parse a single CSV data row (no header).
pub fn parse_csv_line(
    line: &str,
    catalog: &impl TestLookup,
) -> std::result::Result<(PatientId, TestRecord), LineError> {
    let mut reader = csv_reader(line.as_bytes(), false);
    match reader.records().next() {
        Some(Ok(record)) => parse_csv_record(&record, catalog),
        Some(Err(e)) => Err(LineError::Malformed(e.to_string())),
        None => Err(LineError::Malformed("empty line".to_string())),
    }
}

/// Import a CSV document. The header row is skipped once; each data row
/// either yields a record or a diagnostic. Only I/O failures abort.
pub fn import_csv<R: Read>(
    reader: R,
    catalog: &impl TestLookup,
) -> Result<Parsed<Vec<(PatientId, TestRecord)>>> {
    let mut reader = csv_reader(reader, true);
    let mut rows = Vec::new();
    let mut diagnostics = Vec::new();

    let header_matches = reader.headers().is_ok_and(|header| {
        header.len() >= CSV_HEADER.len() - 1
            && header
                .iter()
                .zip(CSV_HEADER)
                .all(|(found, expected)| found.eq_ignore_ascii_case(expected))
    });
    if !header_matches {
        diagnostics.push(Diagnostic::warning(1, "unexpected CSV header row"));
    }

    for (idx, result) in reader.records().enumerate() {
        // The header occupies line 1.
        let fallback_line = idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(StoreError::Csv(e)),
            Err(e) => {
                let line = e
                    .position()
                    .map_or(fallback_line, |p| p.line() as usize);
                let diagnostic = Diagnostic::error(line, e.to_string());
                log_skipped(&diagnostic, "csv import");
                diagnostics.push(diagnostic);
                continue;
            }
        };
        let line = record
            .position()
            .map_or(fallback_line, |p| p.line() as usize);
        if record.iter().all(str::is_empty) {
            continue;
        }
        match parse_csv_record(&record, catalog) {
            Ok(row) => rows.push(row),
            Err(error) => {
                let diagnostic = error.into_diagnostic(line);
                log_skipped(&diagnostic, "csv import");
                diagnostics.push(diagnostic);
            }
        }
    }
    Ok(Parsed::new(rows, diagnostics))
}

/// Import from a file path.
pub fn import_csv_file(
    path: &Path,
    catalog: &impl TestLookup,
) -> Result<Parsed<Vec<(PatientId, TestRecord)>>> {
    let file = std::fs::File::open(path).map_err(|e| StoreError::io("read", path, e))?;
    let parsed = import_csv(file, catalog)?;
    info!(
        path = %path.display(),
        records = parsed.value.len(),
        skipped = parsed.diagnostics.len(),
        "read CSV import"
    );
    Ok(parsed)
}

fn csv_reader<R: Read>(reader: R, has_headers: bool) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn parse_csv_record(
    record: &csv::StringRecord,
    catalog: &impl TestLookup,
) -> std::result::Result<(PatientId, TestRecord), LineError> {
    if !(6..=7).contains(&record.len()) {
        return Err(LineError::Malformed(format!(
            "expected 6 or 7 columns, found {}",
            record.len()
        )));
    }
    let field = |idx: usize| record.get(idx).unwrap_or_default();
    RawRecord {
        patient_id: field(0),
        test: field(1),
        test_date: field(2),
        result_value: field(3),
        unit: field(4),
        status: field(5),
        result_date: record.get(6),
    }
    .parse(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrec_model::{Severity, TestDefinition};
    use std::collections::BTreeMap;

    fn catalog() -> BTreeMap<String, TestDefinition> {
        let mut tests = BTreeMap::new();
        tests.insert(
            "GLU".to_string(),
            TestDefinition {
                name: "Glucose".to_string(),
                abbr: "GLU".to_string(),
                lower_bound: Some(70.0),
                upper_bound: Some(100.0),
                unit: "mg/dL".to_string(),
                turnaround: "00-02-00".parse().unwrap(),
            },
        );
        tests
    }

    #[test]
    fn single_line_parses() {
        let (patient_id, record) = parse_csv_line(
            "1234567,GLU,2023-05-01 09:00,85.0,mg/dL,completed,2023-05-01 11:00",
            &catalog(),
        )
        .unwrap();
        assert_eq!(patient_id.get(), 1_234_567);
        assert!(record.result_date.is_some());
    }

    #[test]
    fn empty_result_date_is_absent() {
        let (_, record) =
            parse_csv_line("1234567,GLU,2023-05-01 09:00,85.0,mg/dL,pending,", &catalog()).unwrap();
        assert_eq!(record.result_date, None);
    }

    #[test]
    fn short_rows_are_malformed() {
        let error = parse_csv_line("1234567,GLU,2023-05-01 09:00", &catalog()).unwrap_err();
        assert!(matches!(error, LineError::Malformed(_)));
    }

    #[test]
    fn unknown_test_row_is_skipped_and_later_rows_import() {
        let text = "Patient ID,Abbreviation,Test Date,Result Value,Unit,Status,Result Date\n\
                    1234567,XXX,2023-05-01 09:00,1.0,u,pending,\n\
                    1234567,GLU,2023-05-01 09:00,85.0,mg/dL,pending,\n";
        let parsed = import_csv(text.as_bytes(), &catalog()).unwrap();
        assert_eq!(parsed.value.len(), 1);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].severity, Severity::Warning);
        assert_eq!(parsed.diagnostics[0].line, 2);
        assert!(parsed.diagnostics[0].message.contains("XXX"));
    }

    #[test]
    fn header_is_always_written() {
        let mut buffer = Vec::new();
        let count = write_csv(&mut buffer, &PatientMap::new()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Patient ID,Abbreviation,Test Date,Result Value,Unit,Status,Result Date\n"
        );
    }
}
