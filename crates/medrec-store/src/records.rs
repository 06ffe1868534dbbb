//! Patient record store and the native record line format.
//!
//! ```text
//! 1234567: GLU, 2023-05-01 09:00, 85.0, mg/dL, completed, 2023-05-01 11:00
//! 1234567: LDL, 2023-05-02 10:15, 120.0, mg/dL, pending
//! ```

use std::path::PathBuf;

use chrono::NaiveDateTime;
use medrec_model::{
    NewRecord, Parsed, Patient, PatientId, PatientMap, RecordPatch, Status, TestLookup,
    TestRecord, format_timestamp, format_value, record_count,
};
use medrec_validate::{validate_new_record, validate_record_edit};
use tracing::info;

use crate::backing::BackingFile;
use crate::error::{NotFound, Result};
use crate::fields::{LineError, RawRecord, log_skipped};

/// Parse one `<patientId>: <abbr>, <testDate>, <value>, <unit>, <status>[, <resultDate>]` line.
pub fn parse_record_line(
    line: &str,
    catalog: &impl TestLookup,
) -> std::result::Result<(PatientId, TestRecord), LineError> {
    let (patient_id, rest) = line
        .trim()
        .split_once(':')
        .ok_or_else(|| LineError::Malformed("missing ':' after the patient id".to_string()))?;
    let parts: Vec<&str> = rest.split(',').map(str::trim).collect();
    if !(5..=6).contains(&parts.len()) {
        return Err(LineError::Malformed(format!(
            "expected 5 or 6 comma separated fields after the patient id, found {}",
            parts.len()
        )));
    }
    RawRecord {
        patient_id,
        test: parts[0],
        test_date: parts[1],
        result_value: parts[2],
        unit: parts[3],
        status: parts[4],
        result_date: parts.get(5).copied(),
    }
    .parse(catalog)
}

/// Parse a whole record file line by line. Bad lines become diagnostics;
/// everything else is grouped by patient in file order.
pub fn parse_records(text: &str, catalog: &impl TestLookup) -> Parsed<PatientMap> {
    let mut patients = PatientMap::new();
    let mut diagnostics = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_record_line(line, catalog) {
            Ok((patient_id, record)) => patients
                .entry(patient_id)
                .or_insert_with(|| Patient::new(patient_id))
                .add_record(record),
            Err(error) => {
                let diagnostic = error.into_diagnostic(idx + 1);
                log_skipped(&diagnostic, "record file");
                diagnostics.push(diagnostic);
            }
        }
    }
    Parsed::new(patients, diagnostics)
}

/// Render one record as a native line (no trailing newline).
///
/// The result date is written only for completed records. Status is an enum
/// written in lowercase, so `Completed` read from disk keeps its result date.
pub fn serialize_record_line(patient_id: PatientId, record: &TestRecord) -> String {
    let mut line = format!(
        "{}: {}, {}, {}, {}, {}",
        patient_id,
        record.test,
        format_timestamp(&record.test_date),
        format_value(record.result_value),
        record.unit,
        record.status
    );
    if let (Status::Completed, Some(result_date)) = (record.status, &record.result_date) {
        line.push_str(", ");
        line.push_str(&format_timestamp(result_date));
    }
    line
}

/// Every record of every patient, patients in map order and records in list order.
pub fn serialize_records(patients: &PatientMap) -> Vec<String> {
    patients
        .values()
        .flat_map(|patient| {
            patient
                .records
                .iter()
                .map(|record| serialize_record_line(patient.id, record))
        })
        .collect()
}

/// Patients and their records, optionally persisted to a record file.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    patients: PatientMap,
    backing: Option<BackingFile>,
}

impl RecordStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn from_patients(patients: PatientMap) -> Self {
        Self {
            patients,
            backing: None,
        }
    }

    /// Load the record file at `path`, resolving tests against `catalog`.
    /// A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>, catalog: &impl TestLookup) -> Result<Parsed<Self>> {
        let backing = BackingFile::new(path);
        let parsed = match backing.read()? {
            Some(text) => parse_records(&text, catalog),
            None => {
                info!(path = %backing.path().display(), "record file not found, starting empty");
                Parsed::default()
            }
        };
        info!(
            path = %backing.path().display(),
            patients = parsed.value.len(),
            records = record_count(&parsed.value),
            skipped = parsed.diagnostics.len(),
            "loaded medical records"
        );
        Ok(parsed.map(|patients| Self {
            patients,
            backing: Some(backing),
        }))
    }

    pub fn patients(&self) -> &PatientMap {
        &self.patients
    }

    pub fn patient(&self, id: PatientId) -> Option<&Patient> {
        self.patients.get(&id)
    }

    pub fn record_count(&self) -> usize {
        record_count(&self.patients)
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Append an already validated record: one new line in the backing file,
    /// then the patient's sequence (creating the patient on first use).
    pub fn append_record(&mut self, patient_id: PatientId, record: TestRecord) -> Result<()> {
        if let Some(backing) = &self.backing {
            backing.append_line(&serialize_record_line(patient_id, &record))?;
        }
        self.patients
            .entry(patient_id)
            .or_insert_with(|| Patient::new(patient_id))
            .add_record(record);
        Ok(())
    }

    /// Validate a new record against the catalog and append it.
    pub fn add_record(
        &mut self,
        draft: &NewRecord,
        catalog: &impl TestLookup,
        now: NaiveDateTime,
    ) -> Result<()> {
        let definition = catalog
            .test(&draft.test)
            .ok_or_else(|| NotFound::Test(draft.test.clone()))?;
        let record = validate_new_record(draft, definition, now)?;
        self.append_record(draft.patient_id, record)?;
        info!(test = %draft.test, "added medical record");
        Ok(())
    }

    /// Patch the record at `index` (0-based) of a patient and rewrite the file.
    ///
    /// Nothing changes, in memory or on disk, when any check fails.
    pub fn update_record_at(
        &mut self,
        patient_id: PatientId,
        index: usize,
        patch: &RecordPatch,
        catalog: &impl TestLookup,
        now: NaiveDateTime,
    ) -> Result<&TestRecord> {
        let patient = self
            .patients
            .get(&patient_id)
            .ok_or(NotFound::Patient(patient_id))?;
        let current = patient.records.get(index).ok_or(NotFound::Record {
            patient: patient_id,
            index,
            len: patient.records.len(),
        })?;

        let new_unit = match &patch.test {
            Some(abbr) => Some(
                catalog
                    .test(abbr)
                    .ok_or_else(|| NotFound::Test(abbr.clone()))?
                    .unit
                    .as_str(),
            ),
            None => None,
        };
        let updated = current.patched(patch, new_unit);
        validate_record_edit(patch, &updated, now)?;

        let mut next = self.patients.clone();
        if let Some(slot) = next
            .get_mut(&patient_id)
            .and_then(|patient| patient.records.get_mut(index))
        {
            *slot = updated;
        }
        if let Some(backing) = &self.backing {
            backing.rewrite(serialize_records(&next))?;
        }
        self.patients = next;
        info!(index, "updated medical record");
        self.patients
            .get(&patient_id)
            .and_then(|patient| patient.records.get(index))
            .ok_or_else(|| {
                NotFound::Record {
                    patient: patient_id,
                    index,
                    len: 0,
                }
                .into()
            })
    }

    /// Append imported records one by one; returns how many were added.
    pub fn import(&mut self, rows: Vec<(PatientId, TestRecord)>) -> Result<usize> {
        let mut added = 0;
        for (patient_id, record) in rows {
            self.append_record(patient_id, record)?;
            added += 1;
        }
        info!(records = added, "imported medical records");
        Ok(added)
    }

    pub fn serialize(&self) -> Vec<String> {
        serialize_records(&self.patients)
    }
}
