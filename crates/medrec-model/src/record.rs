use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::PatientId;
use crate::status::Status;

/// One test performed for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Abbreviation of the catalog entry; resolved through a `TestLookup`.
    pub test: String,
    pub test_date: NaiveDateTime,
    pub result_value: f64,
    /// Unit copied from the test when the record was created. It is not
    /// refreshed when the catalog entry changes later.
    pub unit: String,
    pub status: Status,
    pub result_date: Option<NaiveDateTime>,
}

impl TestRecord {
    /// Return a copy with every field present in `patch` replaced.
    ///
    /// Switching the test reference also needs the new unit, which the caller
    /// resolves from the catalog. Only a completed record keeps a result date
    /// it already had.
    pub fn patched(&self, patch: &RecordPatch, new_unit: Option<&str>) -> TestRecord {
        let status = patch.status.unwrap_or(self.status);
        let result_date = match status {
            Status::Completed => patch.result_date.or(self.result_date),
            Status::Pending | Status::Reviewed => patch.result_date,
        };
        TestRecord {
            test: patch.test.clone().unwrap_or_else(|| self.test.clone()),
            test_date: patch.test_date.unwrap_or(self.test_date),
            result_value: patch.result_value.unwrap_or(self.result_value),
            unit: new_unit.map_or_else(|| self.unit.clone(), str::to_string),
            status,
            result_date,
        }
    }
}

/// Field changes for the record at a given position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub test: Option<String>,
    pub test_date: Option<NaiveDateTime>,
    pub result_value: Option<f64>,
    pub status: Option<Status>,
    pub result_date: Option<NaiveDateTime>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.test.is_none()
            && self.test_date.is_none()
            && self.result_value.is_none()
            && self.status.is_none()
            && self.result_date.is_none()
    }
}

/// Input for a brand new record. The unit is not part of it: it is taken from
/// the referenced test at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub patient_id: PatientId,
    pub test: String,
    pub test_date: NaiveDateTime,
    pub result_value: f64,
    pub status: Status,
    pub result_date: Option<NaiveDateTime>,
}

/// A patient and the records created for them, in creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub records: Vec<TestRecord>,
}

impl Patient {
    pub fn new(id: PatientId) -> Self {
        Self {
            id,
            records: Vec::new(),
        }
    }

    pub fn with_records(id: PatientId, records: Vec<TestRecord>) -> Self {
        Self { id, records }
    }

    pub fn add_record(&mut self, record: TestRecord) {
        self.records.push(record);
    }
}

/// Patients keyed by identifier. Iteration order is ascending patient id.
pub type PatientMap = BTreeMap<PatientId, Patient>;

/// Total number of records across all patients.
pub fn record_count(patients: &PatientMap) -> usize {
    patients.values().map(|patient| patient.records.len()).sum()
}
