use chrono::NaiveDateTime;
use medrec_model::{Patient, PatientId, PatientMap, TestLookup, TestRecord, Turnaround};
use tracing::debug;

/// One record predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    PatientId(PatientId),
    /// Test abbreviation, compared exactly.
    Test(String),
    /// Result outside the test's normal range. Records whose test is not in
    /// the catalog never match.
    Abnormal,
    /// Test date within `[start, end]`.
    TestDateRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Status name, compared case-insensitively.
    Status(String),
    /// The test's configured turnaround within `[min, max]`. Records whose
    /// test is not in the catalog never match.
    TurnaroundRange { min: Turnaround, max: Turnaround },
}

impl Criterion {
    /// Short name for logs; never includes the criterion's value.
    pub fn kind(&self) -> &'static str {
        match self {
            Criterion::PatientId(_) => "patient id",
            Criterion::Test(_) => "test",
            Criterion::Abnormal => "abnormal",
            Criterion::TestDateRange { .. } => "test date range",
            Criterion::Status(_) => "status",
            Criterion::TurnaroundRange { .. } => "turnaround range",
        }
    }

    pub fn matches(&self, patient: PatientId, record: &TestRecord, lookup: &impl TestLookup) -> bool {
        match self {
            Criterion::PatientId(id) => patient == *id,
            Criterion::Test(abbr) => record.test == *abbr,
            Criterion::Abnormal => lookup
                .test(&record.test)
                .is_some_and(|definition| !definition.is_result_normal(record.result_value)),
            Criterion::TestDateRange { start, end } => {
                (*start..=*end).contains(&record.test_date)
            }
            Criterion::Status(text) => record.status.matches(text),
            Criterion::TurnaroundRange { min, max } => lookup
                .test(&record.test)
                .is_some_and(|definition| (*min..=*max).contains(&definition.turnaround)),
        }
    }
}

/// Keep the records matching `criterion`; patients left empty are dropped.
pub fn apply(patients: &PatientMap, criterion: &Criterion, lookup: &impl TestLookup) -> PatientMap {
    let filtered: PatientMap = patients
        .values()
        .filter_map(|patient| {
            let records: Vec<TestRecord> = patient
                .records
                .iter()
                .filter(|record| criterion.matches(patient.id, record, lookup))
                .cloned()
                .collect();
            (!records.is_empty()).then(|| (patient.id, Patient::with_records(patient.id, records)))
        })
        .collect();
    debug!(
        criterion = criterion.kind(),
        before = patients.len(),
        after = filtered.len(),
        "applied filter"
    );
    filtered
}

/// Apply every criterion in order. No criteria returns a copy of the input.
pub fn filter(patients: &PatientMap, criteria: &[Criterion], lookup: &impl TestLookup) -> PatientMap {
    criteria
        .iter()
        .fold(patients.clone(), |current, criterion| apply(&current, criterion, lookup))
}
