//! Composition of record filters.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};
use medrec_filter::{Criterion, apply, filter};
use medrec_model::{
    Field, Patient, PatientId, PatientMap, Status, TestDefinition, TestRecord, Turnaround,
    parse_timestamp, record_count,
};
use proptest::prelude::*;

fn at(text: &str) -> NaiveDateTime {
    parse_timestamp(text, Field::TestDate).unwrap()
}

fn definition(abbr: &str, lower: f64, upper: f64, turnaround: &str) -> TestDefinition {
    TestDefinition {
        name: abbr.to_string(),
        abbr: abbr.to_string(),
        lower_bound: Some(lower),
        upper_bound: Some(upper),
        unit: "mg/dL".to_string(),
        turnaround: turnaround.parse().unwrap(),
    }
}

fn catalog() -> BTreeMap<String, TestDefinition> {
    [
        definition("GLU", 70.0, 100.0, "00-02-00"),
        definition("LDL", 0.0, 100.0, "00-12-00"),
        definition("HGB", 13.8, 17.2, "01-00-00"),
    ]
    .into_iter()
    .map(|d| (d.abbr.clone(), d))
    .collect()
}

fn record(test: &str, day: i64, value: f64, status: Status) -> TestRecord {
    TestRecord {
        test: test.to_string(),
        test_date: at("2023-05-01 09:00") + TimeDelta::days(day),
        result_value: value,
        unit: "mg/dL".to_string(),
        status,
        result_date: None,
    }
}

fn id(value: u32) -> PatientId {
    PatientId::new(value).unwrap()
}

fn patients() -> PatientMap {
    let mut map = PatientMap::new();
    map.insert(
        id(1_234_567),
        Patient::with_records(
            id(1_234_567),
            vec![
                record("GLU", 0, 85.0, Status::Completed),
                record("LDL", 1, 120.0, Status::Pending),
            ],
        ),
    );
    map.insert(
        id(7_654_321),
        Patient::with_records(
            id(7_654_321),
            vec![
                record("GLU", 2, 110.0, Status::Reviewed),
                record("HGB", 3, 15.0, Status::Completed),
            ],
        ),
    );
    map
}

#[test]
fn no_criteria_returns_a_copy() {
    let input = patients();
    assert_eq!(filter(&input, &[], &catalog()), input);
}

#[test]
fn empty_input_stays_empty() {
    let result = filter(
        &PatientMap::new(),
        &[Criterion::Abnormal, Criterion::Test("GLU".to_string())],
        &catalog(),
    );
    assert!(result.is_empty());
}

#[test]
fn patients_without_matches_are_dropped() {
    let input = patients();
    let result = apply(&input, &Criterion::Test("HGB".to_string()), &catalog());
    assert_eq!(result.len(), 1);
    assert!(result.contains_key(&id(7_654_321)));
    assert_eq!(record_count(&result), 1);
    // Input untouched.
    assert_eq!(record_count(&input), 4);
}

#[test]
fn abnormal_results() {
    let result = apply(&patients(), &Criterion::Abnormal, &catalog());
    let abnormal: Vec<(&str, f64)> = result
        .values()
        .flat_map(|p| p.records.iter().map(|r| (r.test.as_str(), r.result_value)))
        .collect();
    assert_eq!(abnormal, vec![("LDL", 120.0), ("GLU", 110.0)]);
}

#[test]
fn turnaround_range_uses_the_catalog() {
    let criterion = Criterion::TurnaroundRange {
        min: Turnaround::from_parts(0, 2, 0).unwrap(),
        max: Turnaround::from_parts(0, 12, 0).unwrap(),
    };
    let result = apply(&patients(), &criterion, &catalog());
    assert_eq!(record_count(&result), 3);
    assert!(
        result
            .values()
            .flat_map(|p| &p.records)
            .all(|r| r.test != "HGB")
    );
}

#[test]
fn no_matches_is_an_empty_map() {
    let result = apply(&patients(), &Criterion::PatientId(id(1)), &catalog());
    assert!(result.is_empty());
}

fn criterion() -> impl Strategy<Value = Criterion> {
    prop_oneof![
        Just(Criterion::Abnormal),
        prop::sample::select(vec!["GLU", "LDL", "HGB", "XXX"])
            .prop_map(|abbr| Criterion::Test(abbr.to_string())),
        prop::sample::select(vec!["pending", "Completed", "REVIEWED"])
            .prop_map(|status| Criterion::Status(status.to_string())),
        (0i64..4, 0i64..4).prop_map(|(a, b)| Criterion::TestDateRange {
            start: at("2023-05-01 09:00") + TimeDelta::days(a.min(b)),
            end: at("2023-05-01 09:00") + TimeDelta::days(a.max(b)),
        }),
        (0u64..2000, 0u64..2000).prop_map(|(a, b)| Criterion::TurnaroundRange {
            min: Turnaround::from_minutes(a.min(b)),
            max: Turnaround::from_minutes(a.max(b)),
        }),
    ]
}

proptest! {
    #[test]
    fn patient_filter_commutes(
        patient in prop::sample::select(vec![1_234_567u32, 7_654_321, 1]),
        other in criterion(),
    ) {
        let by_patient = Criterion::PatientId(id(patient));
        let input = patients();
        let lookup = catalog();
        prop_assert_eq!(
            filter(&input, &[by_patient.clone(), other.clone()], &lookup),
            filter(&input, &[other, by_patient], &lookup)
        );
    }
}
