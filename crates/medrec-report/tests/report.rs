//! Summary report rendering.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use medrec_model::{
    Field, Patient, PatientId, PatientMap, Status, TestDefinition, TestRecord, parse_timestamp,
};
use medrec_report::{Summary, summarize};

fn at(text: &str) -> NaiveDateTime {
    parse_timestamp(text, Field::TestDate).unwrap()
}

fn definition(abbr: &str, upper: f64, turnaround: &str) -> TestDefinition {
    TestDefinition {
        name: abbr.to_string(),
        abbr: abbr.to_string(),
        lower_bound: None,
        upper_bound: Some(upper),
        unit: "mg/dL".to_string(),
        turnaround: turnaround.parse().unwrap(),
    }
}

fn catalog() -> BTreeMap<String, TestDefinition> {
    [
        definition("GLU", 100.0, "00-02-00"),
        definition("LDL", 100.0, "00-12-00"),
    ]
    .into_iter()
    .map(|d| (d.abbr.clone(), d))
    .collect()
}

fn record(test: &str, value: f64) -> TestRecord {
    TestRecord {
        test: test.to_string(),
        test_date: at("2023-05-01 09:00"),
        result_value: value,
        unit: "mg/dL".to_string(),
        status: Status::Pending,
        result_date: None,
    }
}

fn patients() -> PatientMap {
    let a: PatientId = "1234567".parse().unwrap();
    let b: PatientId = "7654321".parse().unwrap();
    let mut map = PatientMap::new();
    map.insert(
        a,
        Patient::with_records(a, vec![record("GLU", 85.0), record("LDL", 120.0)]),
    );
    map.insert(b, Patient::with_records(b, vec![record("GLU", 110.0)]));
    map
}

#[test]
fn report_text() {
    let summary = summarize(&patients(), &catalog());
    let text = summary.to_string();
    insta::assert_snapshot!(text, @r"
    Summary Report for Filtered Records:
    -----------------------------------
    Test Values:
     - Minimum Test Value: 85.0
     - Maximum Test Value: 120.0
     - Average Test Value: 105.00

    Turnaround Times:
     - Minimum Turnaround Time: 00-02-00
     - Maximum Turnaround Time: 00-12-00
     - Average Turnaround Time: 00-05-20
    ");
}

#[test]
fn report_json() {
    let summary = summarize(&patients(), &catalog());
    insta::assert_json_snapshot!(summary, @r#"
    {
      "kind": "report",
      "records": 3,
      "values": {
        "min": 85.0,
        "max": 120.0,
        "mean": 105.0
      },
      "turnaround": {
        "min": "00-02-00",
        "max": "00-12-00",
        "mean": "00-05-20",
        "resolved": 3
      }
    }
    "#);
}

#[test]
fn unknown_tests_have_no_turnaround_stats() {
    let id: PatientId = "1234567".parse().unwrap();
    let mut map = PatientMap::new();
    map.insert(id, Patient::with_records(id, vec![record("XXX", 4.0)]));
    let Summary::Report(report) = summarize(&map, &catalog()) else {
        panic!("expected a report");
    };
    assert_eq!(report.records, 1);
    assert_eq!(report.turnaround, None);
    assert!(report.to_string().contains("No catalog entry found"));
}

#[test]
fn empty_set_is_no_records() {
    let summary = summarize(&PatientMap::new(), &catalog());
    assert_eq!(summary, Summary::NoRecords);
    assert_eq!(
        summary.to_string(),
        "No records found for the selected criteria.\n"
    );
}

#[test]
fn very_long_turnarounds_are_averaged() {
    let slow = definition("SLOW", 1.0, "10000000000000000-00-00");
    let catalog = BTreeMap::from([(slow.abbr.clone(), slow)]);
    let id: PatientId = "1234567".parse().unwrap();
    let mut map = PatientMap::new();
    map.insert(
        id,
        Patient::with_records(id, vec![record("SLOW", 1.0), record("SLOW", 2.0)]),
    );
    let Summary::Report(report) = summarize(&map, &catalog) else {
        panic!("expected a report");
    };
    let stats = report.turnaround.unwrap();
    assert_eq!(stats.mean, stats.max);
    assert_eq!(stats.mean.days(), 10_000_000_000_000_000);
}
