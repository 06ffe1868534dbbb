//! Integration tests for the validators.

use medrec_model::{Field, TestDefinition, parse_timestamp};
use medrec_validate::{
    is_valid_float, is_valid_turnaround, parse_result_value, validate_definition,
    validate_result_date_on_create,
};
use proptest::prelude::*;

#[test]
fn definition_with_inverted_range_names_the_range() {
    let definition = TestDefinition {
        name: "Glucose".to_string(),
        abbr: "GLU".to_string(),
        lower_bound: Some(100.0),
        upper_bound: Some(70.0),
        unit: "mg/dL".to_string(),
        turnaround: "00-02-00".parse().unwrap(),
    };
    let error = validate_definition(&definition).unwrap_err();
    assert_eq!(error.field, Field::Range);
    assert!(error.reason.contains("lower range must be less than upper range"));
}

#[test]
fn result_window_uses_days_hours_and_minutes() {
    let test_date = parse_timestamp("2023-05-01 09:00", Field::TestDate).unwrap();
    let now = parse_timestamp("2023-06-01 00:00", Field::TestDate).unwrap();
    let turnaround = "02-03-15".parse().unwrap();
    let on_time = parse_timestamp("2023-05-03 12:15", Field::ResultDate).unwrap();
    let early = parse_timestamp("2023-05-03 12:14", Field::ResultDate).unwrap();
    assert!(validate_result_date_on_create(on_time, test_date, turnaround, now).is_ok());
    assert!(validate_result_date_on_create(early, test_date, turnaround, now).is_err());
}

proptest! {
    #[test]
    fn digit_strings_with_one_point_are_valid(int in "[0-9]{1,6}", frac in "[0-9]{0,4}") {
        let text = format!("{int}.{frac}");
        prop_assert!(is_valid_float(&text));
        prop_assert!(parse_result_value(&text).is_ok());
    }

    #[test]
    fn signed_values_are_never_valid(value in 0.001f64..1e6) {
        let negative = format!("-{value}");
        prop_assert!(!is_valid_float(&negative));
    }

    #[test]
    fn turnaround_hours_and_minutes_are_bounded(days in 0u32..1000, hours in 0u32..48, minutes in 0u32..120) {
        let text = format!("{days:02}-{hours:02}-{minutes:02}");
        prop_assert_eq!(is_valid_turnaround(&text), hours < 24 && minutes < 60);
    }
}
