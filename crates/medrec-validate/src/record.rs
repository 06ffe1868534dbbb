//! Record rules for creation and in-place edits.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use medrec_model::{
    Field, NewRecord, RecordPatch, Status, TestDefinition, TestRecord, Turnaround,
    ValidationError, format_timestamp,
};

/// Test dates before this instant are rejected.
pub fn earliest_test_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
}

/// Test date must lie within `[2000-01-01 00:00, now]`.
pub fn validate_test_date(test_date: NaiveDateTime, now: NaiveDateTime) -> Result<(), ValidationError> {
    if test_date < earliest_test_date() || test_date > now {
        return Err(ValidationError::new(
            Field::TestDate,
            format!(
                "{} must be between {} and now",
                format_timestamp(&test_date),
                format_timestamp(&earliest_test_date())
            ),
        ));
    }
    Ok(())
}

/// Result values are finite and non-negative.
pub fn validate_result_value(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(
            Field::ResultValue,
            "must be a non-negative number",
        ));
    }
    Ok(())
}

/// At creation a completed record's result date must lie within
/// `[test_date + turnaround, now]`.
pub fn validate_result_date_on_create(
    result_date: NaiveDateTime,
    test_date: NaiveDateTime,
    turnaround: Turnaround,
    now: NaiveDateTime,
) -> Result<(), ValidationError> {
    let earliest = turnaround
        .as_time_delta()
        .and_then(|delta| test_date.checked_add_signed(delta))
        .ok_or_else(|| {
            ValidationError::new(Field::ResultDate, "turnaround time is too large to apply")
        })?;
    if result_date < earliest || result_date > now {
        return Err(ValidationError::new(
            Field::ResultDate,
            format!(
                "{} must be between {} and now",
                format_timestamp(&result_date),
                format_timestamp(&earliest)
            ),
        ));
    }
    Ok(())
}

/// After an edit the result date only has to follow the test date.
pub fn validate_result_date_on_edit(
    result_date: NaiveDateTime,
    test_date: NaiveDateTime,
) -> Result<(), ValidationError> {
    if result_date < test_date {
        return Err(ValidationError::new(
            Field::ResultDate,
            format!(
                "{} must not be before the test date {}",
                format_timestamp(&result_date),
                format_timestamp(&test_date)
            ),
        ));
    }
    Ok(())
}

/// Validate a new record against its (already resolved) test definition and
/// build the stored record, snapshotting the test's unit.
pub fn validate_new_record(
    draft: &NewRecord,
    definition: &TestDefinition,
    now: NaiveDateTime,
) -> Result<TestRecord, ValidationError> {
    validate_test_date(draft.test_date, now)?;
    validate_result_value(draft.result_value)?;
    match (draft.status, draft.result_date) {
        (Status::Completed, Some(result_date)) => validate_result_date_on_create(
            result_date,
            draft.test_date,
            definition.turnaround,
            now,
        )?,
        (Status::Completed, None) => {
            return Err(ValidationError::new(
                Field::ResultDate,
                "is required when the status is completed",
            ));
        }
        (_, Some(_)) => {
            return Err(ValidationError::new(
                Field::ResultDate,
                "can only be set when the status is completed",
            ));
        }
        (_, None) => {}
    }
    Ok(TestRecord {
        test: definition.abbr.clone(),
        test_date: draft.test_date,
        result_value: draft.result_value,
        unit: definition.unit.clone(),
        status: draft.status,
        result_date: draft.result_date,
    })
}

/// Validate the outcome of applying `patch` to a record.
///
/// Fields carried over unchanged are not re-checked against the creation
/// windows. The completed/result-date pairing is only checked when the patch
/// touches status or result date, so older completed lines without a result
/// date stay editable.
pub fn validate_record_edit(
    patch: &RecordPatch,
    updated: &TestRecord,
    now: NaiveDateTime,
) -> Result<(), ValidationError> {
    if patch.test_date.is_some() {
        validate_test_date(updated.test_date, now)?;
    }
    if patch.result_value.is_some() {
        validate_result_value(updated.result_value)?;
    }
    if patch.status.is_some() || patch.result_date.is_some() {
        match (updated.status, updated.result_date) {
            (Status::Completed, None) => {
                return Err(ValidationError::new(
                    Field::ResultDate,
                    "is required when the status is completed",
                ));
            }
            (Status::Pending | Status::Reviewed, Some(_)) => {
                return Err(ValidationError::new(
                    Field::ResultDate,
                    "can only be set when the status is completed",
                ));
            }
            _ => {}
        }
    }
    if let Some(result_date) = updated.result_date {
        validate_result_date_on_edit(result_date, updated.test_date)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrec_model::{PatientId, parse_timestamp};

    fn at(text: &str) -> NaiveDateTime {
        parse_timestamp(text, Field::TestDate).unwrap()
    }

    fn glucose() -> TestDefinition {
        TestDefinition {
            name: "Glucose".to_string(),
            abbr: "GLU".to_string(),
            lower_bound: Some(70.0),
            upper_bound: Some(100.0),
            unit: "mg/dL".to_string(),
            turnaround: "00-02-00".parse().unwrap(),
        }
    }

    fn draft(status: Status, result_date: Option<&str>) -> NewRecord {
        NewRecord {
            patient_id: PatientId::new(1_234_567).unwrap(),
            test: "GLU".to_string(),
            test_date: at("2023-05-01 09:00"),
            result_value: 85.0,
            status,
            result_date: result_date.map(at),
        }
    }

    #[test]
    fn test_date_window() {
        let now = at("2024-01-01 00:00");
        assert!(validate_test_date(at("2000-01-01 00:00"), now).is_ok());
        assert!(validate_test_date(now, now).is_ok());
        assert!(validate_test_date(at("1999-12-31 23:59"), now).is_err());
        assert!(validate_test_date(at("2024-01-01 00:01"), now).is_err());
    }

    #[test]
    fn completed_record_needs_result_after_turnaround() {
        let now = at("2024-01-01 00:00");
        let record = validate_new_record(
            &draft(Status::Completed, Some("2023-05-01 11:00")),
            &glucose(),
            now,
        )
        .unwrap();
        assert_eq!(record.unit, "mg/dL");
        assert_eq!(record.result_date, Some(at("2023-05-01 11:00")));

        let error = validate_new_record(
            &draft(Status::Completed, Some("2023-05-01 10:59")),
            &glucose(),
            now,
        )
        .unwrap_err();
        assert_eq!(error.field, Field::ResultDate);

        let error =
            validate_new_record(&draft(Status::Completed, None), &glucose(), now).unwrap_err();
        assert_eq!(error.field, Field::ResultDate);
    }

    #[test]
    fn result_date_in_the_future_is_rejected() {
        let now = at("2023-05-01 10:30");
        let error = validate_new_record(
            &draft(Status::Completed, Some("2023-05-01 11:00")),
            &glucose(),
            now,
        )
        .unwrap_err();
        assert_eq!(error.field, Field::ResultDate);
    }

    #[test]
    fn pending_record_cannot_carry_result_date() {
        let now = at("2024-01-01 00:00");
        assert!(validate_new_record(&draft(Status::Pending, None), &glucose(), now).is_ok());
        assert!(
            validate_new_record(
                &draft(Status::Pending, Some("2023-05-01 11:00")),
                &glucose(),
                now
            )
            .is_err()
        );
    }

    #[test]
    fn edit_keeps_result_after_test_date() {
        let now = at("2024-01-01 00:00");
        let record = TestRecord {
            test: "GLU".to_string(),
            test_date: at("2023-05-01 09:00"),
            result_value: 85.0,
            unit: "mg/dL".to_string(),
            status: Status::Completed,
            result_date: Some(at("2023-05-01 09:30")),
        };
        // On edit only the ordering matters, not the turnaround window.
        assert!(validate_record_edit(&RecordPatch::default(), &record, now).is_ok());

        let moved = TestRecord {
            test_date: at("2023-05-02 09:00"),
            ..record.clone()
        };
        let patch = RecordPatch {
            test_date: Some(moved.test_date),
            ..RecordPatch::default()
        };
        assert_eq!(
            validate_record_edit(&patch, &moved, now).unwrap_err().field,
            Field::ResultDate
        );
    }

    #[test]
    fn edit_to_completed_requires_result_date() {
        let now = at("2024-01-01 00:00");
        let record = TestRecord {
            test: "GLU".to_string(),
            test_date: at("2023-05-01 09:00"),
            result_value: 85.0,
            unit: "mg/dL".to_string(),
            status: Status::Completed,
            result_date: None,
        };
        let patch = RecordPatch {
            status: Some(Status::Completed),
            ..RecordPatch::default()
        };
        assert!(validate_record_edit(&patch, &record, now).is_err());
    }

    #[test]
    fn completed_without_result_date_accepts_value_edit() {
        let now = at("2024-01-01 00:00");
        let legacy = TestRecord {
            test: "GLU".to_string(),
            test_date: at("2023-05-01 09:00"),
            result_value: 90.0,
            unit: "mg/dL".to_string(),
            status: Status::Completed,
            result_date: None,
        };
        let patch = RecordPatch {
            result_value: Some(90.0),
            ..RecordPatch::default()
        };
        assert!(validate_record_edit(&patch, &legacy, now).is_ok());
    }

    #[test]
    fn result_date_on_pending_edit_is_rejected() {
        let now = at("2024-01-01 00:00");
        let updated = TestRecord {
            test: "GLU".to_string(),
            test_date: at("2023-05-01 09:00"),
            result_value: 85.0,
            unit: "mg/dL".to_string(),
            status: Status::Pending,
            result_date: Some(at("2023-05-01 11:00")),
        };
        let patch = RecordPatch {
            result_date: updated.result_date,
            ..RecordPatch::default()
        };
        assert_eq!(
            validate_record_edit(&patch, &updated, now).unwrap_err().field,
            Field::ResultDate
        );
    }
}
