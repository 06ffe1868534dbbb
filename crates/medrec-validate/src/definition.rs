//! Catalog entry rules.

use medrec_model::{Field, TestDefinition, ValidationError};

/// Characters that would break the `Name: <name> (<abbr>); Range: ...` line.
const NAME_FORBIDDEN: &[char] = &[';', '(', ')', '\n', '\r'];
const ABBR_FORBIDDEN: &[char] = &[';', ',', ':', '(', ')', ' ', '\t', '\n', '\r'];
const UNIT_FORBIDDEN: &[char] = &[';', ',', '\n', '\r'];

/// A label must be non-empty after trimming and free of `forbidden` characters.
pub fn validate_label(field: Field, text: &str, forbidden: &[char]) -> Result<(), ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "cannot be empty"));
    }
    if let Some(bad) = trimmed.chars().find(|c| forbidden.contains(c)) {
        return Err(ValidationError::new(
            field,
            format!("cannot contain {bad:?}"),
        ));
    }
    Ok(())
}

/// At least one bound must be present, and when both are, lower < upper.
pub fn validate_range(lower: Option<f64>, upper: Option<f64>) -> Result<(), ValidationError> {
    for (bound, field) in [(lower, Field::LowerBound), (upper, Field::UpperBound)] {
        if bound.is_some_and(|value| !value.is_finite()) {
            return Err(ValidationError::new(field, "must be a finite number"));
        }
    }
    match (lower, upper) {
        (None, None) => Err(ValidationError::new(
            Field::Range,
            "lower and upper range cannot both be empty",
        )),
        (Some(lower), Some(upper)) if lower >= upper => Err(ValidationError::new(
            Field::Range,
            "lower range must be less than upper range",
        )),
        _ => Ok(()),
    }
}

/// Full check of a catalog entry before it is added or rewritten.
pub fn validate_definition(definition: &TestDefinition) -> Result<(), ValidationError> {
    validate_label(Field::Name, &definition.name, NAME_FORBIDDEN)?;
    validate_label(Field::Abbreviation, &definition.abbr, ABBR_FORBIDDEN)?;
    validate_range(definition.lower_bound, definition.upper_bound)?;
    validate_label(Field::Unit, &definition.unit, UNIT_FORBIDDEN)?;
    Ok(())
}
