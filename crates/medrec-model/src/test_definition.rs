use std::fmt;

use serde::{Deserialize, Serialize};

use crate::turnaround::Turnaround;
use crate::value::format_value;

/// A catalog entry describing one kind of medical test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Display name, e.g. `Glucose`.
    pub name: String,
    /// Unique abbreviation; the key records use to refer to this test.
    pub abbr: String,
    /// Inclusive lower limit of the normal range.
    pub lower_bound: Option<f64>,
    /// Inclusive upper limit of the normal range.
    pub upper_bound: Option<f64>,
    pub unit: String,
    /// Expected delay between the test and its result.
    pub turnaround: Turnaround,
}

impl TestDefinition {
    /// A value is normal when it lies within the inclusive bounds; an absent
    /// bound leaves that side unconstrained.
    pub fn is_result_normal(&self, value: f64) -> bool {
        if let Some(lower) = self.lower_bound {
            if value < lower {
                return false;
            }
        }
        if let Some(upper) = self.upper_bound {
            if value > upper {
                return false;
            }
        }
        true
    }

    /// Return a copy with every field present in `patch` replaced.
    pub fn patched(&self, patch: &TestPatch) -> TestDefinition {
        TestDefinition {
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            abbr: self.abbr.clone(),
            lower_bound: patch.lower_bound.or(self.lower_bound),
            upper_bound: patch.upper_bound.or(self.upper_bound),
            unit: patch.unit.clone().unwrap_or_else(|| self.unit.clone()),
            turnaround: patch.turnaround.unwrap_or(self.turnaround),
        }
    }
}

impl fmt::Display for TestDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): Range: ", self.name, self.abbr)?;
        match (self.lower_bound, self.upper_bound) {
            (Some(lower), Some(upper)) => {
                write!(f, "> {}, < {}", format_value(lower), format_value(upper))?
            }
            (Some(lower), None) => write!(f, "> {}", format_value(lower))?,
            (None, Some(upper)) => write!(f, "< {}", format_value(upper))?,
            (None, None) => f.write_str("-")?,
        }
        write!(
            f,
            "; Unit: {}; Turnaround Time: {}",
            self.unit, self.turnaround
        )
    }
}

/// Field changes for an existing catalog entry. The abbreviation is the
/// identity and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestPatch {
    pub name: Option<String>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub unit: Option<String>,
    pub turnaround: Option<Turnaround>,
}

impl TestPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.lower_bound.is_none()
            && self.upper_bound.is_none()
            && self.unit.is_none()
            && self.turnaround.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn bounds_are_inclusive() {
        let test = glucose();
        assert!(test.is_result_normal(70.0));
        assert!(test.is_result_normal(85.0));
        assert!(test.is_result_normal(100.0));
        assert!(!test.is_result_normal(69.9));
        assert!(!test.is_result_normal(110.0));
    }

    #[test]
    fn absent_bound_is_unconstrained() {
        let mut test = glucose();
        test.upper_bound = None;
        assert!(test.is_result_normal(10_000.0));
        assert!(!test.is_result_normal(1.0));

        test.lower_bound = None;
        test.upper_bound = Some(5.0);
        assert!(test.is_result_normal(0.0));
        assert!(!test.is_result_normal(5.1));
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let test = glucose();
        let patched = test.patched(&TestPatch {
            upper_bound: Some(120.0),
            unit: Some("mmol/L".to_string()),
            ..TestPatch::default()
        });
        assert_eq!(patched.name, "Glucose");
        assert_eq!(patched.abbr, "GLU");
        assert_eq!(patched.lower_bound, Some(70.0));
        assert_eq!(patched.upper_bound, Some(120.0));
        assert_eq!(patched.unit, "mmol/L");
        assert_eq!(patched.turnaround, test.turnaround);
    }

    #[test]
    fn display_lists_range_unit_and_turnaround() {
        assert_eq!(
            glucose().to_string(),
            "Glucose (GLU): Range: > 70.0, < 100.0; Unit: mg/dL; Turnaround Time: 00-02-00"
        );
    }
}
