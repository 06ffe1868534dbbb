//! Turnaround time: the expected delay between ordering a test and its result.
//!
//! Held as a whole number of minutes; the `DD-hh-mm` form only exists at the
//! text boundaries (parsing and `Display`).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Field, ValidationError};

const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;

/// `DD-hh-mm` where each component is one or more ASCII digits.
static TURNAROUND_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)-([0-9]+)-([0-9]+)$").expect("Invalid turnaround regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Turnaround {
    minutes: u64,
}

impl Turnaround {
    pub const ZERO: Turnaround = Turnaround { minutes: 0 };

    pub fn from_minutes(minutes: u64) -> Self {
        Self { minutes }
    }

    /// Build from components; hours must be below 24 and minutes below 60.
    pub fn from_parts(days: u64, hours: u64, minutes: u64) -> Result<Self, ValidationError> {
        if hours >= 24 {
            return Err(ValidationError::new(
                Field::Turnaround,
                format!("hours must be between 0 and 23, got {hours}"),
            ));
        }
        if minutes >= 60 {
            return Err(ValidationError::new(
                Field::Turnaround,
                format!("minutes must be between 0 and 59, got {minutes}"),
            ));
        }
        days.checked_mul(MINUTES_PER_DAY)
            .and_then(|total| total.checked_add(hours * MINUTES_PER_HOUR + minutes))
            .map(Self::from_minutes)
            .ok_or_else(|| ValidationError::new(Field::Turnaround, "number of days is too large"))
    }

    pub fn total_minutes(&self) -> u64 {
        self.minutes
    }

    pub fn days(&self) -> u64 {
        self.minutes / MINUTES_PER_DAY
    }

    pub fn hours(&self) -> u64 {
        (self.minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR
    }

    pub fn minutes(&self) -> u64 {
        self.minutes % MINUTES_PER_HOUR
    }

    /// Chrono duration for date arithmetic, `None` when it does not fit.
    pub fn as_time_delta(&self) -> Option<TimeDelta> {
        i64::try_from(self.minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
    }
}

impl FromStr for Turnaround {
    type Err = ValidationError;

    /// Parse `DD-hh-mm`. Every component must be plain digits; days are unbounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let captures = TURNAROUND_REGEX.captures(trimmed).ok_or_else(|| {
            ValidationError::new(
                Field::Turnaround,
                format!("'{trimmed}' must use the format DD-hh-mm with only numbers"),
            )
        })?;
        let component = |idx: usize| -> Result<u64, ValidationError> {
            captures[idx]
                .parse()
                .map_err(|_| ValidationError::new(Field::Turnaround, "component is too large"))
        };
        Self::from_parts(component(1)?, component(2)?, component(3)?)
    }
}

impl TryFrom<String> for Turnaround {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Turnaround> for String {
    fn from(value: Turnaround) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Turnaround {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:02}",
            self.days(),
            self.hours(),
            self.minutes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalises() {
        let t: Turnaround = "01-02-03".parse().unwrap();
        assert_eq!(t.total_minutes(), 24 * 60 + 2 * 60 + 3);
        assert_eq!(t.to_string(), "01-02-03");

        let short: Turnaround = "1-2-3".parse().unwrap();
        assert_eq!(short, t);
        assert_eq!(short.to_string(), "01-02-03");
    }

    #[test]
    fn days_are_unbounded() {
        let t: Turnaround = "120-00-30".parse().unwrap();
        assert_eq!(t.days(), 120);
        assert_eq!(t.to_string(), "120-00-30");
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!("00-24-00".parse::<Turnaround>().is_err());
        assert!("00-00-60".parse::<Turnaround>().is_err());
        assert!("00-23-59".parse::<Turnaround>().is_ok());
    }

    #[test]
    fn rejects_bad_shapes() {
        for input in [
            "",
            "00-02",
            "00-02-00-00",
            "0a-02-00",
            "00--00",
            "-1-02-00",
            "00:02:00",
            "٠٠-02-00",
            "+1-02-00",
        ] {
            assert!(input.parse::<Turnaround>().is_err(), "{input} should fail");
        }
    }

    #[test]
    fn converts_to_time_delta() {
        let t: Turnaround = "00-02-00".parse().unwrap();
        assert_eq!(t.as_time_delta(), TimeDelta::try_hours(2));
    }
}
