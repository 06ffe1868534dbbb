use std::fmt;

use medrec_model::{PatientMap, TestLookup, Turnaround, format_value, record_count};
use serde::Serialize;
use tracing::debug;

/// Result of [`summarize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Summary {
    /// The input held no records.
    NoRecords,
    Report(Report),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub records: usize,
    pub values: ValueStats,
    /// `None` when no record's test could be resolved in the catalog.
    pub turnaround: Option<TurnaroundStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Turnaround statistics over the configured turnaround of each record's test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnaroundStats {
    pub min: Turnaround,
    pub max: Turnaround,
    /// Whole minutes; the fractional part of the average is dropped.
    pub mean: Turnaround,
    /// Records whose test was found in the catalog.
    pub resolved: usize,
}

/// Min, max and mean of result values and turnaround times.
pub fn summarize(patients: &PatientMap, lookup: &impl TestLookup) -> Summary {
    let records = record_count(patients);
    if records == 0 {
        return Summary::NoRecords;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut turnarounds = Vec::with_capacity(records);
    for record in patients.values().flat_map(|patient| &patient.records) {
        min = min.min(record.result_value);
        max = max.max(record.result_value);
        sum += record.result_value;
        if let Some(definition) = lookup.test(&record.test) {
            turnarounds.push(definition.turnaround);
        }
    }

    let turnaround = turnaround_stats(&turnarounds);
    debug!(records, resolved = turnarounds.len(), "summarized records");
    Summary::Report(Report {
        records,
        values: ValueStats {
            min,
            max,
            mean: sum / records as f64,
        },
        turnaround,
    })
}

fn turnaround_stats(turnarounds: &[Turnaround]) -> Option<TurnaroundStats> {
    let min = turnarounds.iter().min().copied()?;
    let max = turnarounds.iter().max().copied()?;
    // Days are unbounded, so the total can exceed u64 even though the mean cannot.
    let total: u128 = turnarounds
        .iter()
        .map(|turnaround| u128::from(turnaround.total_minutes()))
        .sum();
    let mean = u64::try_from(total / turnarounds.len() as u128).unwrap_or(max.total_minutes());
    let mean = Turnaround::from_minutes(mean);
    Some(TurnaroundStats {
        min,
        max,
        mean,
        resolved: turnarounds.len(),
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::NoRecords => writeln!(f, "No records found for the selected criteria."),
            Summary::Report(report) => report.fmt(f),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary Report for Filtered Records:")?;
        writeln!(f, "-----------------------------------")?;
        writeln!(f, "Test Values:")?;
        writeln!(f, " - Minimum Test Value: {}", format_value(self.values.min))?;
        writeln!(f, " - Maximum Test Value: {}", format_value(self.values.max))?;
        writeln!(f, " - Average Test Value: {:.2}", self.values.mean)?;
        writeln!(f)?;
        writeln!(f, "Turnaround Times:")?;
        match &self.turnaround {
            Some(stats) => {
                writeln!(f, " - Minimum Turnaround Time: {}", stats.min)?;
                writeln!(f, " - Maximum Turnaround Time: {}", stats.max)?;
                writeln!(f, " - Average Turnaround Time: {}", stats.mean)
            }
            None => writeln!(f, " - No catalog entry found for the selected tests"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_turnaround_truncates() {
        let stats = turnaround_stats(&[
            Turnaround::from_minutes(1),
            Turnaround::from_minutes(2),
        ])
        .unwrap();
        assert_eq!(stats.mean.total_minutes(), 1);
        assert_eq!(stats.min.total_minutes(), 1);
        assert_eq!(stats.max.total_minutes(), 2);
    }

    #[test]
    fn huge_turnarounds_do_not_overflow() {
        let largest = Turnaround::from_minutes(u64::MAX);
        let stats = turnaround_stats(&[largest, largest, Turnaround::from_minutes(u64::MAX - 2)])
            .unwrap();
        assert_eq!(stats.max, largest);
        assert_eq!(stats.mean.total_minutes(), u64::MAX - 1);
    }

    #[test]
    fn no_turnarounds_means_no_stats() {
        assert_eq!(turnaround_stats(&[]), None);
    }

    #[test]
    fn empty_input_is_no_records() {
        let lookup: std::collections::BTreeMap<String, medrec_model::TestDefinition> =
            std::collections::BTreeMap::new();
        assert_eq!(summarize(&PatientMap::new(), &lookup), Summary::NoRecords);
    }
}
