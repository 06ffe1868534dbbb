//! Summary statistics for a set of patient records.

pub mod summary;

pub use summary::{Report, Summary, TurnaroundStats, ValueStats, summarize};
