//! Record filters.
//!
//! Each [`Criterion`] keeps the records that satisfy it and drops patients
//! left without records. Criteria compose as a left-to-right intersection and
//! never mutate their input.

pub mod criterion;

pub use criterion::{Criterion, apply, filter};
