//! Validators shared by every mutation of the catalog and the record store.
//!
//! All functions are pure: anything time dependent takes `now` as an argument.
//!
//! - [`format`]: text shape predicates (`is_valid_float`, `is_valid_date`, ...)
//! - [`definition`]: catalog entry rules (labels, normal range)
//! - [`record`]: record rules (date windows, result date requirements)

pub mod definition;
pub mod format;
pub mod record;

pub use definition::{validate_definition, validate_label, validate_range};
pub use format::{
    is_valid_date, is_valid_float, is_valid_patient_id, is_valid_turnaround, parse_bound,
    parse_result_value,
};
pub use record::{
    earliest_test_date, validate_new_record, validate_record_edit, validate_result_date_on_create,
    validate_result_date_on_edit, validate_result_value, validate_test_date,
};
