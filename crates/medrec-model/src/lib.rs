//! Data model for the medical test catalog and patient test records.
//!
//! Everything in this crate is plain data plus the parsing and formatting of
//! the scalar values that appear in the text formats (`DD-hh-mm` turnaround
//! times, `YYYY-MM-DD HH:MM` timestamps, seven digit patient identifiers).

pub mod diagnostic;
pub mod error;
pub mod ids;
pub mod lookup;
pub mod record;
pub mod status;
pub mod test_definition;
pub mod timestamp;
pub mod turnaround;
pub mod value;

pub use diagnostic::{Diagnostic, Parsed, Severity};
pub use error::{Field, ValidationError};
pub use ids::PatientId;
pub use lookup::TestLookup;
pub use record::{NewRecord, Patient, PatientMap, RecordPatch, TestRecord, record_count};
pub use status::Status;
pub use test_definition::{TestDefinition, TestPatch};
pub use timestamp::{TIMESTAMP_FORMAT, format_timestamp, parse_timestamp};
pub use turnaround::Turnaround;
pub use value::format_value;
