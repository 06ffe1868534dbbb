//! File-backed stores for the test catalog and patient records.
//!
//! Both stores load their whole file into memory, append single entries and
//! rewrite the file on edits. A store only changes in memory after the file
//! write it depends on succeeded.

pub mod backing;
pub mod catalog;
pub mod error;
pub mod fields;
pub mod interchange;
pub mod records;

pub use backing::BackingFile;
pub use catalog::{CatalogMap, TestCatalog, parse_catalog, serialize_catalog, serialize_definition};
pub use error::{NotFound, Result, StoreError};
pub use fields::LineError;
pub use interchange::{
    CSV_HEADER, CsvRow, export_csv_file, export_rows, import_csv, import_csv_file,
    parse_csv_line, write_csv,
};
pub use records::{
    RecordStore, parse_record_line, parse_records, serialize_record_line, serialize_records,
};
