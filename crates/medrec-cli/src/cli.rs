//! CLI argument definitions for the medical record manager.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use medrec_filter::Criterion;
use medrec_model::{Field, PatientId, Status, Turnaround, ValidationError, parse_timestamp};
use medrec_validate::{earliest_test_date, parse_bound, parse_result_value};

#[derive(Parser)]
#[command(
    name = "medrec",
    version,
    about = "Medical test catalog and patient record manager",
    long_about = "Manage a catalog of medical tests and the test records of patients.\n\n\
                  The catalog and the records are plain text files that are read on\n\
                  every run; edits are written back immediately."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Test catalog file.
    #[arg(
        long = "catalog",
        value_name = "PATH",
        default_value = "medicalTest.txt",
        global = true
    )]
    pub catalog: PathBuf,

    /// Patient record file.
    #[arg(
        long = "records",
        value_name = "PATH",
        default_value = "medicalRecord.txt",
        global = true
    )]
    pub records: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include patient identifiers and result values in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage the test catalog.
    Tests {
        #[command(subcommand)]
        command: TestsCommand,
    },

    /// Manage patient records.
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },

    /// Show the records matching every given criterion.
    Filter(FilterArgs),

    /// Summarize the records matching every given criterion.
    Report(ReportArgs),

    /// Export all records to CSV.
    Export(ExportArgs),

    /// Import records from CSV and append them to the record file.
    Import(ImportArgs),
}

#[derive(Subcommand)]
pub enum TestsCommand {
    /// Print all medical tests.
    List,
    /// Add a new medical test.
    Add(AddTestArgs),
    /// Update an existing medical test.
    Update(UpdateTestArgs),
}

#[derive(Subcommand)]
pub enum RecordsCommand {
    /// Print all medical records.
    List,
    /// Add a new record for a patient.
    Add(AddRecordArgs),
    /// Update one record of a patient.
    Update(UpdateRecordArgs),
}

#[derive(Args)]
pub struct AddTestArgs {
    /// Test name, e.g. "Glucose".
    #[arg(long = "name")]
    pub name: String,

    /// Unique abbreviation, e.g. "GLU".
    #[arg(long = "abbr")]
    pub abbr: String,

    /// Lower limit of the normal range.
    #[arg(long = "lower", value_parser = lower_bound)]
    pub lower: Option<f64>,

    /// Upper limit of the normal range.
    #[arg(long = "upper", value_parser = upper_bound)]
    pub upper: Option<f64>,

    /// Unit of the result values, e.g. "mg/dL".
    #[arg(long = "unit")]
    pub unit: String,

    /// Expected turnaround time as DD-hh-mm.
    #[arg(long = "turnaround", value_name = "DD-hh-mm")]
    pub turnaround: Turnaround,
}

#[derive(Args)]
pub struct UpdateTestArgs {
    /// Abbreviation of the test to update.
    #[arg(value_name = "ABBR")]
    pub abbr: String,

    #[arg(long = "name")]
    pub name: Option<String>,

    #[arg(long = "lower", value_parser = lower_bound)]
    pub lower: Option<f64>,

    #[arg(long = "upper", value_parser = upper_bound)]
    pub upper: Option<f64>,

    #[arg(long = "unit")]
    pub unit: Option<String>,

    #[arg(long = "turnaround", value_name = "DD-hh-mm")]
    pub turnaround: Option<Turnaround>,
}

#[derive(Args)]
pub struct AddRecordArgs {
    /// Seven digit patient identifier.
    #[arg(long = "patient", value_name = "ID")]
    pub patient: PatientId,

    /// Abbreviation of the test.
    #[arg(long = "test", value_name = "ABBR")]
    pub test: String,

    /// Test date as "YYYY-MM-DD HH:MM".
    #[arg(long = "date", value_name = "DATE", value_parser = test_date)]
    pub date: NaiveDateTime,

    /// Result value (non-negative decimal).
    #[arg(long = "value", value_parser = result_value)]
    pub value: f64,

    /// pending, completed or reviewed.
    #[arg(long = "status")]
    pub status: Status,

    /// Result date as "YYYY-MM-DD HH:MM"; required for completed records.
    #[arg(long = "result-date", value_name = "DATE", value_parser = result_date)]
    pub result_date: Option<NaiveDateTime>,
}

#[derive(Args)]
pub struct UpdateRecordArgs {
    /// Seven digit patient identifier.
    #[arg(value_name = "PATIENT")]
    pub patient: PatientId,

    /// Record number as shown by `records list` (starting at 1).
    #[arg(value_name = "N", value_parser = record_number)]
    pub number: usize,

    #[arg(long = "test", value_name = "ABBR")]
    pub test: Option<String>,

    #[arg(long = "date", value_name = "DATE", value_parser = test_date)]
    pub date: Option<NaiveDateTime>,

    #[arg(long = "value", value_parser = result_value)]
    pub value: Option<f64>,

    #[arg(long = "status")]
    pub status: Option<Status>,

    #[arg(long = "result-date", value_name = "DATE", value_parser = result_date)]
    pub result_date: Option<NaiveDateTime>,
}

/// Record criteria; every criterion given must hold.
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Only this patient.
    #[arg(long = "patient", value_name = "ID")]
    pub patient: Option<PatientId>,

    /// Only this test abbreviation.
    #[arg(long = "test", value_name = "ABBR")]
    pub test: Option<String>,

    /// Only results outside the normal range.
    #[arg(long = "abnormal")]
    pub abnormal: bool,

    /// Test date on or after this instant.
    #[arg(long = "from", value_name = "DATE", value_parser = test_date)]
    pub from: Option<NaiveDateTime>,

    /// Test date on or before this instant.
    #[arg(long = "to", value_name = "DATE", value_parser = test_date)]
    pub to: Option<NaiveDateTime>,

    /// Only this status (case-insensitive).
    #[arg(long = "status")]
    pub status: Option<String>,

    /// Turnaround time of the test at least this long.
    #[arg(long = "min-turnaround", value_name = "DD-hh-mm")]
    pub min_turnaround: Option<Turnaround>,

    /// Turnaround time of the test at most this long.
    #[arg(long = "max-turnaround", value_name = "DD-hh-mm")]
    pub max_turnaround: Option<Turnaround>,
}

impl FilterArgs {
    /// Criteria in application order. An open end of a range is unbounded.
    pub fn criteria(&self) -> Vec<Criterion> {
        let mut criteria = Vec::new();
        if let Some(patient) = self.patient {
            criteria.push(Criterion::PatientId(patient));
        }
        if let Some(test) = &self.test {
            criteria.push(Criterion::Test(test.trim().to_string()));
        }
        if self.abnormal {
            criteria.push(Criterion::Abnormal);
        }
        if self.from.is_some() || self.to.is_some() {
            criteria.push(Criterion::TestDateRange {
                start: self.from.unwrap_or_else(earliest_test_date),
                end: self.to.unwrap_or(NaiveDateTime::MAX),
            });
        }
        if let Some(status) = &self.status {
            criteria.push(Criterion::Status(status.clone()));
        }
        if self.min_turnaround.is_some() || self.max_turnaround.is_some() {
            criteria.push(Criterion::TurnaroundRange {
                min: self.min_turnaround.unwrap_or(Turnaround::ZERO),
                max: self
                    .max_turnaround
                    .unwrap_or(Turnaround::from_minutes(u64::MAX)),
            });
        }
        criteria
    }
}

#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: ReportFormatArg,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Destination CSV file.
    #[arg(long = "output", value_name = "PATH", default_value = "medical_records.csv")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Source CSV file.
    #[arg(long = "input", value_name = "PATH", default_value = "medical_records.csv")]
    pub input: PathBuf,
}

/// Report output choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    /// Plain text summary block.
    Text,
    /// Statistics table.
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn test_date(text: &str) -> Result<NaiveDateTime, ValidationError> {
    parse_timestamp(text, Field::TestDate)
}

fn result_date(text: &str) -> Result<NaiveDateTime, ValidationError> {
    parse_timestamp(text, Field::ResultDate)
}

fn result_value(text: &str) -> Result<f64, ValidationError> {
    parse_result_value(text)
}

fn lower_bound(text: &str) -> Result<f64, ValidationError> {
    required_bound(text, Field::LowerBound)
}

fn upper_bound(text: &str) -> Result<f64, ValidationError> {
    required_bound(text, Field::UpperBound)
}

fn required_bound(text: &str, field: Field) -> Result<f64, ValidationError> {
    parse_bound(text, field)?.ok_or_else(|| ValidationError::new(field, "cannot be empty"))
}

fn record_number(text: &str) -> Result<usize, String> {
    match text.trim().parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number),
        _ => Err(format!("'{text}' is not a record number (1, 2, ...)")),
    }
}
