use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use tracing::{info, info_span};

use medrec_filter::filter;
use medrec_model::{NewRecord, RecordPatch, TestDefinition, TestPatch, format_value};
use medrec_report::{Summary, summarize};
use medrec_store::{RecordStore, TestCatalog, export_csv_file, import_csv_file};

use crate::cli::{
    AddRecordArgs, AddTestArgs, Command, ExportArgs, FilterArgs, ImportArgs, RecordsCommand,
    ReportArgs, ReportFormatArg, TestsCommand, UpdateRecordArgs, UpdateTestArgs,
};
use crate::logging::redact_value;
use crate::summary::{catalog_table, records_table, report_table};
use crate::types::{CommandOutput, FileDiagnostic};

/// Locations of the two backing files.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub catalog: PathBuf,
    pub records: PathBuf,
}

/// Run one command against the files in `paths`. `now` bounds every date check.
pub fn run(command: &Command, paths: &StorePaths, now: NaiveDateTime) -> Result<CommandOutput> {
    match command {
        Command::Tests { command } => match command {
            TestsCommand::List => run_tests_list(paths),
            TestsCommand::Add(args) => run_tests_add(paths, args),
            TestsCommand::Update(args) => run_tests_update(paths, args),
        },
        Command::Records { command } => match command {
            RecordsCommand::List => run_records_list(paths),
            RecordsCommand::Add(args) => run_records_add(paths, args, now),
            RecordsCommand::Update(args) => run_records_update(paths, args, now),
        },
        Command::Filter(args) => run_filter(paths, args),
        Command::Report(args) => run_report(paths, args),
        Command::Export(args) => run_export(paths, args),
        Command::Import(args) => run_import(paths, args),
    }
}

/// Catalog and records as loaded, plus the diagnostics of both files.
struct Loaded {
    catalog: TestCatalog,
    records: RecordStore,
    diagnostics: Vec<FileDiagnostic>,
}

fn load_catalog(path: &Path) -> Result<(TestCatalog, Vec<FileDiagnostic>)> {
    let parsed = TestCatalog::open(path)
        .with_context(|| format!("load test catalog {}", path.display()))?;
    let diagnostics = FileDiagnostic::collect(path, parsed.diagnostics);
    Ok((parsed.value, diagnostics))
}

fn load(paths: &StorePaths) -> Result<Loaded> {
    let (catalog, mut diagnostics) = load_catalog(&paths.catalog)?;
    let parsed = RecordStore::open(&paths.records, &catalog)
        .with_context(|| format!("load medical records {}", paths.records.display()))?;
    diagnostics.extend(FileDiagnostic::collect(&paths.records, parsed.diagnostics));
    Ok(Loaded {
        catalog,
        records: parsed.value,
        diagnostics,
    })
}

fn run_tests_list(paths: &StorePaths) -> Result<CommandOutput> {
    let (catalog, diagnostics) = load_catalog(&paths.catalog)?;
    let stdout = if catalog.is_empty() {
        "No medical tests defined.".to_string()
    } else {
        catalog_table(catalog.iter()).to_string()
    };
    Ok(CommandOutput::new(stdout).with_diagnostics(diagnostics))
}

fn run_tests_add(paths: &StorePaths, args: &AddTestArgs) -> Result<CommandOutput> {
    let (mut catalog, diagnostics) = load_catalog(&paths.catalog)?;
    let definition = TestDefinition {
        name: args.name.trim().to_string(),
        abbr: args.abbr.trim().to_string(),
        lower_bound: args.lower,
        upper_bound: args.upper,
        unit: args.unit.trim().to_string(),
        turnaround: args.turnaround,
    };
    let name = definition.name.clone();
    catalog
        .add_test(definition)
        .with_context(|| format!("add medical test '{name}'"))?;
    Ok(
        CommandOutput::new(format!("Medical test '{name}' successfully added."))
            .with_diagnostics(diagnostics),
    )
}

fn run_tests_update(paths: &StorePaths, args: &UpdateTestArgs) -> Result<CommandOutput> {
    let patch = TestPatch {
        name: args.name.as_deref().map(|name| name.trim().to_string()),
        lower_bound: args.lower,
        upper_bound: args.upper,
        unit: args.unit.as_deref().map(|unit| unit.trim().to_string()),
        turnaround: args.turnaround,
    };
    if patch.is_empty() {
        bail!("nothing to update: pass at least one of --name, --lower, --upper, --unit, --turnaround");
    }
    let (mut catalog, diagnostics) = load_catalog(&paths.catalog)?;
    let updated = catalog
        .update_test(args.abbr.trim(), &patch)
        .with_context(|| format!("update medical test '{}'", args.abbr))?;
    Ok(
        CommandOutput::new(format!("Medical test updated.\n{updated}"))
            .with_diagnostics(diagnostics),
    )
}

fn run_records_list(paths: &StorePaths) -> Result<CommandOutput> {
    let loaded = load(paths)?;
    let stdout = if loaded.records.is_empty() {
        "No medical records found.".to_string()
    } else {
        records_table(loaded.records.patients(), &loaded.catalog).to_string()
    };
    Ok(CommandOutput::new(stdout).with_diagnostics(loaded.diagnostics))
}

fn run_records_add(
    paths: &StorePaths,
    args: &AddRecordArgs,
    now: NaiveDateTime,
) -> Result<CommandOutput> {
    let Loaded {
        catalog,
        mut records,
        diagnostics,
    } = load(paths)?;
    let patient = args.patient.to_string();
    let span = info_span!("add_record", patient = redact_value(&patient));
    let _guard = span.enter();
    let draft = NewRecord {
        patient_id: args.patient,
        test: args.test.trim().to_string(),
        test_date: args.date,
        result_value: args.value,
        status: args.status,
        result_date: args.result_date,
    };
    records
        .add_record(&draft, &catalog, now)
        .context("add medical record")?;
    info!(value = redact_value(&format_value(args.value)), "record stored");
    Ok(
        CommandOutput::new(format!("Medical record for patient {patient} successfully added."))
            .with_diagnostics(diagnostics),
    )
}

fn run_records_update(
    paths: &StorePaths,
    args: &UpdateRecordArgs,
    now: NaiveDateTime,
) -> Result<CommandOutput> {
    let patch = RecordPatch {
        test: args.test.as_deref().map(|test| test.trim().to_string()),
        test_date: args.date,
        result_value: args.value,
        status: args.status,
        result_date: args.result_date,
    };
    if patch.is_empty() {
        bail!(
            "nothing to update: pass at least one of --test, --date, --value, --status, --result-date"
        );
    }
    let Loaded {
        catalog,
        mut records,
        diagnostics,
    } = load(paths)?;
    let patient = args.patient.to_string();
    let span = info_span!("update_record", patient = redact_value(&patient), number = args.number);
    let _guard = span.enter();
    let updated = records
        .update_record_at(args.patient, args.number - 1, &patch, &catalog, now)
        .with_context(|| format!("update record {} of patient {patient}", args.number))?;
    let status = updated.status.label();
    Ok(CommandOutput::new(format!(
        "Record {} of patient {patient} updated ({}, {status}).",
        args.number, updated.test
    ))
    .with_diagnostics(diagnostics))
}

fn run_filter(paths: &StorePaths, args: &FilterArgs) -> Result<CommandOutput> {
    let loaded = load(paths)?;
    let criteria = args.criteria();
    let matches = filter(loaded.records.patients(), &criteria, &loaded.catalog);
    info!(criteria = criteria.len(), patients = matches.len(), "filtered records");
    let stdout = if matches.is_empty() {
        "No records found matching the selected criteria.".to_string()
    } else {
        records_table(&matches, &loaded.catalog).to_string()
    };
    Ok(CommandOutput::new(stdout).with_diagnostics(loaded.diagnostics))
}

fn run_report(paths: &StorePaths, args: &ReportArgs) -> Result<CommandOutput> {
    let loaded = load(paths)?;
    let matches = filter(
        loaded.records.patients(),
        &args.filter.criteria(),
        &loaded.catalog,
    );
    let summary = summarize(&matches, &loaded.catalog);
    let stdout = match args.format {
        ReportFormatArg::Text => summary.to_string().trim_end().to_string(),
        ReportFormatArg::Table => match &summary {
            Summary::NoRecords => summary.to_string().trim_end().to_string(),
            Summary::Report(report) => report_table(report).to_string(),
        },
        ReportFormatArg::Json => {
            serde_json::to_string_pretty(&summary).context("serialize summary report")?
        }
    };
    Ok(CommandOutput::new(stdout).with_diagnostics(loaded.diagnostics))
}

fn run_export(paths: &StorePaths, args: &ExportArgs) -> Result<CommandOutput> {
    let loaded = load(paths)?;
    let count = export_csv_file(&args.output, loaded.records.patients())
        .with_context(|| format!("export medical records to {}", args.output.display()))?;
    Ok(CommandOutput::new(format!(
        "Medical records exported successfully to {} ({count} records).",
        args.output.display()
    ))
    .with_diagnostics(loaded.diagnostics))
}

fn run_import(paths: &StorePaths, args: &ImportArgs) -> Result<CommandOutput> {
    let Loaded {
        catalog,
        mut records,
        mut diagnostics,
    } = load(paths)?;
    let parsed = import_csv_file(&args.input, &catalog)
        .with_context(|| format!("import medical records from {}", args.input.display()))?;
    diagnostics.extend(FileDiagnostic::collect(&args.input, parsed.diagnostics));
    let count = records
        .import(parsed.value)
        .with_context(|| format!("append imported records to {}", paths.records.display()))?;
    Ok(CommandOutput::new(format!(
        "Imported {count} medical records from {}.",
        args.input.display()
    ))
    .with_diagnostics(diagnostics))
}
