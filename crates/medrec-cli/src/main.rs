//! Medical record manager CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use medrec_cli::cli::{Cli, LogFormatArg, LogLevelArg};
use medrec_cli::commands::{StorePaths, run};
use medrec_cli::logging::{LogConfig, LogFormat, init_logging};
use medrec_store::StoreError;
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let paths = StorePaths {
        catalog: cli.catalog.clone(),
        records: cli.records.clone(),
    };
    let now = chrono::Local::now().naive_local();
    let exit_code = match run(&cli.command, &paths, now) {
        Ok(output) => {
            for notice in &output.diagnostics {
                eprintln!("{notice}");
            }
            if !output.diagnostics.is_empty() {
                eprintln!(
                    "{} line(s) skipped: {} warning(s), {} error(s)",
                    output.diagnostics.len(),
                    output.warning_count(),
                    output.error_count()
                );
            }
            println!("{}", output.stdout);
            0
        }
        Err(error) => {
            tracing::error!("command failed");
            eprintln!("error: {error:#}");
            if let Some(hint) = error
                .downcast_ref::<StoreError>()
                .and_then(StoreError::suggestion)
            {
                eprintln!("hint: {hint}");
            }
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
