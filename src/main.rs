mod cli;

use std::process::ExitCode;

use clap::Parser;
use pgwire_smoke::{RunReport, run};

use crate::cli::args::{Args, OutputFormat, SmokeConfig};
use crate::cli::logging::LogWriter;

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match SmokeConfig::from_args(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    let writer = match LogWriter::new(config.log.clone()) {
        Ok(writer) => writer,
        Err(err) => {
            eprintln!("failed to open log file: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_ansi(!writer.has_file())
        .with_writer(writer)
        .with_target(false)
        .with_max_level(config.log_level)
        .init();

    let config_json = serde_json::to_string_pretty(&config).unwrap_or_else(|_| "{}".to_string());
    tracing::info!("config: {}", config_json);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start the runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&config.run)) {
        Ok(report) => {
            if print_report(&report, config.format) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(failure) => {
            print_report(&failure.report, config.format);
            eprintln!("error: {}", failure.error);
            ExitCode::FAILURE
        }
    }
}

/// Print the steps a run completed. Returns false if the report could not be rendered.
fn print_report(report: &RunReport, format: OutputFormat) -> bool {
    match format {
        OutputFormat::Text => {
            for step in report.echoed() {
                println!("{step}");
            }
            true
        }
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => {
                println!("{json}");
                true
            }
            Err(err) => {
                eprintln!("failed to serialize the report: {err}");
                false
            }
        },
    }
}
