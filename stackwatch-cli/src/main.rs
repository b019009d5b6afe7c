//! `stackwatch`: prints worst-case per-function stack consumption for an ELF executable or
//! shared object (§4.9–§4.11).
//!
//! This binary is the only collaborator that touches a filesystem, spawns a process, or writes to
//! a terminal; `stackwatch-analyzer` itself does none of those things.

mod cli;
mod error;
mod object;
mod process;
mod render;
mod report;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputFormat};
use error::CliError;
use object::Object;
use report::Report;

fn verbosity_filter(cli: &Cli) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::new(level)
}

/// Runs the pipeline end to end and returns the exit code §4.11 assigns to the outcome.
fn run(cli: &Cli) -> Result<i32, CliError> {
    let object = Object::open(&cli.path)?;
    let architecture = match cli.arch {
        Some(architecture) => architecture,
        None => object.detect_architecture(&cli.path)?,
    };

    let symbols = process::read_symbols(&cli.path, &object)?;
    let lines = process::disassemble(&cli.path)?;

    let result = stackwatch_analyzer::analyze(architecture, lines, &symbols);
    let report = Report::from_analysis(architecture, cli.path.display().to_string(), &result);

    match cli.format {
        OutputFormat::Human => render::render_human(&report, cli.threshold, cli.color)?,
        OutputFormat::Json => render::render_json(&report)?,
    }

    if let Some(threshold) = cli.threshold {
        if report.exceeds_threshold(threshold) {
            return Ok(2);
        }
    }
    if report.has_diagnostics() {
        return Ok(1);
    }
    Ok(0)
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(verbosity_filter(&cli))
        .with_target(false)
        .without_time()
        .init();

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "stackwatch failed");
            err.exit_code()
        }
    };

    std::process::exit(exit_code);
}
