//! Rendering (§4.10): turns a finished [`Report`] into either a column-aligned, optionally
//! colorized human table or a `serde_json`-serialized document.
//!
//! Neither the analyzer core nor [`Report`] itself know how to print; this module is the only
//! place in the workspace that imports `termcolor`.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::ColorMode;
use crate::error::CliError;
use crate::report::{FunctionSummary, Report};

impl From<ColorMode> for ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

/// Renders `report` as a column-aligned table, sorted by `total_stack` descending with address as
/// a stable tie-break (§4.6 "Determinism"). Rows whose bound is a lower bound are prefixed with
/// `≥` and colored yellow; rows whose `total_stack` meets or exceeds `threshold` are colored red.
/// A trailing summary line reports per-kind diagnostic counts.
pub fn render_human(report: &Report, threshold: Option<u64>, color: ColorMode) -> Result<(), CliError> {
    let mut stream = StandardStream::stdout(color.into());
    render_human_to(&mut stream, report, threshold)
}

fn render_human_to(
    stream: &mut dyn WriteColor,
    report: &Report,
    threshold: Option<u64>,
) -> Result<(), CliError> {
    let mut rows: Vec<&FunctionSummary> = report.functions.iter().collect();
    rows.sort_by(|a, b| b.total_stack.cmp(&a.total_stack).then(a.address.cmp(&b.address)));

    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);

    writeln!(
        stream,
        "{:<name_width$}  {:>10}  {:>10}  {:>10}",
        "NAME",
        "ADDRESS",
        "OWN",
        "TOTAL",
        name_width = name_width
    )
    .map_err(CliError::Io)?;

    for row in rows {
        let exceeds = threshold.map_or(false, |t| row.total_stack >= t);
        let mut spec = ColorSpec::new();
        if exceeds {
            spec.set_fg(Some(Color::Red)).set_bold(true);
        } else if row.total_is_lower_bound {
            spec.set_fg(Some(Color::Yellow));
        }
        stream.set_color(&spec).map_err(CliError::Io)?;

        let marker = if row.total_is_lower_bound { "\u{2265}" } else { " " };
        writeln!(
            stream,
            "{:<name_width$}  {:>#10x}  {:>10}  {:>9}{}",
            row.name,
            row.address,
            row.own_stack,
            row.total_stack,
            marker,
            name_width = name_width
        )
        .map_err(CliError::Io)?;

        stream.reset().map_err(CliError::Io)?;
    }

    writeln!(stream).map_err(CliError::Io)?;
    writeln!(
        stream,
        "{} function(s), {} diagnostic(s)",
        report.functions.len(),
        report.diagnostics.len()
    )
    .map_err(CliError::Io)?;

    for diagnostic in &report.diagnostics {
        writeln!(stream, "  {diagnostic}").map_err(CliError::Io)?;
    }

    Ok(())
}

/// Serializes `report` as JSON to stdout.
pub fn render_json(report: &Report) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, report).map_err(CliError::Json)?;
    writeln!(handle).map_err(CliError::Io)?;
    Ok(())
}
