//! Argument parsing (§4.9).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stackwatch_common::Architecture;

/// Computes worst-case stack consumption for every function in an ELF object.
#[derive(Debug, Parser)]
#[command(name = "stackwatch", version, about)]
pub struct Cli {
    /// Path to the ELF executable or shared object to analyze.
    pub path: PathBuf,

    /// Override the architecture instead of detecting it from the object file.
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<Architecture>,

    /// Exit with a non-zero status if any function's total stack exceeds this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub threshold: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Whether to colorize human-readable output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase logging verbosity; may be repeated.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging below error level.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Selects the output renderer (§4.10).
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// A column-aligned, optionally colorized table.
    Human,
    /// A `serde_json`-serialized [`crate::report::Report`].
    Json,
}

/// Selects whether human output is colorized.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ColorMode {
    /// Colorize only when stdout is a terminal.
    Auto,
    /// Always colorize.
    Always,
    /// Never colorize.
    Never,
}

impl clap::builder::ValueParserFactory for Architecture {
    type Parser = ArchitectureValueParser;

    fn value_parser() -> Self::Parser {
        ArchitectureValueParser
    }
}

/// Parses a CLI `--arch` argument into an [`Architecture`], reusing its own
/// [`FromStr`](std::str::FromStr) implementation so the accepted spellings never drift from the
/// ones the analyzer's object reader recognizes.
#[derive(Clone)]
pub struct ArchitectureValueParser;

impl clap::builder::TypedValueParser for ArchitectureValueParser {
    type Value = Architecture;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let value = value.to_str().ok_or_else(|| {
            clap::Error::raw(clap::error::ErrorKind::InvalidUtf8, "architecture must be UTF-8")
        })?;
        value.parse().map_err(|err: stackwatch_common::UnsupportedArchitecture| {
            let mut clap_err = clap::Error::new(clap::error::ErrorKind::InvalidValue).with_cmd(cmd);
            if let Some(arg) = arg {
                clap_err.insert(
                    clap::error::ContextKind::InvalidArg,
                    clap::error::ContextValue::String(arg.to_string()),
                );
            }
            clap_err.insert(
                clap::error::ContextKind::InvalidValue,
                clap::error::ContextValue::String(err.to_string()),
            );
            clap_err
        })
    }
}
