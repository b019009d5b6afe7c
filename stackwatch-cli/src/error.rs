//! CLI-facing error taxonomy (§7), wrapping the core's [`AnalyzerError`] with the failure modes
//! of the collaborators that sit around it: object reading, process invocation, and I/O.
//!
//! Mirrors how `symbolic-cfi::CfiError` wraps `ObjectError`/`GimliError` alongside its own
//! variants rather than folding them into the core crate's error type.

use std::path::PathBuf;

use stackwatch_analyzer::AnalyzerError;
use thiserror::Error;

/// Everything that can cause `stackwatch` to exit with a fatal status (§4.11).
#[derive(Debug, Error)]
pub enum CliError {
    /// The target file could not be opened, memory-mapped, or parsed as an ELF object.
    #[error("failed to read object file {path}")]
    Object {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying cause.
        #[source]
        source: goblin::error::Error,
    },

    /// `objdump` could not be invoked, or exited with a failure status.
    #[error("failed to invoke disassembler for {path}")]
    Disassembler {
        /// The path that was being disassembled.
        path: PathBuf,
        /// The underlying cause, when the process could not be spawned at all.
        #[source]
        source: Option<std::io::Error>,
    },

    /// Neither `nm` nor the object's own ELF symbol table could produce a symbol map.
    #[error("failed to read symbols for {path}")]
    SymbolReader {
        /// The path symbols were being read for.
        path: PathBuf,
        /// The underlying cause, when the process could not be spawned at all.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The analyzer core itself raised a fatal error.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// A filesystem or process I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The JSON renderer failed to serialize the report.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// The exit code this error should produce, per the policy table in §4.11: every fatal
    /// condition shares one distinct status, separate from the warning (`1`) and
    /// threshold-breach (`2`) codes produced by a successful run with findings.
    pub fn exit_code(&self) -> i32 {
        3
    }
}
