//! The core analyzer's error taxonomy (§7).
//!
//! The analyzer itself can fail in exactly one fatal way: an architecture tag it was handed does
//! not correspond to a supported instruction set. Everything else the full pipeline can fail at
//! — opening the object file, invoking `objdump`/`nm`, I/O — belongs to the collaborators that
//! sit around this crate, not to the core, and is folded into their own error type the way
//! `symbolic-cfi::CfiError` wraps `ObjectError`/`GimliError` without owning their definitions.

use thiserror::Error;

use stackwatch_common::UnsupportedArchitecture;

/// Fatal errors the analyzer core can itself raise.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The architecture tag handed to the [architecture dispatch](crate::recognizer::Recognizer)
    /// is outside the four supported instruction sets.
    #[error("unsupported architecture: {0}")]
    UnsupportedArchitecture(#[from] UnsupportedArchitecture),
}
