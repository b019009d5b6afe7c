//! [Stack Watch](https://docs.rs/stackwatch) computes an upper bound on the worst-case stack
//! consumption of every function in an ELF executable or shared object, without executing it.
//!
//! It consists of a small number of largely independent crates bundled together here:
//!
//! - **`analyzer`**: the static-analysis core — per-architecture disassembly recognition, call
//!   graph construction, cycle detection, and stack-bound propagation. This crate has no
//!   knowledge of files, processes, or terminals.
//! - **`common`**: the `Architecture` tag shared by every other crate in the workspace.
//!
//! # Usage
//!
//! Add `stackwatch` as a dependency to your `Cargo.toml`. The `serde` feature adds
//! `serde::Serialize` implementations to the analyzer's diagnostic types, for embedding in a
//! machine-readable report.
//!
//! The `stackwatch-cli` binary crate builds the rest of the pipeline described in this crate's
//! design notes — object reading, `objdump`/`nm` invocation, and rendering — on top of this
//! library.

#![warn(missing_docs)]

#[doc(inline)]
pub use stackwatch_analyzer as analyzer;
#[doc(inline)]
pub use stackwatch_common as common;
