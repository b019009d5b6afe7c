//! Common types shared between the `stackwatch` crates.
//!
//! This crate only carries the [`Architecture`] tag and its associated error. It has no I/O and
//! no process-wide state, so it can be depended on by both the analyzer core and its CLI front
//! end without pulling either direction into the other.

#![warn(missing_docs)]

mod arch;

pub use arch::{Architecture, UnsupportedArchitecture};
