//! The externally-visible analysis result (§3 "Report"). The core analyzer never serializes
//! anything; this type is owned entirely by the CLI and is the only thing `render` touches.

use serde::Serialize;
use stackwatch_analyzer::{AnalysisResult, Diagnostic};
use stackwatch_common::Architecture;

/// One function's summary row.
#[derive(Clone, Debug, Serialize)]
pub struct FunctionSummary {
    /// The function's symbol name.
    pub name: String,
    /// The function's entry point address.
    pub address: u64,
    /// Bytes this function consumes on the stack by itself.
    pub own_stack: u64,
    /// Worst-case cumulative stack consumption reachable through this function.
    pub total_stack: u64,
    /// Set when `total_stack` is a lower bound rather than an exact figure.
    pub total_is_lower_bound: bool,
    /// Set when this function participates in a call cycle.
    pub in_cycle: bool,
}

/// The full result of one analysis run, ready for rendering as a table or as JSON.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// The architecture the target was analyzed as.
    pub architecture: Architecture,
    /// The path of the object that was analyzed.
    pub path: String,
    /// One summary row per function, in the order the analyzer produced them.
    pub functions: Vec<FunctionSummary>,
    /// Every diagnostic raised during the run.
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Builds a [`Report`] from a completed [`AnalysisResult`].
    pub fn from_analysis(architecture: Architecture, path: String, result: &AnalysisResult) -> Self {
        let functions = result
            .graph
            .nodes()
            .map(|node| FunctionSummary {
                name: node.name.clone(),
                address: node.address,
                own_stack: node.own_stack,
                total_stack: node.total_stack,
                total_is_lower_bound: node.total_is_lower_bound,
                in_cycle: node.in_cycle,
            })
            .collect();

        Report {
            architecture,
            path,
            functions,
            diagnostics: result.diagnostics.clone(),
        }
    }

    /// True when at least one function's `total_stack` meets or exceeds `threshold`.
    pub fn exceeds_threshold(&self, threshold: u64) -> bool {
        self.functions.iter().any(|f| f.total_stack >= threshold)
    }

    /// True when at least one diagnostic was raised during the run.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
