//! Static analysis core for worst-case stack consumption of ELF functions.
//!
//! This crate implements the leaf-first pipeline described for the analyzer: an
//! [architecture dispatch](recognizer::Recognizer) selects an
//! [`InstructionRecognizer`](recognizer::InstructionRecognizer), the [function
//! extractor](frame::extract_frames) turns a disassembly stream into [`Frame`](frame::Frame)
//! records, the [call-graph builder](graph::CallGraph::link) links them against a
//! [`SymbolMap`](graph::SymbolMap), the [cycle detector](cycle::detect_cycles) marks recursive
//! functions, and the [stack propagator](propagate::propagate) computes each function's
//! cumulative bound and its precision.
//!
//! Everything that materializes this crate's two inputs (disassembly text, a symbol map) or
//! consumes its one output (a rendered report) lives outside this crate — in `stackwatch-cli`.
//! This crate never touches a filesystem or a subprocess.

#![warn(missing_docs)]

pub mod cycle;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod graph;
pub mod propagate;
pub mod recognizer;

use stackwatch_common::Architecture;

pub use diagnostics::Diagnostic;
pub use error::AnalyzerError;
pub use frame::{DisassemblyLine, Frame, FunctionHeader};
pub use graph::{CallGraph, Node, NodeId, SymbolMap};

/// The complete, linked result of one analysis pass: the call graph with every node's
/// `total_stack`/`total_is_lower_bound`/`in_cycle` filled in, and the ordered diagnostic list
/// accumulated across extraction, linkage, and cycle detection.
#[derive(Debug)]
pub struct AnalysisResult {
    /// The linked call graph, with propagation complete.
    pub graph: CallGraph,
    /// Every diagnostic raised while producing `graph`, in the order: extraction (per function,
    /// in disassembly order), unresolved callees (in linkage order), then cycle membership (one
    /// per maximal SCC, in representative-address order).
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the full pipeline (§2) over a disassembly stream: extraction, linkage, cycle detection,
/// and propagation, in that order.
///
/// `architecture` selects the [`recognizer::Recognizer`] used for extraction; it is trusted
/// as-is (callers construct it through [`Architecture::from_str`](std::str::FromStr), which is
/// the one place [`stackwatch_common::UnsupportedArchitecture`] can be raised).
pub fn analyze(
    architecture: Architecture,
    lines: impl IntoIterator<Item = DisassemblyLine>,
    symbols: &SymbolMap,
) -> AnalysisResult {
    let (frames, mut diagnostics) = frame::extract_frames(architecture, lines);
    let (mut graph, link_diagnostics) = graph::CallGraph::link(frames, symbols);
    diagnostics.extend(link_diagnostics);
    diagnostics.extend(cycle::detect_cycles(&mut graph));
    propagate::propagate(&mut graph);

    AnalysisResult { graph, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(address: u64, name: &str) -> DisassemblyLine {
        DisassemblyLine::Header(FunctionHeader {
            address,
            name: name.to_string(),
            section: None,
        })
    }

    fn insn(text: &str) -> DisassemblyLine {
        DisassemblyLine::Instruction(text.to_string())
    }

    #[test]
    fn end_to_end_chain_with_one_unresolved_callee() {
        let lines = vec![
            header(0x100, "main"),
            insn("sub    $0x18,%rsp"),
            insn("call   200 <helper>"),
            insn("call   *%rax"),
            insn("ret"),
            header(0x200, "helper"),
            insn("push   %rbp"),
            insn("call   9999 <plt_stub>"),
            insn("ret"),
        ];

        let result = analyze(Architecture::X86_64, lines, &SymbolMap::new());
        assert_eq!(result.graph.len(), 2);

        let main = result.graph.nodes().find(|n| n.name == "main").unwrap();
        let helper = result.graph.nodes().find(|n| n.name == "helper").unwrap();

        // main: sub 0x18 + one direct-call return push (8) = 0x20, plus helper's total.
        assert_eq!(helper.total_stack, 8 + 8);
        assert_eq!(main.total_stack, 0x18 + 8 + helper.total_stack);
        assert!(main.total_is_lower_bound);
        assert!(!helper.total_is_lower_bound);

        assert!(result
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::IndirectCall(name) if name == "main")));
        assert!(result
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::UnresolvedCallee(name, addr) if name == "helper" && *addr == 0x9999)));
    }
}
