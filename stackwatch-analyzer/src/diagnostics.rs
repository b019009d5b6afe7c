//! Non-fatal observations raised while a function's stack bound is computed (§7).
//!
//! A [`Diagnostic`] never aborts the analysis; it annotates a quality degradation (the bound
//! for some function becomes a lower bound rather than an exact figure) or flags something the
//! caller may want to act on. Diagnostics are collected per run and attached to the [`Report`]
//! alongside the per-function results.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// One non-fatal finding produced during extraction, graph construction, or propagation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "function"))]
pub enum Diagnostic {
    /// The named function is a member of a call cycle; its bound is a lower bound rather than
    /// an exact figure (§4.6).
    CycleEntry(String),
    /// The named function contains a call through a register or memory operand; any function
    /// reachable through it may be undercounted (§4.4, §4.6).
    IndirectCall(String),
    /// The named function adjusts the stack pointer by an amount not derivable from the
    /// instruction text alone (§4.3).
    DynamicStack(String),
    /// A direct call in the named function could not be resolved to any known function entry
    /// point (§4.4). Carries the caller's name and the unresolved target address.
    UnresolvedCallee(String, u64),
    /// The named function's disassembly section contained one or more lines that could not be
    /// parsed as instructions at all (§4.3). Carries the function name; the count itself lives
    /// on the originating `Frame`/`Node`.
    MalformedDisassemblyLine(String),
}

impl Diagnostic {
    /// The name of the function this diagnostic concerns.
    pub fn function(&self) -> &str {
        match self {
            Diagnostic::CycleEntry(name) => name,
            Diagnostic::IndirectCall(name) => name,
            Diagnostic::DynamicStack(name) => name,
            Diagnostic::UnresolvedCallee(name, _) => name,
            Diagnostic::MalformedDisassemblyLine(name) => name,
        }
    }

    /// True for diagnostics that, by themselves, downgrade a bound from exact to lower-bound.
    pub fn degrades_precision(&self) -> bool {
        matches!(
            self,
            Diagnostic::CycleEntry(_)
                | Diagnostic::IndirectCall(_)
                | Diagnostic::DynamicStack(_)
                | Diagnostic::UnresolvedCallee(_)
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CycleEntry(name) => write!(f, "cycle entering with `{name}`"),
            Diagnostic::IndirectCall(name) => write!(f, "indirect call in `{name}`"),
            Diagnostic::DynamicStack(name) => write!(f, "dynamic stack adjustment in `{name}`"),
            Diagnostic::UnresolvedCallee(caller, target) => {
                write!(f, "unresolved callee {target:#x} from `{caller}`")
            }
            Diagnostic::MalformedDisassemblyLine(name) => {
                write!(f, "unparseable disassembly line in `{name}`")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_disassembly_line_does_not_degrade_precision_by_itself() {
        let diagnostic = Diagnostic::MalformedDisassemblyLine("f".to_string());
        assert!(!diagnostic.degrades_precision());
        assert_eq!(diagnostic.function(), "f");
    }

    #[test]
    fn display_names_the_cycle_entry_point() {
        let text = Diagnostic::CycleEntry("rec_xi".to_string()).to_string();
        assert_eq!(text, "cycle entering with `rec_xi`");
    }

    #[test]
    fn cycle_entry_degrades_precision() {
        assert!(Diagnostic::CycleEntry("f".to_string()).degrades_precision());
    }
}
