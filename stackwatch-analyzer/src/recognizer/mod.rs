//! Per-architecture classification of one disassembly line.
//!
//! The [`InstructionRecognizer`] contract is pure and context-free: given a single line of
//! disassembly, it reports the one analytical [`Effect`] that line has, without looking at any
//! other line in the function. [`Recognizer`] is the architecture dispatch of §4.1: a tagged
//! union with one constructor per supported instruction set, each wrapping a zero-sized marker
//! that implements the trait. There is no `dyn InstructionRecognizer` anywhere in this crate —
//! the four variants are matched exhaustively instead.

mod arm;
mod x86;

use stackwatch_common::Architecture;

/// The effect one disassembly line has on the analysis, as classified by a [`Recognizer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Effect {
    /// The instruction statically decreases the stack pointer by exactly this many bytes.
    StackDecrease(u64),
    /// The instruction decreases the stack pointer by an amount that cannot be read off the
    /// instruction text (a register-computed displacement).
    StackDecreaseDynamic,
    /// A call to a statically known target address.
    DirectCall(u64),
    /// A call through a register or memory operand.
    IndirectCall,
    /// Control leaves the function.
    Return,
    /// None of the above; the instruction has no effect on the analysis.
    Irrelevant,
    /// The line could not be parsed as an instruction at all.
    Malformed,
}

/// The per-architecture contract for classifying one line of disassembly.
///
/// Implementations must be pure: the same line always yields the same [`Effect`], independent of
/// any instruction that came before it in the function.
pub trait InstructionRecognizer {
    /// Classifies a single disassembly line.
    fn recognize(&self, line: &str) -> Effect;
}

/// 32-bit ARM recognizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArmRecognizer;

/// 64-bit ARM (AArch64) recognizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aarch64Recognizer;

/// 32-bit x86 (IA-32) recognizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct X86Recognizer;

/// 64-bit x86 (x86-64) recognizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct X86_64Recognizer;

impl InstructionRecognizer for ArmRecognizer {
    fn recognize(&self, line: &str) -> Effect {
        arm::recognize(line, arm::Width::Bit32)
    }
}

impl InstructionRecognizer for Aarch64Recognizer {
    fn recognize(&self, line: &str) -> Effect {
        arm::recognize(line, arm::Width::Bit64)
    }
}

impl InstructionRecognizer for X86Recognizer {
    fn recognize(&self, line: &str) -> Effect {
        x86::recognize(line, 4)
    }
}

impl InstructionRecognizer for X86_64Recognizer {
    fn recognize(&self, line: &str) -> Effect {
        x86::recognize(line, 8)
    }
}

/// Architecture dispatch: selects the [`InstructionRecognizer`] for an [`Architecture`] tag.
///
/// This is a sum type with one constructor per instruction set rather than a `Box<dyn
/// InstructionRecognizer>` or a name-keyed registry, so that the match in [`Recognizer::recognize`]
/// is exhaustively checked by the compiler whenever a fifth architecture is ever added.
#[derive(Clone, Copy, Debug)]
pub enum Recognizer {
    /// See [`ArmRecognizer`].
    Arm(ArmRecognizer),
    /// See [`Aarch64Recognizer`].
    Aarch64(Aarch64Recognizer),
    /// See [`X86Recognizer`].
    X86(X86Recognizer),
    /// See [`X86_64Recognizer`].
    X86_64(X86_64Recognizer),
}

impl Recognizer {
    /// Selects the recognizer for the given architecture. This never fails: [`Architecture`] is
    /// itself an exhaustive enumeration of the four supported tags, and rejecting an unrecognized
    /// tag string is the job of [`Architecture::from_str`](std::str::FromStr).
    pub fn for_architecture(architecture: Architecture) -> Self {
        match architecture {
            Architecture::Arm => Recognizer::Arm(ArmRecognizer),
            Architecture::Aarch64 => Recognizer::Aarch64(Aarch64Recognizer),
            Architecture::X86 => Recognizer::X86(X86Recognizer),
            Architecture::X86_64 => Recognizer::X86_64(X86_64Recognizer),
        }
    }
}

impl InstructionRecognizer for Recognizer {
    fn recognize(&self, line: &str) -> Effect {
        match self {
            Recognizer::Arm(r) => r.recognize(line),
            Recognizer::Aarch64(r) => r.recognize(line),
            Recognizer::X86(r) => r.recognize(line),
            Recognizer::X86_64(r) => r.recognize(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_selects_matching_variant() {
        assert!(matches!(
            Recognizer::for_architecture(Architecture::Arm),
            Recognizer::Arm(_)
        ));
        assert!(matches!(
            Recognizer::for_architecture(Architecture::X86_64),
            Recognizer::X86_64(_)
        ));
    }
}
