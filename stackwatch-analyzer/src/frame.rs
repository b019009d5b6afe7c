//! The Function Extractor (§4.3): turns a disassembly stream into one [`Frame`] per function.

use stackwatch_common::Architecture;

use crate::diagnostics::Diagnostic;
use crate::recognizer::{Effect, InstructionRecognizer, Recognizer};

/// The header of one function's disassembly section: its entry address, symbol name, and the
/// object/section it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionHeader {
    /// The function's entry point address.
    pub address: u64,
    /// The function's symbol name.
    pub name: String,
    /// The originating object or section identifier, carried opaquely for presentation.
    pub section: Option<String>,
}

/// One line of a disassembly section: either a new function's header or an instruction line
/// belonging to the current function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisassemblyLine {
    /// Begins a new function.
    Header(FunctionHeader),
    /// One instruction line within the current function's body.
    Instruction(String),
}

/// A pre-link function record produced by the extractor (§3 "Frame (pre-link)").
///
/// Frames exist only from parser emission until [graph linkage](crate::graph::CallGraph::link),
/// after which they are owned by the corresponding [`Node`](crate::graph::Node).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// The function's entry point address.
    pub address: u64,
    /// The function's symbol name.
    pub name: String,
    /// The originating object/section identifier, carried opaquely for presentation.
    pub section: Option<String>,
    /// Bytes this function consumes on the stack by itself, independent of its callees.
    pub own_stack: u64,
    /// Addresses observed in direct call instructions, in the order they appear in the body.
    pub call_targets: Vec<u64>,
    /// Set when the function contains a stack-pointer adjustment of unknown magnitude.
    pub dynamic_stack: bool,
    /// Set when the function contains a call through a register or memory operand.
    pub has_indirect_call: bool,
    /// Number of instruction lines in this function's body that could not be parsed at all.
    pub malformed_lines: u32,
}

impl Frame {
    fn new(header: FunctionHeader) -> Self {
        Frame {
            address: header.address,
            name: header.name,
            section: header.section,
            own_stack: 0,
            call_targets: Vec::new(),
            dynamic_stack: false,
            has_indirect_call: false,
            malformed_lines: 0,
        }
    }

    fn apply(&mut self, effect: Effect, architecture: Architecture) {
        match effect {
            Effect::StackDecrease(n) => self.own_stack += n,
            Effect::StackDecreaseDynamic => self.dynamic_stack = true,
            Effect::DirectCall(addr) => {
                self.call_targets.push(addr);
                if architecture.call_pushes_return_address() {
                    self.own_stack += architecture.pointer_width() as u64;
                }
            }
            Effect::IndirectCall => self.has_indirect_call = true,
            Effect::Return | Effect::Irrelevant => {}
            Effect::Malformed => self.malformed_lines += 1,
        }
    }
}

/// Runs the Function Extractor over a full disassembly stream, emitting one [`Frame`] per
/// function section and the diagnostics described in §4.3.
///
/// An empty input yields an empty result with no diagnostics (§7 `EmptyInput`).
pub fn extract_frames(
    architecture: Architecture,
    lines: impl IntoIterator<Item = DisassemblyLine>,
) -> (Vec<Frame>, Vec<Diagnostic>) {
    let recognizer = Recognizer::for_architecture(architecture);
    let mut frames = Vec::new();
    let mut diagnostics = Vec::new();
    let mut current: Option<Frame> = None;

    let seal = |frame: Option<Frame>, frames: &mut Vec<Frame>, diagnostics: &mut Vec<Diagnostic>| {
        if let Some(frame) = frame {
            if frame.dynamic_stack {
                diagnostics.push(Diagnostic::DynamicStack(frame.name.clone()));
            }
            if frame.has_indirect_call {
                diagnostics.push(Diagnostic::IndirectCall(frame.name.clone()));
            }
            if frame.malformed_lines > 0 {
                diagnostics.push(Diagnostic::MalformedDisassemblyLine(frame.name.clone()));
            }
            frames.push(frame);
        }
    };

    for line in lines {
        match line {
            DisassemblyLine::Header(header) => {
                seal(current.take(), &mut frames, &mut diagnostics);
                current = Some(Frame::new(header));
            }
            DisassemblyLine::Instruction(text) => {
                if let Some(frame) = current.as_mut() {
                    let effect = recognizer.recognize(&text);
                    frame.apply(effect, architecture);
                }
            }
        }
    }
    seal(current.take(), &mut frames, &mut diagnostics);

    (frames, diagnostics)
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
    fn empty_input_yields_empty_output() {
        let (frames, diagnostics) = extract_frames(Architecture::X86_64, Vec::new());
        assert!(frames.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn direct_call_adds_return_address_push_on_x86_64() {
        let lines = vec![
            header(0x100, "f"),
            insn("sub    $0x20,%rsp"),
            insn("call   200 <g>"),
            insn("ret"),
            header(0x200, "g"),
            insn("sub    $0x10,%rsp"),
            insn("ret"),
        ];
        let (frames, diagnostics) = extract_frames(Architecture::X86_64, lines);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].own_stack, 0x20 + 8);
        assert_eq!(frames[0].call_targets, vec![0x200]);
        assert_eq!(frames[1].own_stack, 0x10);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn direct_call_does_not_add_return_push_on_arm() {
        let lines = vec![
            header(0x100, "f"),
            insn("sub    sp, sp, #0x20"),
            insn("bl     200 <g>"),
            insn("bx     lr"),
        ];
        let (frames, _) = extract_frames(Architecture::Arm, lines);
        assert_eq!(frames[0].own_stack, 0x20);
    }

    #[test]
    fn dynamic_and_indirect_flags_produce_diagnostics() {
        let lines = vec![
            header(0x100, "f"),
            insn("sub    %rax,%rsp"),
            insn("call   *%rax"),
            insn("ret"),
        ];
        let (frames, diagnostics) = extract_frames(Architecture::X86_64, lines);
        assert!(frames[0].dynamic_stack);
        assert!(frames[0].has_indirect_call);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::DynamicStack("f".to_string()),
                Diagnostic::IndirectCall("f".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_lines_counted_once_per_function() {
        let lines = vec![
            header(0x100, "f"),
            insn("???"),
            insn("@@@"),
            insn("ret"),
        ];
        let (frames, diagnostics) = extract_frames(Architecture::X86_64, lines);
        assert_eq!(frames[0].malformed_lines, 2);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MalformedDisassemblyLine("f".to_string())]
        );
    }
}
