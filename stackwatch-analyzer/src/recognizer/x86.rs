//! IA-32 and x86-64 disassembly recognition.
//!
//! Both architectures share the same AT&T-syntax mnemonics (as emitted by `objdump -d` without
//! `-M intel`); they differ only in the width of the stack pointer register, which this module
//! takes as a parameter so `push` can report the correct byte count. The return-address push
//! implied by a direct `call` is accounted for by the function extractor using the
//! architecture's own pointer width, not by this recognizer — `call` always reports
//! [`Effect::DirectCall`] or [`Effect::IndirectCall`] regardless of width.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Effect;

static SUB_IMMEDIATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sub[bwlq]?\s+\$(?:0x)?([0-9a-fA-F]+)\s*,\s*%[er]sp$").unwrap());

static SUB_REGISTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sub[bwlq]?\s+%\w+\s*,\s*%[er]sp$").unwrap());

static PUSH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^push[wlq]?\s+\S+$").unwrap());

static CALL_DIRECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^call[lq]?\s+(?:0x)?([0-9a-fA-F]+)(?:\s+<.*>)?$").unwrap());

static CALL_INDIRECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^call[lq]?\s+\*").unwrap());

static RETURN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ret[lq]?$").unwrap());

static IGNORED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(add[bwlq]?|pop[wlq]?|leave[lq]?)\b").unwrap());

static ANY_INSTRUCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*\b").unwrap());

/// Strips the leading `addr:` prefix that `objdump` prepends to every disassembly line, leaving
/// just the mnemonic and its operands.
fn strip_address_prefix(line: &str) -> &str {
    let trimmed = line.trim();
    match trimmed.find(':') {
        Some(colon) if colon > 0 && trimmed[..colon].chars().all(|c| c.is_ascii_hexdigit()) => {
            trimmed[colon + 1..].trim()
        }
        _ => trimmed,
    }
}

pub(super) fn recognize(line: &str, pointer_width: u64) -> Effect {
    let body = strip_address_prefix(line);
    if body.is_empty() {
        return Effect::Irrelevant;
    }

    if let Some(caps) = SUB_IMMEDIATE.captures(body) {
        let imm = match u64::from_str_radix(&caps[1], 16) {
            Ok(imm) => imm,
            Err(_) => return Effect::Malformed,
        };
        return Effect::StackDecrease(imm);
    }
    if SUB_REGISTER.is_match(body) {
        return Effect::StackDecreaseDynamic;
    }
    if PUSH.is_match(body) {
        return Effect::StackDecrease(pointer_width);
    }
    if let Some(caps) = CALL_DIRECT.captures(body) {
        return match u64::from_str_radix(&caps[1], 16) {
            Ok(addr) => Effect::DirectCall(addr),
            Err(_) => Effect::Malformed,
        };
    }
    if CALL_INDIRECT.is_match(body) {
        return Effect::IndirectCall;
    }
    if RETURN.is_match(body) {
        return Effect::Return;
    }
    if IGNORED.is_match(body) {
        return Effect::Irrelevant;
    }
    if ANY_INSTRUCTION.is_match(body) {
        return Effect::Irrelevant;
    }
    Effect::Malformed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_immediate_on_rsp() {
        assert_eq!(recognize("sub    $0x20,%rsp", 8), Effect::StackDecrease(0x20));
    }

    #[test]
    fn sub_immediate_with_address_prefix() {
        assert_eq!(
            recognize("  401136:\tsub    $0x20,%rsp", 8),
            Effect::StackDecrease(0x20)
        );
    }

    #[test]
    fn push_reports_pointer_width() {
        assert_eq!(recognize("push   %rbp", 8), Effect::StackDecrease(8));
        assert_eq!(recognize("push   %ebp", 4), Effect::StackDecrease(4));
    }

    #[test]
    fn call_direct_parses_hex_target() {
        assert_eq!(
            recognize("call   401150 <g>", 8),
            Effect::DirectCall(0x401150)
        );
    }

    #[test]
    fn call_indirect_through_register() {
        assert_eq!(recognize("call   *%rax", 8), Effect::IndirectCall);
    }

    #[test]
    fn dynamic_stack_adjustment() {
        assert_eq!(recognize("sub    %rax,%rsp", 8), Effect::StackDecreaseDynamic);
    }

    #[test]
    fn ret_ends_the_function() {
        assert_eq!(recognize("ret", 8), Effect::Return);
    }

    #[test]
    fn add_and_pop_are_ignored() {
        assert_eq!(recognize("add    $0x20,%rsp", 8), Effect::Irrelevant);
        assert_eq!(recognize("pop    %rbp", 8), Effect::Irrelevant);
    }

    #[test]
    fn unrelated_instructions_are_irrelevant() {
        assert_eq!(recognize("mov    %rdi,%rax", 8), Effect::Irrelevant);
        assert_eq!(recognize("nop", 8), Effect::Irrelevant);
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(recognize("!!! not an instruction ???", 8), Effect::Malformed);
    }
}
