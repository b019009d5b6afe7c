//! 32-bit ARM and AArch64 disassembly recognition.
//!
//! The two instruction sets share enough syntax (`sub sp, sp, #imm`, `bl`/`blx` for direct
//! calls) that one parser handles both; [`Width`] only changes how many bytes a register-list
//! push/`stp` prologue consumes and disambiguates `bx`/`blx` (32-bit, link-register return) from
//! `blr`/`ret` (64-bit).

use once_cell::sync::Lazy;
use regex::Regex;

use super::Effect;

/// Distinguishes 32-bit ARM from AArch64 without introducing a second recognizer trait impl.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Width {
    Bit32,
    Bit64,
}

impl Width {
    fn pointer_width(self) -> u64 {
        match self {
            Width::Bit32 => 4,
            Width::Bit64 => 8,
        }
    }
}

static SUB_IMMEDIATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sub\s+sp\s*,\s*sp\s*,\s*#(?:0x)?([0-9a-fA-F]+)$").unwrap());

static SUB_REGISTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sub\s+sp\s*,\s*sp\s*,\s*[rRwWxX][0-9]+$").unwrap());

static PUSH_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^push\s*\{([^}]*)\}$").unwrap());

static POP_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^pop\s*\{([^}]*)\}$").unwrap());

static STP_WRITEBACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^stp\s+\S+\s*,\s*\S+\s*,\s*\[sp,\s*#-(?:0x)?([0-9a-fA-F]+)\]!$").unwrap());

static BL_DIRECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^blx?\s+(?:0x)?([0-9a-fA-F]+)(?:\s+<.*>)?$").unwrap());

static BLR_INDIRECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^blr\s+\S+$").unwrap());

static BX_OR_BLX_REGISTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(bx|blx)\s+(\S+)$").unwrap());

static RET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ret(\s+\S+)?$").unwrap());

static ANY_INSTRUCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*\b").unwrap());

fn strip_address_prefix(line: &str) -> &str {
    let trimmed = line.trim();
    match trimmed.find(':') {
        Some(colon) if colon > 0 && trimmed[..colon].chars().all(|c| c.is_ascii_hexdigit()) => {
            trimmed[colon + 1..].trim()
        }
        _ => trimmed,
    }
}

fn register_count(list: &str) -> u64 {
    list.split(',').filter(|s| !s.trim().is_empty()).count() as u64
}

pub(super) fn recognize(line: &str, width: Width) -> Effect {
    let body = strip_address_prefix(line);
    if body.is_empty() {
        return Effect::Irrelevant;
    }

    if let Some(caps) = SUB_IMMEDIATE.captures(body) {
        return match u64::from_str_radix(&caps[1], 16) {
            Ok(imm) => Effect::StackDecrease(imm),
            Err(_) => Effect::Malformed,
        };
    }
    if SUB_REGISTER.is_match(body) {
        return Effect::StackDecreaseDynamic;
    }
    if let Some(caps) = PUSH_LIST.captures(body) {
        let registers = register_count(&caps[1]);
        return Effect::StackDecrease(registers * width.pointer_width());
    }
    if let Some(caps) = STP_WRITEBACK.captures(body) {
        return match u64::from_str_radix(&caps[1], 16) {
            Ok(imm) => Effect::StackDecrease(imm),
            Err(_) => Effect::Malformed,
        };
    }
    if let Some(caps) = BL_DIRECT.captures(body) {
        return match u64::from_str_radix(&caps[1], 16) {
            Ok(addr) => Effect::DirectCall(addr),
            Err(_) => Effect::Malformed,
        };
    }
    if width == Width::Bit64 && BLR_INDIRECT.is_match(body) {
        return Effect::IndirectCall;
    }
    if width == Width::Bit32 {
        if let Some(caps) = BX_OR_BLX_REGISTER.captures(body) {
            let mnemonic = &caps[1];
            let operand = caps[2].trim();
            if mnemonic == "bx" && operand == "lr" {
                return Effect::Return;
            }
            return Effect::IndirectCall;
        }
    }
    if width == Width::Bit64 && RET.is_match(body) {
        return Effect::Return;
    }
    if width == Width::Bit32 {
        if let Some(caps) = POP_LIST.captures(body) {
            if caps[1].split(',').any(|r| r.trim() == "pc") {
                return Effect::Return;
            }
            return Effect::Irrelevant;
        }
    } else if POP_LIST.is_match(body) {
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
    fn sub_sp_immediate() {
        assert_eq!(
            recognize("sub    sp, sp, #0x20", Width::Bit64),
            Effect::StackDecrease(0x20)
        );
    }

    #[test]
    fn sub_sp_register_is_dynamic() {
        assert_eq!(
            recognize("sub    sp, sp, r4", Width::Bit32),
            Effect::StackDecreaseDynamic
        );
    }

    #[test]
    fn push_list_counts_registers() {
        assert_eq!(
            recognize("push   {r4, r5, lr}", Width::Bit32),
            Effect::StackDecrease(12)
        );
    }

    #[test]
    fn stp_writeback_captures_offset() {
        assert_eq!(
            recognize("stp    x29, x30, [sp, #-32]!", Width::Bit64),
            Effect::StackDecrease(0x20)
        );
    }

    #[test]
    fn stp_without_writeback_has_no_effect() {
        assert_eq!(
            recognize("stp    x29, x30, [sp, #16]", Width::Bit64),
            Effect::Irrelevant
        );
    }

    #[test]
    fn bl_is_direct_call() {
        assert_eq!(
            recognize("bl     401150 <g>", Width::Bit64),
            Effect::DirectCall(0x401150)
        );
    }

    #[test]
    fn blr_is_indirect_call_on_aarch64() {
        assert_eq!(recognize("blr    x1", Width::Bit64), Effect::IndirectCall);
    }

    #[test]
    fn bx_lr_is_return_on_arm32() {
        assert_eq!(recognize("bx     lr", Width::Bit32), Effect::Return);
    }

    #[test]
    fn bx_register_is_indirect_call_on_arm32() {
        assert_eq!(recognize("bx     r3", Width::Bit32), Effect::IndirectCall);
    }

    #[test]
    fn ret_is_return_on_aarch64() {
        assert_eq!(recognize("ret", Width::Bit64), Effect::Return);
    }

    #[test]
    fn pop_with_pc_is_return_on_arm32() {
        assert_eq!(
            recognize("pop    {r4, pc}", Width::Bit32),
            Effect::Return
        );
    }

    #[test]
    fn pop_without_pc_is_irrelevant() {
        assert_eq!(recognize("pop    {r4, r5}", Width::Bit32), Effect::Irrelevant);
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(recognize("####", Width::Bit32), Effect::Malformed);
    }
}
