//! Process Collaborators (§4.8): shells out to `objdump` and `nm`, the concrete choice this
//! crate makes for "the external disassembler and symbol-reader processes" the core pipeline
//! treats as opaque inputs.

use std::path::Path;
use std::process::Command;

use stackwatch_analyzer::{DisassemblyLine, FunctionHeader, SymbolMap};

use crate::error::CliError;
use crate::object::Object;

/// Runs `objdump -d --no-show-raw-insn` against `path` and parses its stdout into the
/// [`DisassemblyLine`] stream the function extractor consumes.
///
/// A non-zero exit status or a missing `objdump` binary is fatal (§7 `Disassembler`); there is
/// no fallback disassembler in this corpus the way there is for symbol reading.
pub fn disassemble(path: &Path) -> Result<Vec<DisassemblyLine>, CliError> {
    let output = Command::new("objdump")
        .arg("-d")
        .arg("--no-show-raw-insn")
        .arg(path)
        .output()
        .map_err(|source| CliError::Disassembler {
            path: path.to_path_buf(),
            source: Some(source),
        })?;

    if !output.status.success() {
        return Err(CliError::Disassembler {
            path: path.to_path_buf(),
            source: None,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_objdump(&stdout))
}

fn parse_objdump(text: &str) -> Vec<DisassemblyLine> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        if let Some(header) = parse_section_header(raw) {
            lines.push(DisassemblyLine::Header(header));
        } else if raw.starts_with(|c: char| c.is_whitespace()) && raw.contains(':') {
            lines.push(DisassemblyLine::Instruction(raw.to_string()));
        }
    }
    lines
}

/// Parses an `objdump` section header of the form `0000000000401000 <main>:`.
fn parse_section_header(line: &str) -> Option<FunctionHeader> {
    let (address, rest) = line.split_once(' ')?;
    if address.is_empty() || !address.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let name = rest.trim().strip_prefix('<')?.strip_suffix(">:")?;
    Some(FunctionHeader {
        address: u64::from_str_radix(address, 16).ok()?,
        name: name.to_string(),
        section: None,
    })
}

/// Runs `nm --defined-only -S <path>` and parses its stdout into a [`SymbolMap`]. Falls back to
/// the object's own ELF symbol table (§4.7) when `nm` is missing or exits non-zero, rather than
/// treating that as fatal — a symbol map degraded to "whatever the ELF symtab itself carries" is
/// still useful, unlike a missing disassembly.
pub fn read_symbols(path: &Path, object: &Object) -> Result<SymbolMap, CliError> {
    match Command::new("nm")
        .arg("--defined-only")
        .arg("-S")
        .arg(path)
        .output()
    {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            Ok(parse_nm(&stdout))
        }
        _ => {
            tracing::warn!(path = %path.display(), "nm unavailable or failed, falling back to the object's ELF symbol table");
            object.symbol_table(path)
        }
    }
}

fn parse_nm(text: &str) -> SymbolMap {
    let mut symbols = SymbolMap::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (address, name) = match fields.as_slice() {
            [address, _size, _kind, name] => (*address, *name),
            [address, _kind, name] => (*address, *name),
            _ => continue,
        };
        if let Ok(address) = u64::from_str_radix(address, 16) {
            symbols.insert(address, name, None);
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_section_headers_and_instruction_lines() {
        let text = "\n0000000000401000 <main>:\n  401000:\tsub    $0x10,%rsp\n  401007:\tret\n";
        let lines = parse_objdump(text);
        assert_eq!(lines.len(), 3);
        assert!(matches!(&lines[0], DisassemblyLine::Header(h) if h.name == "main" && h.address == 0x401000));
    }

    #[test]
    fn parses_nm_with_and_without_size_column() {
        let with_size = "0000000000401000 0000000000000010 T main\n";
        let symbols = parse_nm(with_size);
        assert_eq!(symbols.get(0x401000).map(|(name, _)| name), Some("main"));

        let without_size = "0000000000401000 T main\n";
        let symbols = parse_nm(without_size);
        assert_eq!(symbols.get(0x401000).map(|(name, _)| name), Some("main"));
    }
}
