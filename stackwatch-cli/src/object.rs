//! Object Reading (§4.7): opens the target file, memory-maps it, confirms it is an ELF object,
//! and reports its architecture tag and a symbol-table fallback to the rest of the pipeline.

use std::fs::File;
use std::path::Path;

use goblin::elf::header;
use goblin::elf::Elf;
use memmap2::Mmap;
use stackwatch_analyzer::SymbolMap;
use stackwatch_common::Architecture;

use crate::error::CliError;

/// A memory-mapped ELF object, along with the architecture and symbol table read from it.
pub struct Object {
    mmap: Mmap,
}

impl Object {
    /// Opens and memory-maps `path`, grounded on the same `File::open` → `Mmap::map` sequence
    /// this corpus uses for reading arbitrary binary input.
    pub fn open(path: &Path) -> Result<Self, CliError> {
        let file = File::open(path).map_err(|source| CliError::Object {
            path: path.to_path_buf(),
            source: goblin::error::Error::IO(source),
        })?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| CliError::Object {
            path: path.to_path_buf(),
            source: goblin::error::Error::IO(source),
        })?;
        Ok(Object { mmap })
    }

    fn parse(&self, path: &Path) -> Result<Elf<'_>, CliError> {
        Elf::parse(&self.mmap).map_err(|source| CliError::Object {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Detects the target's architecture from its ELF header `e_machine` field.
    pub fn detect_architecture(&self, path: &Path) -> Result<Architecture, CliError> {
        let elf = self.parse(path)?;
        let architecture = match (elf.header.e_machine, elf.is_64) {
            (header::EM_386, _) => Architecture::X86,
            (header::EM_X86_64, _) => Architecture::X86_64,
            (header::EM_ARM, _) => Architecture::Arm,
            (header::EM_AARCH64, _) => Architecture::Aarch64,
            (other, _) => {
                return Err(CliError::Object {
                    path: path.to_path_buf(),
                    source: goblin::error::Error::Malformed(format!(
                        "unsupported ELF e_machine {other}"
                    )),
                })
            }
        };
        Ok(architecture)
    }

    /// Builds a [`SymbolMap`] from the object's own ELF symbol table, used when the `nm`
    /// collaborator (§4.8) is unavailable or fails.
    pub fn symbol_table(&self, path: &Path) -> Result<SymbolMap, CliError> {
        let elf = self.parse(path)?;
        let mut symbols = SymbolMap::new();
        for sym in elf.syms.iter() {
            if !sym.is_function() || sym.st_value == 0 {
                continue;
            }
            let Some(name) = elf.strtab.get_at(sym.st_name) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            symbols.insert(sym.st_value, name, None);
        }
        Ok(symbols)
    }
}
