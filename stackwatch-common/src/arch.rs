use std::fmt;
use std::str;

use thiserror::Error;

/// An error returned for an [`Architecture`] tag that this analyzer does not support.
#[derive(Debug, Clone, Error)]
#[error("unsupported architecture: {0}")]
pub struct UnsupportedArchitecture(pub String);

/// One of the four instruction sets this analyzer understands.
///
/// The architecture tag selects a [recognizer](crate) for disassembly lines and determines the
/// pointer width used to account for return-address pushes on call instructions.
///
/// # Examples
///
/// ```
/// use stackwatch_common::Architecture;
///
/// assert_eq!(Architecture::X86_64.pointer_width(), 8);
/// assert_eq!("aarch64".parse(), Ok(Architecture::Aarch64));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[allow(non_camel_case_types)]
pub enum Architecture {
    #[cfg_attr(feature = "serde", serde(rename = "arm"))]
    Arm,
    #[cfg_attr(feature = "serde", serde(rename = "aarch64"))]
    Aarch64,
    #[cfg_attr(feature = "serde", serde(rename = "x86"))]
    X86,
    #[cfg_attr(feature = "serde", serde(rename = "x86_64"))]
    X86_64,
}

impl Architecture {
    /// All architectures recognized by this analyzer, in a stable order.
    pub const ALL: [Architecture; 4] = [
        Architecture::Arm,
        Architecture::Aarch64,
        Architecture::X86,
        Architecture::X86_64,
    ];

    /// The pointer width of this architecture, in bytes.
    ///
    /// 4 for `arm`/`x86`, 8 for `aarch64`/`x86_64`. The function extractor uses this to account
    /// for the return-address push implicit in a direct `call` on x86 and x86-64.
    pub fn pointer_width(self) -> u8 {
        match self {
            Architecture::Arm | Architecture::X86 => 4,
            Architecture::Aarch64 | Architecture::X86_64 => 8,
        }
    }

    /// Whether `call`/`bl` instructions on this architecture push the return address onto the
    /// stack themselves (x86 family), as opposed to placing it in a link register (ARM family).
    pub fn call_pushes_return_address(self) -> bool {
        matches!(self, Architecture::X86 | Architecture::X86_64)
    }

    /// The canonical lowercase name of this architecture, as accepted by [`FromStr`](str::FromStr).
    pub fn name(self) -> &'static str {
        match self {
            Architecture::Arm => "arm",
            Architecture::Aarch64 => "aarch64",
            Architecture::X86 => "x86",
            Architecture::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl str::FromStr for Architecture {
    type Err = UnsupportedArchitecture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arm" | "armv7" | "armv7l" => Ok(Architecture::Arm),
            "aarch64" | "arm64" => Ok(Architecture::Aarch64),
            "x86" | "i386" | "i686" => Ok(Architecture::X86),
            "x86_64" | "x86-64" | "amd64" => Ok(Architecture::X86_64),
            other => Err(UnsupportedArchitecture(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_width_matches_family() {
        assert_eq!(Architecture::Arm.pointer_width(), 4);
        assert_eq!(Architecture::X86.pointer_width(), 4);
        assert_eq!(Architecture::Aarch64.pointer_width(), 8);
        assert_eq!(Architecture::X86_64.pointer_width(), 8);
    }

    #[test]
    fn call_pushes_return_address_only_on_x86_family() {
        assert!(Architecture::X86.call_pushes_return_address());
        assert!(Architecture::X86_64.call_pushes_return_address());
        assert!(!Architecture::Arm.call_pushes_return_address());
        assert!(!Architecture::Aarch64.call_pushes_return_address());
    }

    #[test]
    fn from_str_rejects_unknown_tags() {
        assert!("mips".parse::<Architecture>().is_err());
    }

    #[test]
    fn from_str_accepts_common_aliases() {
        assert_eq!("amd64".parse(), Ok(Architecture::X86_64));
        assert_eq!("arm64".parse(), Ok(Architecture::Aarch64));
    }
}
