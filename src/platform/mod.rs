//! Operating system identification in release-manifest vocabulary.
//!
//! Manifests name platforms `linux`, `osx` and `windows`; this module maps
//! the compile-time target onto that vocabulary and lets callers override it
//! (tests, or resolving a project for another machine).

use std::fmt;

/// Operating system as named by release manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsName {
    Linux,
    Osx,
    Windows,
}

impl OsName {
    /// The OS this binary was built for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => OsName::Osx,
            "windows" => OsName::Windows,
            _ => OsName::Linux,
        }
    }

    /// Manifest-side string for this OS.
    pub fn as_str(&self) -> &'static str {
        match self {
            OsName::Linux => "linux",
            OsName::Osx => "osx",
            OsName::Windows => "windows",
        }
    }

    /// Parse a manifest-side OS string. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "linux" => Some(OsName::Linux),
            "osx" => Some(OsName::Osx),
            "windows" => Some(OsName::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
