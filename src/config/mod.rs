//! Tool configuration loaded from a TOML file.
//!
//! Everything here is optional; command-line flags override file values.

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::platform::OsName;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "intermediarygen.toml";

/// Configuration for intermediarygen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Counter file used by generation runs.
    pub counter_file: Option<PathBuf>,

    /// Directories searched during artifact resolution.
    pub input_dirs: Vec<PathBuf>,

    /// Manifest OS name override (linux, osx, windows).
    pub os: Option<String>,
}

impl Config {
    /// Load from an explicit path, or from `intermediarygen.toml` in the
    /// working directory when present; otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        debug!("Loading config from: {}", path.display());

        let contents = std::fs::read_to_string(&path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;

        toml::from_str(&contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))
    }

    /// Effective OS: config override when valid, otherwise the current one.
    pub fn os_name(&self) -> OsName {
        self.os
            .as_deref()
            .and_then(OsName::parse)
            .unwrap_or_else(OsName::current)
    }
}
