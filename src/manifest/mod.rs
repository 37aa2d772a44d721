//! Release manifest parsing.
//!
//! A release manifest is a JSON document describing one version of the
//! software: a `downloads` map of hash-verified artifacts and a `libraries`
//! array of dependency coordinates with optional per-OS rules and native
//! classifiers. Parsing yields three descriptor sets: primary binaries,
//! mapping files (logical names ending in `_mappings`), and the libraries
//! that apply to the current platform.
//!
//! Only the hash-verified scheme is supported; every descriptor carries an
//! expected size and SHA-1 digest straight from the document.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::platform::OsName;
use crate::resolver::{decode_sha1_hex, ArtifactDescriptor, HexError};

/// Manifest parse errors
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid library coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("invalid sha1 for {name}: {source}")]
    InvalidDigest {
        name: String,
        #[source]
        source: HexError,
    },
}

/// Raw manifest document, as deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    /// Sorted map keeps descriptor order independent of document order.
    #[serde(default)]
    pub downloads: BTreeMap<String, DownloadEntry>,

    #[serde(default)]
    pub libraries: Vec<Library>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadEntry {
    pub size: Option<u64>,
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Library {
    /// `group:artifact:version` coordinate.
    pub name: String,

    #[serde(default)]
    pub rules: Vec<Rule>,

    /// OS name to native classifier suffix.
    #[serde(default)]
    pub natives: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    pub os: Option<OsMatcher>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsMatcher {
    pub name: String,
}

/// A platform-filtered library, identified by its derived jar filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryArtifact {
    pub file_name: String,
}

impl LibraryArtifact {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl std::fmt::Display for LibraryArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name)
    }
}

/// Everything one release needs, split by role.
#[derive(Debug, Clone, Default)]
pub struct ReleaseArtifacts {
    /// Hash-verified binaries (client, server, ...).
    pub primary: Vec<ArtifactDescriptor>,
    /// Hash-verified mapping files (`*_mappings` downloads).
    pub mappings: Vec<ArtifactDescriptor>,
    /// Libraries applicable to the current platform.
    pub libraries: Vec<LibraryArtifact>,
}

/// Parse a manifest file and derive the descriptor sets for `os`.
pub fn parse_manifest_file(path: &Path, os: OsName) -> Result<ReleaseArtifacts, ManifestError> {
    let contents = fs::read_to_string(path)?;
    parse_manifest(&contents, os)
}

/// Parse a manifest document and derive the descriptor sets for `os`.
pub fn parse_manifest(document: &str, os: OsName) -> Result<ReleaseArtifacts, ManifestError> {
    let manifest: VersionManifest = serde_json::from_str(document)?;
    derive_artifacts(&manifest, os)
}

fn derive_artifacts(
    manifest: &VersionManifest,
    os: OsName,
) -> Result<ReleaseArtifacts, ManifestError> {
    let mut out = ReleaseArtifacts::default();

    for (name, entry) in &manifest.downloads {
        // Entries without size or hash cannot be verified and are skipped.
        let (Some(size), Some(sha1)) = (entry.size, entry.sha1.as_deref()) else {
            debug!(name, "skipping unverifiable download entry");
            continue;
        };

        let digest = decode_sha1_hex(sha1).map_err(|source| ManifestError::InvalidDigest {
            name: name.clone(),
            source,
        })?;

        let descriptor = ArtifactDescriptor::new(name.clone(), size, digest);

        if name.ends_with("_mappings") {
            out.mappings.push(descriptor);
        } else {
            out.primary.push(descriptor);
        }
    }

    for lib in &manifest.libraries {
        if !lib_applies(lib, os) {
            debug!(name = %lib.name, os = %os, "library excluded by rules");
            continue;
        }

        out.libraries.push(LibraryArtifact::new(derived_file_name(lib, os)?));
    }

    Ok(out)
}

/// Evaluate the rule list for `os`: rules apply in document order, a rule
/// without an OS qualifier applies unconditionally, and the last applicable
/// rule's action decides. No rules at all means allowed.
fn lib_applies(lib: &Library, os: OsName) -> bool {
    if lib.rules.is_empty() {
        return true;
    }

    let mut allowed = false;

    for rule in &lib.rules {
        let applies = match &rule.os {
            Some(matcher) => matcher.name == os.as_str(),
            None => true,
        };

        if applies {
            allowed = rule.action == RuleAction::Allow;
        }
    }

    allowed
}

/// Derive `<artifact>-<version>[-<classifier>].jar` from the coordinate and
/// the natives map. The coordinate must have exactly three `:` parts.
fn derived_file_name(lib: &Library, os: OsName) -> Result<String, ManifestError> {
    let parts: Vec<&str> = lib.name.split(':').collect();
    let [_, artifact, version] = parts.as_slice() else {
        return Err(ManifestError::InvalidCoordinate(lib.name.clone()));
    };

    let suffix = match lib.natives.get(os.as_str()) {
        Some(classifier) => format!("-{}", classifier),
        None => String::new(),
    };

    Ok(format!("{}-{}{}.jar", artifact, version, suffix))
}
