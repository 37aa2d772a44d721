//! Content-addressed artifact resolution.
//!
//! A descriptor names an artifact only by expected byte length and SHA-1
//! digest; resolution scans candidate directories for a regular file with
//! that exact content. Size is the cheap filter, the digest is only computed
//! on size matches. The first match in visitation order wins, and earlier
//! candidate directories shadow later ones.
//!
//! Resolving many descriptors walks each directory once: files are hashed
//! only when their size matches a still-unresolved descriptor, and every
//! query is answered from that single pass.

use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// SHA-1 digest, the fixed-width content identity used by release manifests.
pub type Sha1Digest = [u8; 20];

/// Resolution errors
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to scan {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to hash {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("artifact not found in any candidate directory: {0}")]
    NotFound(String),
}

/// Hex decode errors
#[derive(Error, Debug)]
pub enum HexError {
    #[error("expected {expected} hex chars, got {actual}")]
    BadLength { expected: usize, actual: usize },
    #[error("not a hex char: {0:?}")]
    BadChar(char),
}

/// Decode a 40-char hex string into a SHA-1 digest.
pub fn decode_sha1_hex(hex: &str) -> Result<Sha1Digest, HexError> {
    if hex.len() != 40 {
        return Err(HexError::BadLength {
            expected: 40,
            actual: hex.len(),
        });
    }

    let mut out = [0u8; 20];
    let bytes = hex.as_bytes();

    for (i, slot) in out.iter_mut().enumerate() {
        let hi = hex_value(bytes[2 * i] as char)?;
        let lo = hex_value(bytes[2 * i + 1] as char)?;
        *slot = hi << 4 | lo;
    }

    Ok(out)
}

/// Render a digest as lowercase hex.
pub fn encode_sha1_hex(digest: &Sha1Digest) -> String {
    let mut out = String::with_capacity(40);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

fn hex_value(c: char) -> Result<u8, HexError> {
    c.to_digit(16).map(|v| v as u8).ok_or(HexError::BadChar(c))
}

/// An artifact identified purely by content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactDescriptor {
    /// Logical name, for diagnostics only.
    pub name: String,
    /// Expected byte length.
    pub size: u64,
    /// Expected content digest.
    pub sha1: Sha1Digest,
}

impl ArtifactDescriptor {
    pub fn new(name: impl Into<String>, size: u64, sha1: Sha1Digest) -> Self {
        Self {
            name: name.into(),
            size,
            sha1,
        }
    }
}

impl fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}

/// Hash a file's full contents.
pub fn sha1_file(path: &Path) -> io::Result<Sha1Digest> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().into())
}

/// Resolve a single descriptor against candidate directories.
pub fn resolve(
    descriptor: &ArtifactDescriptor,
    candidate_dirs: &[PathBuf],
) -> Result<PathBuf, ResolveError> {
    let index = ArtifactIndex::scan(std::slice::from_ref(descriptor), candidate_dirs)?;
    index
        .path_for(descriptor)
        .map(Path::to_path_buf)
        .ok_or_else(|| ResolveError::NotFound(descriptor.to_string()))
}

/// Answers content-identity queries from one walk per candidate directory.
#[derive(Debug, Default)]
pub struct ArtifactIndex {
    resolved: HashMap<(u64, Sha1Digest), PathBuf>,
}

impl ArtifactIndex {
    /// Walk the candidate directories in order and locate every descriptor.
    ///
    /// Files are visited in sorted order within each directory tree so the
    /// outcome does not depend on filesystem enumeration order. A file is
    /// hashed only when its size matches a descriptor that is still
    /// unresolved. The walk stops early once everything is found.
    pub fn scan(
        descriptors: &[ArtifactDescriptor],
        candidate_dirs: &[PathBuf],
    ) -> Result<Self, ResolveError> {
        if descriptors.is_empty() {
            return Ok(Self::default());
        }

        let mut wanted_sizes: HashMap<u64, usize> = HashMap::new();
        for d in descriptors {
            *wanted_sizes.entry(d.size).or_default() += 1;
        }

        let mut by_identity: HashMap<(u64, Sha1Digest), &ArtifactDescriptor> = HashMap::new();
        for d in descriptors {
            by_identity.entry((d.size, d.sha1)).or_insert(d);
        }

        let mut index = Self::default();

        'dirs: for dir in candidate_dirs {
            debug!(dir = %dir.display(), "scanning for artifacts");

            for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
                let entry = entry.map_err(|source| ResolveError::Walk {
                    path: dir.clone(),
                    source,
                })?;

                if !entry.file_type().is_file() {
                    continue;
                }

                let size = entry
                    .metadata()
                    .map_err(|source| ResolveError::Walk {
                        path: entry.path().to_path_buf(),
                        source,
                    })?
                    .len();

                if !wanted_sizes.contains_key(&size) {
                    continue;
                }

                let digest = sha1_file(entry.path()).map_err(|source| ResolveError::Hash {
                    path: entry.path().to_path_buf(),
                    source,
                })?;

                let key = (size, digest);
                if by_identity.contains_key(&key) && !index.resolved.contains_key(&key) {
                    trace!(path = %entry.path().display(), "artifact located");
                    index.resolved.insert(key, entry.path().to_path_buf());

                    if let Some(count) = wanted_sizes.get_mut(&size) {
                        *count -= 1;
                        if *count == 0 {
                            wanted_sizes.remove(&size);
                        }
                    }

                    if wanted_sizes.is_empty() {
                        break 'dirs;
                    }
                }
            }
        }

        Ok(index)
    }

    /// Path located for a descriptor, if any.
    pub fn path_for(&self, descriptor: &ArtifactDescriptor) -> Option<&Path> {
        self.resolved
            .get(&(descriptor.size, descriptor.sha1))
            .map(PathBuf::as_path)
    }

    /// Resolve every descriptor or fail on the first one that is missing.
    pub fn require_all(
        &self,
        descriptors: &[ArtifactDescriptor],
    ) -> Result<Vec<PathBuf>, ResolveError> {
        descriptors
            .iter()
            .map(|d| {
                self.path_for(d)
                    .map(Path::to_path_buf)
                    .ok_or_else(|| ResolveError::NotFound(d.to_string()))
            })
            .collect()
    }
}

/// Locate files by exact filename, for artifacts that carry no digest
/// (library jars). First match in visitation order wins per name.
pub fn resolve_by_name(
    file_names: &[String],
    candidate_dirs: &[PathBuf],
) -> Result<Vec<PathBuf>, ResolveError> {
    if file_names.is_empty() {
        return Ok(Vec::new());
    }

    let mut found: HashMap<&str, PathBuf> = HashMap::new();

    'dirs: for dir in candidate_dirs {
        for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|source| ResolveError::Walk {
                path: dir.clone(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };

            if let Some(wanted) = file_names.iter().find(|n| n.as_str() == name) {
                found
                    .entry(wanted.as_str())
                    .or_insert_with(|| entry.path().to_path_buf());

                if found.len() == file_names.len() {
                    break 'dirs;
                }
            }
        }
    }

    file_names
        .iter()
        .map(|name| {
            found
                .remove(name.as_str())
                .ok_or_else(|| ResolveError::NotFound(name.clone()))
        })
        .collect()
}
