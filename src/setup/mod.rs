//! Project setup from two release manifests.
//!
//! Parses the manifest for each side, reconciles the two library sets,
//! resolves every artifact against the user-chosen directories, and hands
//! the resolved path lists to the host's project-configuration collaborator.
//! After the project loads, mapping files are fed to the mapping-loader
//! collaborator one at a time, side A first.
//!
//! Any resolution failure aborts the whole flow before a project is created.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::manifest::{parse_manifest_file, ManifestError, ReleaseArtifacts};
use crate::platform::OsName;
use crate::reconcile::{reconcile, ReconciledLibraries};
use crate::resolver::{resolve_by_name, ArtifactIndex, ResolveError};
use crate::symbol::Side;

/// Classes outside the root package are assumed non-obfuscated.
pub const NON_OBFUSCATED_CLASS_PATTERN: &str = ".+/.+";

/// Setup errors
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("project creation failed: {0}")]
    Project(#[source] anyhow::Error),
    #[error("failed to load mappings from {path}: {source}")]
    MappingLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Resolved path lists for one comparison project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectInputs {
    pub inputs_a: Vec<PathBuf>,
    pub inputs_b: Vec<PathBuf>,
    pub classpath_a: Vec<PathBuf>,
    pub classpath_b: Vec<PathBuf>,
    pub shared_classpath: Vec<PathBuf>,
    pub mappings_a: Vec<PathBuf>,
    pub mappings_b: Vec<PathBuf>,
    /// Regex for classes whose names are known not to be obfuscated.
    pub non_obfuscated_class_pattern: String,
}

/// Mapping file format hint for the loader collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFormat {
    Proguard,
}

/// Namespace selection hint for a mapping read: which column to use when a
/// file does not label its namespaces explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceHint {
    SourceFallback,
    TargetFallback,
}

/// Naming slot a mapping read populates or consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingField {
    /// The symbol's plain (current) name.
    Plain,
    /// The auxiliary slot reserved for imported release mappings.
    Auxiliary,
}

/// One mapping file to load into the comparison.
#[derive(Debug, Clone)]
pub struct MappingJob {
    pub path: PathBuf,
    pub side: Side,
    pub format: MappingFormat,
    /// Namespace to read original names from.
    pub source_namespace: NamespaceHint,
    /// Namespace to read mapped names from.
    pub target_namespace: NamespaceHint,
    /// Naming field the source names are matched against.
    pub source_field: NamingField,
    /// Naming field that receives the mapped names.
    pub target_field: NamingField,
}

/// Collaborator that persists the project configuration and loads the jars.
/// Returns whether the project actually loaded; `false` is a clean decline
/// (mappings are then skipped), an error aborts.
pub trait ProjectAcceptor {
    fn create_project(&mut self, inputs: &ProjectInputs) -> Result<bool, anyhow::Error>;
}

/// Collaborator that reads a mapping file into the loaded comparison.
pub trait MappingLoader {
    fn load(&mut self, job: &MappingJob) -> Result<(), anyhow::Error>;
}

/// Set up a comparison project from two manifest files.
///
/// Returns the resolved inputs that were handed to the acceptor.
pub fn setup_project(
    manifest_a: &Path,
    manifest_b: &Path,
    input_dirs: &[PathBuf],
    os: OsName,
    acceptor: &mut dyn ProjectAcceptor,
    mapping_loader: &mut dyn MappingLoader,
) -> Result<ProjectInputs, SetupError> {
    let artifacts_a = parse_manifest_file(manifest_a, os)?;
    let artifacts_b = parse_manifest_file(manifest_b, os)?;

    let libs = reconcile(&artifacts_a.libraries, &artifacts_b.libraries);
    log_reconciliation(&libs);

    let inputs = resolve_inputs(&artifacts_a, &artifacts_b, &libs, input_dirs)?;

    let loaded = acceptor
        .create_project(&inputs)
        .map_err(SetupError::Project)?;

    if !loaded {
        info!("project was not loaded, skipping mapping import");
        return Ok(inputs);
    }

    // One file at a time, side A first. The upstream mapping files are
    // ProGuard obfuscation maps.
    for side in [Side::A, Side::B] {
        let paths = match side {
            Side::A => &inputs.mappings_a,
            Side::B => &inputs.mappings_b,
        };

        for path in paths {
            // ProGuard maps run named -> obfuscated, so the namespaces read
            // reversed; the names land in the auxiliary slot, keeping the
            // plain names untouched.
            let job = MappingJob {
                path: path.clone(),
                side,
                format: MappingFormat::Proguard,
                source_namespace: NamespaceHint::TargetFallback,
                target_namespace: NamespaceHint::SourceFallback,
                source_field: NamingField::Plain,
                target_field: NamingField::Auxiliary,
            };

            mapping_loader
                .load(&job)
                .map_err(|source| SetupError::MappingLoad {
                    path: path.clone(),
                    source,
                })?;
        }
    }

    Ok(inputs)
}

/// Resolve every descriptor set against the candidate directories.
///
/// All hash-verified descriptors from both sides share one directory walk;
/// library jars resolve by derived filename.
fn resolve_inputs(
    artifacts_a: &ReleaseArtifacts,
    artifacts_b: &ReleaseArtifacts,
    libs: &ReconciledLibraries,
    input_dirs: &[PathBuf],
) -> Result<ProjectInputs, SetupError> {
    let mut all_hashed = Vec::new();
    all_hashed.extend_from_slice(&artifacts_a.primary);
    all_hashed.extend_from_slice(&artifacts_a.mappings);
    all_hashed.extend_from_slice(&artifacts_b.primary);
    all_hashed.extend_from_slice(&artifacts_b.mappings);

    let index = ArtifactIndex::scan(&all_hashed, input_dirs)?;

    let lib_names = |set: &[crate::manifest::LibraryArtifact]| -> Vec<String> {
        set.iter().map(|l| l.file_name.clone()).collect()
    };

    let inputs = ProjectInputs {
        inputs_a: index.require_all(&artifacts_a.primary)?,
        inputs_b: index.require_all(&artifacts_b.primary)?,
        classpath_a: resolve_by_name(&lib_names(&libs.exclusive_a), input_dirs)?,
        classpath_b: resolve_by_name(&lib_names(&libs.exclusive_b), input_dirs)?,
        shared_classpath: resolve_by_name(&lib_names(&libs.common), input_dirs)?,
        mappings_a: index.require_all(&artifacts_a.mappings)?,
        mappings_b: index.require_all(&artifacts_b.mappings)?,
        non_obfuscated_class_pattern: NON_OBFUSCATED_CLASS_PATTERN.to_string(),
    };

    debug!(
        inputs_a = inputs.inputs_a.len(),
        inputs_b = inputs.inputs_b.len(),
        mappings_a = inputs.mappings_a.len(),
        mappings_b = inputs.mappings_b.len(),
        "all artifacts resolved"
    );

    Ok(inputs)
}

fn log_reconciliation(libs: &ReconciledLibraries) {
    debug!(
        common = libs.common.len(),
        exclusive_a = libs.exclusive_a.len(),
        exclusive_b = libs.exclusive_b.len(),
        "library sets reconciled"
    );
}
