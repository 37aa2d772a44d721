//! intermediarygen - deterministic intermediary naming and project setup
//!
//! This library drives two independent subsystems of a jar-comparison
//! workflow:
//!
//! 1. **Intermediary generation** - assign stable placeholder names to the
//!    obfuscated classes, methods and fields of one comparison side, with
//!    persisted counters so later runs continue the numbering.
//! 2. **Project setup** - turn two release manifests into resolved input,
//!    classpath and mapping-file paths, locating binaries purely by size and
//!    SHA-1 digest and splitting libraries into shared and exclusive sets.
//!
//! The matching engine that owns the symbol hierarchy, the project
//! configuration store and the mapping reader are external collaborators,
//! reached through the traits in [`symbol`] and [`setup`].

pub mod config;
pub mod counter;
pub mod manifest;
pub mod naming;
pub mod platform;
pub mod reconcile;
pub mod resolver;
pub mod setup;
pub mod symbol;

pub use config::Config;
pub use counter::{CounterError, CounterState};
pub use manifest::{
    parse_manifest, parse_manifest_file, LibraryArtifact, ManifestError, ReleaseArtifacts,
};
pub use naming::{Assignment, GenerationReport, IntermediaryGenerator, NameStore, NamingError};
pub use platform::OsName;
pub use reconcile::{reconcile, ReconciledLibraries};
pub use resolver::{resolve, ArtifactDescriptor, ArtifactIndex, ResolveError};
pub use setup::{setup_project, MappingLoader, ProjectAcceptor, ProjectInputs, SetupError};
pub use symbol::{ClassEntry, Side, SymbolId, SymbolInfo, SymbolKind, SymbolProvider};
