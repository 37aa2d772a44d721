//! Library set reconciliation between two releases.
//!
//! Two releases being compared usually share most of their dependency jars.
//! The shared ones go on a common classpath; the rest stay exclusive to
//! their side. Identity is the derived jar filename.

use std::collections::HashSet;

use crate::manifest::LibraryArtifact;

/// The three-way partition of two library sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledLibraries {
    pub common: Vec<LibraryArtifact>,
    pub exclusive_a: Vec<LibraryArtifact>,
    pub exclusive_b: Vec<LibraryArtifact>,
}

/// Split `libs_a` and `libs_b` into common / exclusive-A / exclusive-B.
///
/// Pure set algebra: input order is preserved within each output list
/// (common follows A's order) and duplicates within one input collapse.
pub fn reconcile(libs_a: &[LibraryArtifact], libs_b: &[LibraryArtifact]) -> ReconciledLibraries {
    let set_a: HashSet<&LibraryArtifact> = libs_a.iter().collect();
    let set_b: HashSet<&LibraryArtifact> = libs_b.iter().collect();

    let mut seen = HashSet::new();
    let mut out = ReconciledLibraries::default();

    for lib in libs_a {
        if !seen.insert(lib) {
            continue;
        }

        if set_b.contains(lib) {
            out.common.push(lib.clone());
        } else {
            out.exclusive_a.push(lib.clone());
        }
    }

    seen.clear();

    for lib in libs_b {
        if !seen.insert(lib) {
            continue;
        }

        if !set_a.contains(lib) {
            out.exclusive_b.push(lib.clone());
        }
    }

    out
}
