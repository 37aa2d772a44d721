//! Deterministic intermediary name assignment.
//!
//! Walks one side of a loaded comparison and hands every eligible obfuscated
//! symbol a stable placeholder name (`net/minecraft/class_<n>`, `method_<n>`,
//! `field_<n>`). Numbering is fixed by a canonical name sort, so identical
//! symbol sets always number identically, across process restarts included.
//! Counters persist to a text file (see [`crate::counter`]) and a continuation
//! run picks up where the last one stopped without touching already-named
//! symbols.
//!
//! Generated names never land on the provider's own objects: they go into a
//! [`NameStore`] owned by the caller, which the host queries when rendering.

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::counter::{CounterError, CounterState};
use crate::symbol::{ClassEntry, Side, SymbolId, SymbolInfo, SymbolKind, SymbolProvider};

/// Naming run errors
#[derive(Error, Debug)]
pub enum NamingError {
    #[error("counter file error: {0}")]
    Counter(#[from] CounterError),
    #[error("field {field} has a hierarchy group of {members} members, expected exactly 1")]
    FieldHierarchyNotSingleton { field: SymbolId, members: usize },
}

/// Assigned names, keyed by symbol identity.
///
/// Owned by the host for the lifetime of a comparison; a continuation run
/// sees here whatever earlier runs (or loaded intermediary mappings)
/// produced.
#[derive(Debug, Clone, Default)]
pub struct NameStore {
    names: HashMap<SymbolId, String>,
}

impl NameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &SymbolId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &SymbolId) -> bool {
        self.names.contains_key(id)
    }

    pub fn insert(&mut self, id: SymbolId, name: String) {
        self.names.insert(id, name);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SymbolId, &str)> {
        self.names.iter().map(|(id, name)| (id, name.as_str()))
    }
}

/// One name assignment, for observability and reporting.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub kind: SymbolKind,
    pub id: SymbolId,
    /// Symbol's current (obfuscated) name at assignment time.
    pub old_name: String,
    /// The intermediary name that was assigned.
    pub new_name: String,
    /// Previously known human mapping, if any.
    pub mapped_name: Option<String>,
}

/// Outcome of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub assignments: Vec<Assignment>,
    /// Counter state as persisted at run end (next values to assign).
    pub counters: CounterState,
}

impl GenerationReport {
    pub fn count_of(&self, kind: SymbolKind) -> usize {
        self.assignments.iter().filter(|a| a.kind == kind).count()
    }
}

pub fn class_name(n: u64) -> String {
    format!("net/minecraft/class_{}", n)
}

pub fn method_name(n: u64) -> String {
    format!("method_{}", n)
}

pub fn field_name(n: u64) -> String {
    format!("field_{}", n)
}

/// Intermediary name generator for one side of a comparison.
pub struct IntermediaryGenerator {
    side: Side,
    continued: bool,
    counter_file: PathBuf,
}

impl IntermediaryGenerator {
    /// Fresh run: all counters start at 1.
    pub fn new(side: Side, counter_file: impl Into<PathBuf>) -> Self {
        Self {
            side,
            continued: false,
            counter_file: counter_file.into(),
        }
    }

    /// Continuation run: counters load from the counter file and already
    /// named symbols keep their names.
    pub fn continued(side: Side, counter_file: impl Into<PathBuf>) -> Self {
        Self {
            side,
            continued: true,
            counter_file: counter_file.into(),
        }
    }

    /// Run name generation, writing assignments into `store` and persisting
    /// the counters at the end.
    ///
    /// A counter load failure aborts before any assignment. A counter save
    /// failure surfaces after the assignments were already applied to the
    /// store; a later continuation run re-derives the same state because the
    /// eligibility check skips everything that already holds a name.
    pub fn generate(
        &self,
        provider: &dyn SymbolProvider,
        store: &mut NameStore,
    ) -> Result<GenerationReport, NamingError> {
        let mut counters = if self.continued {
            CounterState::load(&self.counter_file)?
        } else {
            CounterState::default()
        };

        debug!(
            side = %self.side,
            continued = self.continued,
            class = counters.class,
            method = counters.method,
            field = counters.field,
            "starting intermediary generation"
        );

        let mut classes = provider.classes(self.side);
        classes.sort_by(|a, b| canonical_cmp(&a.class, &b.class));

        let mut assignments = Vec::new();

        for entry in &classes {
            self.process_class(entry, &mut counters, store, &mut assignments)?;
        }

        counters.save(&self.counter_file)?;

        info!(
            side = %self.side,
            assigned = assignments.len(),
            "intermediary generation finished"
        );

        Ok(GenerationReport {
            assignments,
            counters,
        })
    }

    fn process_class(
        &self,
        entry: &ClassEntry,
        counters: &mut CounterState,
        store: &mut NameStore,
        assignments: &mut Vec<Assignment>,
    ) -> Result<(), NamingError> {
        if self.eligible(&entry.class, store) {
            let name = class_name(counters.next_class());
            self.assign(&entry.class, name, store, assignments);
        }

        let mut methods: Vec<&SymbolInfo> = entry
            .methods
            .iter()
            .filter(|m| self.eligible(m, store))
            .collect();
        methods.sort_by(|a, b| canonical_cmp(a, b));

        for method in methods {
            let name = method_name(counters.next_method());

            // Every override-related member gets the identical name.
            for member in &method.hierarchy {
                store.insert(member.clone(), name.clone());
            }

            self.trace(method, &name, assignments);
        }

        let mut fields: Vec<&SymbolInfo> = entry
            .fields
            .iter()
            .filter(|f| self.eligible(f, store))
            .collect();
        fields.sort_by(|a, b| canonical_cmp(a, b));

        for field in fields {
            if field.hierarchy.len() != 1 {
                return Err(NamingError::FieldHierarchyNotSingleton {
                    field: field.id.clone(),
                    members: field.hierarchy.len(),
                });
            }

            let name = field_name(counters.next_field());
            self.assign(field, name, store, assignments);
        }

        Ok(())
    }

    /// A symbol needs an intermediary when it is obfuscated and, on a
    /// continuation run, neither it nor its matched counterpart already
    /// carries one.
    fn eligible(&self, info: &SymbolInfo, store: &NameStore) -> bool {
        info.obfuscated
            && (!self.continued
                || (!store.contains(&info.id)
                    && info.matched.as_ref().is_none_or(|m| !store.contains(m))))
    }

    fn assign(
        &self,
        info: &SymbolInfo,
        name: String,
        store: &mut NameStore,
        assignments: &mut Vec<Assignment>,
    ) {
        store.insert(info.id.clone(), name.clone());
        self.trace(info, &name, assignments);
    }

    fn trace(&self, info: &SymbolInfo, name: &str, assignments: &mut Vec<Assignment>) {
        info!(
            kind = info.kind.display_name(),
            old = %info.name,
            new = %name,
            mapped = info.mapped_name.as_deref().unwrap_or(""),
            "assigned intermediary"
        );

        assignments.push(Assignment {
            kind: info.kind,
            id: info.id.clone(),
            old_name: info.name.clone(),
            new_name: name.to_string(),
            mapped_name: info.mapped_name.clone(),
        });
    }
}

/// Canonical ordering that fixes numbering: by current name, then by id so
/// that equal names still order deterministically.
fn canonical_cmp(a: &SymbolInfo, b: &SymbolInfo) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}
