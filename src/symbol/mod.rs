//! Symbol model shared with the naming engine.
//!
//! The matching engine that owns the actual class hierarchy is an external
//! collaborator; it exposes its symbols to this crate through the
//! [`SymbolProvider`] trait as plain fact records. The naming engine never
//! mutates provider-owned state — generated names live in the engine's own
//! [`crate::naming::NameStore`], which the host queries when it needs to
//! render a symbol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the comparison a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(&self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Class,
    Method,
    Field,
}

impl SymbolKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Method => "method",
            SymbolKind::Field => "field",
        }
    }
}

/// Unique identifier for a symbol within one side of the comparison.
///
/// The provider chooses the encoding; for JVM symbols this is typically the
/// internal class name, optionally followed by a member name and descriptor.
/// The naming engine only compares ids for equality and uses them as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Facts about one symbol, as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Identity on its own side.
    pub id: SymbolId,

    /// Kind of symbol.
    pub kind: SymbolKind,

    /// Current (possibly obfuscated) name, used for display and for the
    /// canonical sort order that fixes numbering.
    pub name: String,

    /// Whether the current name is machine-generated rather than
    /// human-meaningful.
    pub obfuscated: bool,

    /// Human-curated mapped name, if one is known.
    pub mapped_name: Option<String>,

    /// Counterpart symbol on the other side of the comparison, if matched.
    pub matched: Option<SymbolId>,

    /// Symbols linked to this one by override relationships, including the
    /// symbol itself. Every member must receive the identical assigned name.
    /// For fields this is expected to be a singleton.
    pub hierarchy: Vec<SymbolId>,
}

impl SymbolInfo {
    pub fn new(id: SymbolId, kind: SymbolKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            hierarchy: vec![id.clone()],
            id,
            kind,
            name,
            obfuscated: false,
            mapped_name: None,
            matched: None,
        }
    }
}

/// One class with its members, as enumerated by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    pub class: SymbolInfo,
    pub methods: Vec<SymbolInfo>,
    pub fields: Vec<SymbolInfo>,
}

/// Collaborator contract over the external matching engine.
pub trait SymbolProvider {
    /// Enumerate every class on the given side, with its methods and fields.
    /// Order does not matter; the naming engine sorts canonically.
    fn classes(&self, side: Side) -> Vec<ClassEntry>;
}
