//! Symbol data model for gdxtab
//!
//! Models the contents of a GDX-style tabular exchange source:
//! - Symbols (sets, parameters, variables, equations, aliases)
//! - Domains (named set references or the universal `*` marker)
//! - Sparse records (key tuples plus kind-dependent payloads)
//!
//! The binary exchange format itself is deliberately *not* parsed here. The
//! reader is an external collaborator, abstracted behind [`SymbolSource`];
//! [`MemoryDatabase`] is the in-process implementation, loadable from a JSON
//! snapshot for file-backed use.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

// ============================================================================
// Symbol kinds and domains
// ============================================================================

/// Kind of a symbol in the exchange source.
///
/// `Alias` exists in the format but is not densifiable; requesting one
/// surfaces as a recoverable `UnsupportedKind` downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Set,
    Parameter,
    Variable,
    Equation,
    Alias,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Set => "set",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Variable => "variable",
            SymbolKind::Equation => "equation",
            SymbolKind::Alias => "alias",
        };
        f.write_str(s)
    }
}

/// One entry of a symbol's declared domain list.
///
/// Kept as a tagged enum rather than a `"*"` string sentinel so downstream
/// logic cannot mismatch on marker spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEntry {
    /// Reference to another symbol of kind `Set`.
    Named(String),
    /// The universal/untyped marker (`*` in the exchange format): no
    /// enumerable member list, contributes only a positional placeholder.
    Universal,
}

impl DomainEntry {
    pub fn named(name: impl Into<String>) -> Self {
        DomainEntry::Named(name.into())
    }

    /// Domain label as the exchange format spells it.
    pub fn label(&self) -> &str {
        match self {
            DomainEntry::Named(name) => name,
            DomainEntry::Universal => "*",
        }
    }

    pub fn is_universal(&self) -> bool {
        matches!(self, DomainEntry::Universal)
    }
}

// ============================================================================
// Facets (value attributes of variable/equation records)
// ============================================================================

/// Which numeric attribute of a variable/equation record to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facet {
    Level,
    Marginal,
    Lower,
    Upper,
    Scale,
}

impl Facet {
    /// Case-insensitive facet parsing; `None` for unknown spellings.
    pub fn parse(s: &str) -> Option<Facet> {
        match s.to_ascii_uppercase().as_str() {
            "L" => Some(Facet::Level),
            "M" => Some(Facet::Marginal),
            "LO" => Some(Facet::Lower),
            "UP" => Some(Facet::Upper),
            "SCALE" => Some(Facet::Scale),
            _ => None,
        }
    }
}

impl Default for Facet {
    fn default() -> Self {
        Facet::Level
    }
}

// ============================================================================
// Records
// ============================================================================

/// The five numeric fields stored for each variable/equation record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarFields {
    pub level: f64,
    pub marginal: f64,
    pub lower: f64,
    pub upper: f64,
    pub scale: f64,
}

impl VarFields {
    pub fn level(level: f64) -> Self {
        VarFields {
            level,
            marginal: 0.0,
            lower: 0.0,
            upper: 0.0,
            scale: 1.0,
        }
    }

    pub fn facet(&self, facet: Facet) -> f64 {
        match facet {
            Facet::Level => self.level,
            Facet::Marginal => self.marginal,
            Facet::Lower => self.lower,
            Facet::Upper => self.upper,
            Facet::Scale => self.scale,
        }
    }
}

/// Kind-dependent payload of one stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Set membership flag. Sparse sets normally store only `true` entries.
    Membership(bool),
    /// Parameter value.
    Value(f64),
    /// Variable/equation fields.
    Fields(VarFields),
}

/// One sparse record: a key tuple (one key per dimension) plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub keys: Vec<String>,
    pub payload: Payload,
}

// ============================================================================
// Symbols and the source abstraction
// ============================================================================

/// A named symbol: kind, ordered domain list, and its sparse records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolData {
    pub name: String,
    pub kind: SymbolKind,
    pub domains: Vec<DomainEntry>,
    pub records: Vec<Record>,
}

impl SymbolData {
    pub fn new(name: impl Into<String>, kind: SymbolKind, domains: Vec<DomainEntry>) -> Self {
        SymbolData {
            name: name.into(),
            kind,
            domains,
            records: Vec::new(),
        }
    }

    /// Dimension = length of the declared domain list (0 for scalars).
    pub fn dimension(&self) -> usize {
        self.domains.len()
    }

    /// Mark a member tuple present (set symbols).
    pub fn push_member<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.records.push(Record {
            keys: keys.into_iter().map(Into::into).collect(),
            payload: Payload::Membership(true),
        });
        self
    }

    /// Store a parameter value at a key tuple.
    pub fn push_value<I, S>(&mut self, keys: I, value: f64) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.records.push(Record {
            keys: keys.into_iter().map(Into::into).collect(),
            payload: Payload::Value(value),
        });
        self
    }

    /// Store variable/equation fields at a key tuple.
    pub fn push_fields<I, S>(&mut self, keys: I, fields: VarFields) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.records.push(Record {
            keys: keys.into_iter().map(Into::into).collect(),
            payload: Payload::Fields(fields),
        });
        self
    }
}

/// Opaque exchange source: symbol listing plus per-symbol data.
///
/// Symbol lookup is case-insensitive, matching the exchange format's own
/// name handling.
pub trait SymbolSource {
    /// Symbol names in source order.
    fn symbol_names(&self) -> Vec<&str>;

    /// Look up one symbol by (case-insensitive) name.
    fn symbol(&self, name: &str) -> Option<&SymbolData>;
}

// ============================================================================
// In-memory database
// ============================================================================

/// Insertion-ordered in-memory implementation of [`SymbolSource`].
///
/// Serializes to/from a JSON snapshot (a plain list of symbols) so databases
/// can be persisted and handed to the CLI without the binary reader.
#[derive(Debug, Default, Clone)]
pub struct MemoryDatabase {
    symbols: Vec<SymbolData>,
    by_name: HashMap<String, usize>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol, replacing any previous symbol of the same name.
    pub fn add_symbol(&mut self, symbol: SymbolData) -> &mut SymbolData {
        let key = symbol.name.to_ascii_lowercase();
        match self.by_name.get(&key) {
            Some(&idx) => {
                self.symbols[idx] = symbol;
                &mut self.symbols[idx]
            }
            None => {
                let idx = self.symbols.len();
                self.by_name.insert(key, idx);
                self.symbols.push(symbol);
                &mut self.symbols[idx]
            }
        }
    }

    pub fn add_set(&mut self, name: &str, domains: Vec<DomainEntry>) -> &mut SymbolData {
        self.add_symbol(SymbolData::new(name, SymbolKind::Set, domains))
    }

    pub fn add_parameter(&mut self, name: &str, domains: Vec<DomainEntry>) -> &mut SymbolData {
        self.add_symbol(SymbolData::new(name, SymbolKind::Parameter, domains))
    }

    pub fn add_variable(&mut self, name: &str, domains: Vec<DomainEntry>) -> &mut SymbolData {
        self.add_symbol(SymbolData::new(name, SymbolKind::Variable, domains))
    }

    pub fn add_equation(&mut self, name: &str, domains: Vec<DomainEntry>) -> &mut SymbolData {
        self.add_symbol(SymbolData::new(name, SymbolKind::Equation, domains))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolData> {
        self.symbols.iter()
    }

    /// Load a database from a JSON snapshot on disk.
    pub fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let symbols: Vec<SymbolData> = serde_json::from_str(&text)?;
        let mut db = MemoryDatabase::new();
        for symbol in symbols {
            db.add_symbol(symbol);
        }
        Ok(db)
    }

    /// Write the database as a JSON snapshot.
    pub fn save_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(&self.symbols)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }
}

impl SymbolSource for MemoryDatabase {
    fn symbol_names(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.name.as_str()).collect()
    }

    fn symbol(&self, name: &str) -> Option<&SymbolData> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&idx| &self.symbols[idx])
    }
}
