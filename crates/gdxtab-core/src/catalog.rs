//! Domain catalog: kind and domain list of every symbol in a source.
//!
//! Built once per source and reused read-only across resolution calls. The
//! catalog is an explicit value the caller constructs and passes around;
//! there is no implicit global cache.

use crate::error::{GdxError, Result};
use gdxtab_model::{DomainEntry, SymbolKind, SymbolSource};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CatalogEntry {
    kind: SymbolKind,
    domains: Vec<DomainEntry>,
}

/// Read-only index of symbol kinds and domain lists.
///
/// Lookups are case-insensitive, matching the exchange format. Safe to share
/// by reference across threads once loaded.
#[derive(Debug, Clone, Default)]
pub struct DomainCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl DomainCatalog {
    pub fn load(source: &dyn SymbolSource) -> Self {
        let mut entries = HashMap::new();
        for name in source.symbol_names() {
            if let Some(sym) = source.symbol(name) {
                entries.insert(
                    name.to_ascii_lowercase(),
                    CatalogEntry {
                        kind: sym.kind,
                        domains: sym.domains.clone(),
                    },
                );
            }
        }
        DomainCatalog { entries }
    }

    fn entry(&self, symbol: &str) -> Result<&CatalogEntry> {
        self.entries
            .get(&symbol.to_ascii_lowercase())
            .ok_or_else(|| GdxError::NotFound(symbol.to_string()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(&symbol.to_ascii_lowercase())
    }

    pub fn kind(&self, symbol: &str) -> Result<SymbolKind> {
        self.entry(symbol).map(|e| e.kind)
    }

    /// Declared domain list; empty for scalars.
    pub fn domains(&self, symbol: &str) -> Result<&[DomainEntry]> {
        self.entry(symbol).map(|e| e.domains.as_slice())
    }
}
