//! Densification: sparse records onto the full domain cross-product.
//!
//! `densify` is the orchestrator tying the catalog, the set resolver, the
//! value extractor and the name disambiguator together. Scalars come back as
//! bare numbers; everything else as a [`Frame`] over the resolved index with
//! unobserved combinations filled by the caller's default.

use crate::catalog::DomainCatalog;
use crate::disambiguate::disambiguate;
use crate::error::{GdxError, Result};
use crate::extract::extract;
use crate::resolve::{resolve_domain, resolve_set, PLACEHOLDER};
use gdxtab_frame::{CellValue, Frame, MultiIndex};
use gdxtab_model::{DomainEntry, Facet, SymbolData, SymbolKind, SymbolSource};

/// Densification output: a bare number for scalar symbols, otherwise a
/// multi-indexed table with one value column named after the symbol.
#[derive(Debug, Clone)]
pub enum Densified {
    Scalar(f64),
    Table(Frame),
}

impl Densified {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Densified::Scalar(v) => Some(*v),
            Densified::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Frame> {
        match self {
            Densified::Scalar(_) => None,
            Densified::Table(frame) => Some(frame),
        }
    }
}

/// Densify one symbol from `source` against a pre-built catalog.
///
/// `facet` selects the variable/equation attribute (ignored for parameters
/// and sets); `fill` is written into every combination with no stored record.
pub fn densify(
    catalog: &DomainCatalog,
    source: &dyn SymbolSource,
    symbol: &str,
    facet: Facet,
    fill: f64,
) -> Result<Densified> {
    let kind = catalog.kind(symbol)?;
    let sym = source
        .symbol(symbol)
        .ok_or_else(|| GdxError::NotFound(symbol.to_string()))?;
    tracing::debug!(symbol = %sym.name, %kind, dimension = sym.dimension(), "densify");

    match kind {
        SymbolKind::Set => densify_set(catalog, source, sym),
        SymbolKind::Parameter | SymbolKind::Variable | SymbolKind::Equation => {
            densify_numeric(catalog, source, sym, facet, fill)
        }
        SymbolKind::Alias => Err(GdxError::UnsupportedKind {
            symbol: sym.name.clone(),
            kind,
        }),
    }
}

/// Set output: the resolved present members as rows, boolean column.
fn densify_set(
    catalog: &DomainCatalog,
    source: &dyn SymbolSource,
    sym: &SymbolData,
) -> Result<Densified> {
    let resolved = resolve_set(catalog, source, &sym.name, &mut Vec::new())?;
    let labels = disambiguate(&replace_stars(resolved.labels));
    let count = resolved.members.len();
    let index = MultiIndex::from_tuples(labels, resolved.members);
    let mut frame = Frame::from_values(index, sym.name.clone(), vec![CellValue::Bool(true); count]);
    frame.cast_index_to_int();
    Ok(Densified::Table(frame))
}

fn densify_numeric(
    catalog: &DomainCatalog,
    source: &dyn SymbolSource,
    sym: &SymbolData,
    facet: Facet,
    fill: f64,
) -> Result<Densified> {
    // Scalars bypass index construction entirely.
    if sym.dimension() == 0 {
        let value = sym
            .records
            .first()
            .and_then(|r| extract(&r.payload, facet))
            .unwrap_or(fill);
        return Ok(Densified::Scalar(value));
    }

    let raw_labels: Vec<String> = sym.domains.iter().map(|d| d.label().to_string()).collect();
    let labels = disambiguate(&replace_stars(raw_labels));

    // Symbols with no stored records densify to an empty table carrying the
    // correct axis names.
    if sym.records.is_empty() {
        let index = MultiIndex::from_tuples(labels, Vec::new());
        return Ok(Densified::Table(Frame::from_values(
            index,
            sym.name.clone(),
            Vec::new(),
        )));
    }

    // All-universal domains cannot be enumerated: index the distinct stored
    // key tuples positionally instead of building a synthetic cross-product.
    if sym.domains.iter().all(DomainEntry::is_universal) {
        return densify_unresolved(sym, labels, facet, fill);
    }

    let mut axes: Vec<(String, Vec<String>)> = Vec::with_capacity(sym.domains.len());
    let mut placeholder_levels: Vec<usize> = Vec::new();
    for (level, entry) in sym.domains.iter().enumerate() {
        let resolved = resolve_domain(catalog, source, entry)?;
        if resolved.unresolved {
            placeholder_levels.push(level);
        } else if resolved.labels.len() != 1 {
            return Err(GdxError::CorruptDomain(format!(
                "domain set `{}` of `{}` is not one-dimensional",
                entry.label(),
                sym.name
            )));
        }
        let members = resolved
            .members
            .into_iter()
            .map(|mut tuple| tuple.remove(0))
            .collect();
        axes.push((labels[level].clone(), members));
    }

    let index = MultiIndex::from_product(&axes);
    let mut frame = Frame::filled(index, sym.name.clone(), CellValue::Num(fill));

    // Overlay the sparse records. Tuples without a matching cell (possible
    // when a universal marker was involved upstream) are skipped.
    for record in &sym.records {
        if let Some(value) = extract(&record.payload, facet) {
            frame.set(&record.keys, CellValue::Num(value));
        }
    }

    // Placeholder rows are scaffolding, not valid combinations.
    if !placeholder_levels.is_empty() {
        frame.drop_rows_where(&placeholder_levels, PLACEHOLDER);
    }

    frame.cast_index_to_int();
    Ok(Densified::Table(frame))
}

/// Fallback for fully-universal domains: label dimensions positionally and
/// index the distinct stored key tuples in first-seen order.
fn densify_unresolved(
    sym: &SymbolData,
    labels: Vec<String>,
    facet: Facet,
    fill: f64,
) -> Result<Densified> {
    let mut tuples: Vec<Vec<String>> = Vec::with_capacity(sym.records.len());
    for record in &sym.records {
        if !tuples.contains(&record.keys) {
            tuples.push(record.keys.clone());
        }
    }

    let index = MultiIndex::from_tuples(labels, tuples);
    let mut frame = Frame::filled(index, sym.name.clone(), CellValue::Num(fill));
    for record in &sym.records {
        if let Some(value) = extract(&record.payload, facet) {
            frame.set(&record.keys, CellValue::Num(value));
        }
    }
    frame.cast_index_to_int();
    Ok(Densified::Table(frame))
}

/// Positional names for universal domain labels: `*` at position `i`
/// becomes `Dim{i+1}`.
fn replace_stars(labels: Vec<String>) -> Vec<String> {
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            if label == "*" {
                format!("Dim{}", i + 1)
            } else {
                label
            }
        })
        .collect()
}
