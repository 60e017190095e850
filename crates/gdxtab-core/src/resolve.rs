//! Recursive set resolution.
//!
//! A set's members come either from its own stored records (base sets whose
//! keys are unconstrained) or from overlaying its stored records onto the
//! cross-product of its parent sets (subsets, resolved recursively). The
//! universal `*` marker has no enumerable members and resolves to a single
//! positional placeholder.

use crate::catalog::DomainCatalog;
use crate::error::{GdxError, Result};
use gdxtab_frame::cross_product;
use gdxtab_model::{DomainEntry, Payload, SymbolKind, SymbolSource};
use std::collections::HashSet;

/// Placeholder key contributed by a universal domain axis. Rows carrying it
/// are scaffolding, dropped from final output when real axes exist.
pub const PLACEHOLDER: &str = "PLACEHOLDER";

/// Result of resolving one set (or one domain entry).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSet {
    /// One label per dimension, as the exchange format spells them (`*` for
    /// universal positions; a one-dimensional base set is named after
    /// itself).
    pub labels: Vec<String>,
    /// Ordered member key tuples, present entries only.
    pub members: Vec<Vec<String>>,
    /// True when the axis cannot be enumerated (universal marker): the
    /// single placeholder member is scaffolding, not a real key.
    pub unresolved: bool,
}

/// Resolve one domain entry of a symbol.
pub fn resolve_domain(
    catalog: &DomainCatalog,
    source: &dyn SymbolSource,
    entry: &DomainEntry,
) -> Result<ResolvedSet> {
    match entry {
        DomainEntry::Universal => Ok(ResolvedSet {
            labels: vec!["*".to_string()],
            members: vec![vec![PLACEHOLDER.to_string()]],
            unresolved: true,
        }),
        DomainEntry::Named(name) => resolve_set(catalog, source, name, &mut Vec::new()),
    }
}

/// Resolve a set symbol to its ordered member key tuples.
///
/// `visited` guards the set-over-set recursion: the source format is acyclic
/// by construction, but a cycle in a corrupt file must surface as
/// [`GdxError::CorruptDomain`] rather than unbounded recursion.
pub fn resolve_set(
    catalog: &DomainCatalog,
    source: &dyn SymbolSource,
    set_name: &str,
    visited: &mut Vec<String>,
) -> Result<ResolvedSet> {
    let key = set_name.to_ascii_lowercase();
    if visited.contains(&key) {
        let mut path: Vec<&str> = visited.iter().map(String::as_str).collect();
        path.push(&key);
        return Err(GdxError::CorruptDomain(format!(
            "set cycle {}",
            path.join(" -> ")
        )));
    }

    let kind = catalog.kind(set_name)?;
    if kind != SymbolKind::Set {
        return Err(GdxError::UnresolvedDomain(set_name.to_string()));
    }
    let sym = source
        .symbol(set_name)
        .ok_or_else(|| GdxError::NotFound(set_name.to_string()))?;

    let labels = set_labels(&sym.name, &sym.domains);

    // Base sets (any universal position): keys are unconstrained, so the
    // stored records *are* the member sequence.
    if sym.domains.iter().any(DomainEntry::is_universal) {
        return Ok(ResolvedSet {
            labels,
            members: present_members(sym),
            unresolved: false,
        });
    }

    // Subset over one or more parent sets: resolve each parent recursively,
    // build the parent cross-product, keep combinations stored as present.
    visited.push(key);
    let mut axes: Vec<Vec<String>> = Vec::with_capacity(sym.domains.len());
    for entry in &sym.domains {
        let parent_name = match entry {
            DomainEntry::Named(name) => name,
            DomainEntry::Universal => unreachable!("universal handled above"),
        };
        let parent = resolve_set(catalog, source, parent_name, visited)?;
        if parent.labels.len() != 1 {
            visited.pop();
            return Err(GdxError::CorruptDomain(format!(
                "domain set `{parent_name}` of `{set_name}` is not one-dimensional"
            )));
        }
        axes.push(parent.members.into_iter().map(|mut t| t.remove(0)).collect());
    }
    visited.pop();

    let present: HashSet<Vec<String>> = present_members(sym).into_iter().collect();
    let members = cross_product(&axes)
        .into_iter()
        .filter(|combo| present.contains(combo))
        .collect();

    Ok(ResolvedSet {
        labels,
        members,
        unresolved: false,
    })
}

/// Axis labels of a set: the declared domain labels, except that a
/// one-dimensional set over the universal domain is named after itself.
fn set_labels(name: &str, domains: &[DomainEntry]) -> Vec<String> {
    if domains.len() == 1 && domains[0].is_universal() {
        vec![name.to_string()]
    } else {
        domains.iter().map(|d| d.label().to_string()).collect()
    }
}

fn present_members(sym: &gdxtab_model::SymbolData) -> Vec<Vec<String>> {
    sym.records
        .iter()
        .filter(|r| matches!(r.payload, Payload::Membership(true)))
        .map(|r| r.keys.clone())
        .collect()
}
