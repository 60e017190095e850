//! gdxtab-core: domain resolution and densification
//!
//! Turns sparse, domain-typed symbols from an exchange source into fully
//! indexed tables:
//!
//! - `catalog`: load-once kind/domain index of a source
//! - `resolve`: recursive set resolution (sets over sets, universal marker)
//! - `extract`: facet-aware numeric extraction from record payloads
//! - `disambiguate`: deterministic renaming of repeated axis labels
//! - `densify`: the orchestrator, cross-product plus fill
//!
//! The in-process semantics implemented here are the canonical contract; the
//! external dump tool (`gdxtab-dump`) only produces raw sparse rows that are
//! normalized through this same path.

pub mod catalog;
pub mod densify;
pub mod disambiguate;
pub mod error;
pub mod extract;
pub mod resolve;

pub use catalog::DomainCatalog;
pub use densify::{densify, Densified};
pub use disambiguate::disambiguate;
pub use error::{GdxError, Result};
pub use extract::{extract, parse_facet};
pub use resolve::{resolve_domain, resolve_set, ResolvedSet, PLACEHOLDER};

use gdxtab_model::{Facet, SymbolSource};

/// Convenience entrypoint: build a catalog for `source` and densify one
/// symbol. `facet` defaults to the level (`"L"`), `fill` to `0.0`.
///
/// Callers looking up many symbols against the same source should build one
/// [`DomainCatalog`] and call [`densify`] directly.
pub fn table_from_source(
    source: &dyn SymbolSource,
    symbol: &str,
    facet: Option<&str>,
    fill: Option<f64>,
) -> Result<Densified> {
    let catalog = DomainCatalog::load(source);
    let facet = match facet {
        Some(spelling) => parse_facet(spelling)?,
        None => Facet::default(),
    };
    densify(&catalog, source, symbol, facet, fill.unwrap_or(0.0))
}
