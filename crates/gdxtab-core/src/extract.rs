//! Facet-aware value extraction from stored record payloads.

use crate::error::{GdxError, Result};
use gdxtab_model::{Facet, Payload};

/// Numeric value of a payload under the requested facet.
///
/// Parameters carry a single value and ignore the facet; variable/equation
/// payloads select the facet field. Set membership payloads have no numeric
/// value and yield `None`.
pub fn extract(payload: &Payload, facet: Facet) -> Option<f64> {
    match payload {
        Payload::Value(v) => Some(*v),
        Payload::Fields(fields) => Some(fields.facet(facet)),
        Payload::Membership(_) => None,
    }
}

/// Parse a facet string (case-insensitive) into a [`Facet`], surfacing
/// unknown spellings as [`GdxError::InvalidFacet`].
pub fn parse_facet(s: &str) -> Result<Facet> {
    Facet::parse(s).ok_or_else(|| GdxError::InvalidFacet(s.to_string()))
}
