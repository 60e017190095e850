//! Deterministic renaming of repeated axis labels.
//!
//! Every path that assembles axis names goes through [`disambiguate`], so
//! sets, parameters, variables and equations all share one collision scheme.

use std::collections::HashSet;

/// Make labels unique while preserving order and length.
///
/// Left to right: the first occurrence keeps its name; a repeat gets a
/// zero-padded occurrence suffix (`_01`, `_02`, ...), re-checked until unique.
pub fn disambiguate(labels: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut out = Vec::with_capacity(labels.len());
    for label in labels {
        let mut candidate = label.clone();
        let mut occurrence = 0u32;
        while seen.contains(&candidate) {
            occurrence += 1;
            candidate = format!("{label}_{occurrence:02}");
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
