//! Multi-level indexed table container for gdxtab
//!
//! A deliberately small stand-in for a dataframe library:
//! - [`MultiIndex`]: ordered, named, multi-level row index
//! - [`Frame`]: an index plus exactly one named value column
//! - cross-product construction, keyed cell assignment, row filtering, and
//!   best-effort integer casting of index levels
//!
//! Densification (the cross-product/fill logic itself) lives in
//! `gdxtab-core`; this crate only provides the container operations it needs.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Index keys
// ============================================================================

/// One key on one index level: a string label or an integer.
///
/// Axes start out as strings; [`Frame::cast_index_to_int`] converts a whole
/// level to integers when every key on it parses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl Key {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            Key::Int(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{i}"),
        }
    }
}

/// One cell of the value column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Num(f64),
    Bool(bool),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Num(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ============================================================================
// MultiIndex
// ============================================================================

/// Ordered multi-level row index with one name per level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiIndex {
    names: Vec<String>,
    tuples: Vec<Vec<Key>>,
}

impl MultiIndex {
    /// Index from explicit key tuples. Every tuple must match the level count.
    pub fn from_tuples(names: Vec<String>, tuples: Vec<Vec<String>>) -> Self {
        let nlevels = names.len();
        debug_assert!(tuples.iter().all(|t| t.len() == nlevels));
        MultiIndex {
            names,
            tuples: tuples
                .into_iter()
                .map(|t| t.into_iter().map(Key::Str).collect())
                .collect(),
        }
    }

    /// Cross-product index: the Cartesian product of per-level member lists,
    /// preserving per-level order, rightmost level varying fastest.
    pub fn from_product(axes: &[(String, Vec<String>)]) -> Self {
        let names = axes.iter().map(|(name, _)| name.clone()).collect();
        let members: Vec<Vec<String>> = axes.iter().map(|(_, m)| m.clone()).collect();
        let tuples = cross_product(&members)
            .into_iter()
            .map(|tuple| tuple.into_iter().map(Key::Str).collect())
            .collect();
        MultiIndex { names, tuples }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn nlevels(&self) -> usize {
        self.names.len()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn tuples(&self) -> &[Vec<Key>] {
        &self.tuples
    }
}

// ============================================================================
// Frame
// ============================================================================

/// A multi-indexed table with a single named value column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    index: MultiIndex,
    column: String,
    values: Vec<CellValue>,
    /// Row lookup by the original string form of each key tuple. Built at
    /// construction; assignment addresses rows through this map, so casting
    /// levels to integers later does not disturb it.
    #[serde(skip)]
    positions: HashMap<Vec<String>, usize>,
}

impl Frame {
    /// Frame over `index` with every cell initialized to `fill`.
    pub fn filled(index: MultiIndex, column: impl Into<String>, fill: CellValue) -> Self {
        let values = vec![fill; index.len()];
        Frame::from_values(index, column, values)
    }

    /// Frame from an index and one value per index tuple.
    pub fn from_values(index: MultiIndex, column: impl Into<String>, values: Vec<CellValue>) -> Self {
        debug_assert_eq!(index.len(), values.len());
        let positions = build_positions(&index);
        Frame {
            index,
            column: column.into(),
            values,
            positions,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn index(&self) -> &MultiIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write a value into the cell addressed by a key tuple. Returns `false`
    /// (and writes nothing) when the tuple has no row in the index.
    pub fn set(&mut self, keys: &[String], value: CellValue) -> bool {
        match self.positions.get(keys) {
            Some(&row) => {
                self.values[row] = value;
                true
            }
            None => false,
        }
    }

    /// Read the cell addressed by a key tuple (original string keys).
    pub fn get(&self, keys: &[String]) -> Option<&CellValue> {
        self.positions.get(keys).map(|&row| &self.values[row])
    }

    /// Iterate rows as (key tuple, value).
    pub fn rows(&self) -> impl Iterator<Item = (&[Key], &CellValue)> {
        self.index
            .tuples
            .iter()
            .map(|t| t.as_slice())
            .zip(self.values.iter())
    }

    /// Drop every row whose key on any of the given levels equals `key`.
    /// Rebuilds the row lookup afterwards.
    pub fn drop_rows_where(&mut self, levels: &[usize], key: &str) {
        let keep: Vec<bool> = self
            .index
            .tuples
            .iter()
            .map(|tuple| {
                !levels
                    .iter()
                    .any(|&level| tuple[level].as_str() == Some(key))
            })
            .collect();

        let mut tuples = Vec::new();
        let mut values = Vec::new();
        for (i, tuple) in self.index.tuples.iter().enumerate() {
            if keep[i] {
                tuples.push(tuple.clone());
                values.push(self.values[i]);
            }
        }
        self.index.tuples = tuples;
        self.values = values;
        self.positions = build_positions(&self.index);
    }

    /// Best-effort integer casting: any level where *every* key parses as an
    /// integer is converted to `Key::Int`, names preserved. Mixed levels are
    /// left untouched; this never fails.
    pub fn cast_index_to_int(&mut self) {
        for level in 0..self.index.nlevels() {
            let parsed: Option<Vec<i64>> = self
                .index
                .tuples
                .iter()
                .map(|tuple| match &tuple[level] {
                    Key::Str(s) => s.parse::<i64>().ok(),
                    Key::Int(i) => Some(*i),
                })
                .collect();
            if self.index.tuples.is_empty() {
                continue;
            }
            if let Some(ints) = parsed {
                for (tuple, int) in self.index.tuples.iter_mut().zip(ints) {
                    tuple[level] = Key::Int(int);
                }
            }
        }
    }

    /// Sum of the value column (`true` counts as 1).
    pub fn column_sum(&self) -> f64 {
        self.values
            .iter()
            .map(|v| match v {
                CellValue::Num(x) => *x,
                CellValue::Bool(b) => {
                    if *b {
                        1.0
                    } else {
                        0.0
                    }
                }
            })
            .sum()
    }
}

/// Order-preserving Cartesian product of per-axis member lists, rightmost
/// axis varying fastest. The single product routine behind both
/// [`MultiIndex::from_product`] and recursive set resolution.
pub fn cross_product(axes: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = vec![Vec::new()];
    for axis in axes {
        let mut next = Vec::with_capacity(out.len() * axis.len());
        for prefix in &out {
            for member in axis {
                let mut combo = prefix.clone();
                combo.push(member.clone());
                next.push(combo);
            }
        }
        out = next;
    }
    out
}

fn build_positions(index: &MultiIndex) -> HashMap<Vec<String>, usize> {
    let mut positions = HashMap::with_capacity(index.len());
    for (row, tuple) in index.tuples.iter().enumerate() {
        let string_form: Vec<String> = tuple.iter().map(|k| k.to_string()).collect();
        positions.insert(string_form, row);
    }
    positions
}
