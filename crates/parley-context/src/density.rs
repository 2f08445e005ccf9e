//! Density results: batched replace + remove edits over an ordered history.
//!
//! An edit is validated completely before anything changes, then applied in
//! two steps:
//! 1. Replacements, in place by index. Untouched elements are never moved
//!    out of their slot, so they keep their identity.
//! 2. Removals, in descending index order so earlier removals don't shift
//!    later ones.

use std::collections::{BTreeMap, HashSet};

use parley_core::ContentEntry;
use serde_json::{Map, Value};

use crate::errors::DensityError;

/// A batched edit produced by a context-density pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DensityResult {
    /// Indices to remove.
    pub removals: Vec<i64>,
    /// Index → replacement entry.
    pub replacements: BTreeMap<i64, ContentEntry>,
    /// Free-form description of the pass that produced the edit.
    pub metadata: Map<String, Value>,
}

impl DensityResult {
    /// Empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a removal.
    #[must_use]
    pub fn remove(mut self, index: i64) -> Self {
        self.removals.push(index);
        self
    }

    /// Add a replacement.
    #[must_use]
    pub fn replace(mut self, index: i64, entry: ContentEntry) -> Self {
        let _ = self.replacements.insert(index, entry);
        self
    }

    /// Attach a metadata value.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        let _ = self.metadata.insert(key.into(), value);
        self
    }

    /// Whether the edit changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.replacements.is_empty()
    }
}

/// Summary of an applied edit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DensityApplied {
    /// Entries replaced in place.
    pub replaced: usize,
    /// Entries removed.
    pub removed: usize,
    /// Metadata carried by the result.
    pub metadata: Map<String, Value>,
}

/// Validate index sets against a history of length `len`.
///
/// Checks run in order: removal/replacement conflict, duplicate removal,
/// then bounds. Returns removal positions sorted descending.
pub fn validate<T>(
    removals: &[i64],
    replacements: &BTreeMap<i64, T>,
    len: usize,
) -> Result<Vec<usize>, DensityError> {
    if let Some(&index) = removals.iter().find(|i| replacements.contains_key(*i)) {
        return Err(DensityError::Conflict { index });
    }

    let mut seen = HashSet::with_capacity(removals.len());
    if let Some(&index) = removals.iter().find(|i| !seen.insert(**i)) {
        return Err(DensityError::DuplicateRemoval { index });
    }

    for &index in replacements.keys() {
        let _ = checked_index(index, len)?;
    }
    let mut positions = removals
        .iter()
        .map(|&index| checked_index(index, len))
        .collect::<Result<Vec<_>, _>>()?;
    positions.sort_unstable_by(|a, b| b.cmp(a));
    Ok(positions)
}

/// Validate and apply an edit to `history`. On error nothing is changed.
///
/// Returns `(replaced, removed)` counts.
pub fn apply_density<T>(
    history: &mut Vec<T>,
    removals: &[i64],
    replacements: BTreeMap<i64, T>,
) -> Result<(usize, usize), DensityError> {
    let len = history.len();
    let removal_positions = validate(removals, &replacements, len)?;

    let replaced = replacements.len();
    for (index, value) in replacements {
        let slot = checked_index(index, len)?;
        history[slot] = value;
    }
    for &position in &removal_positions {
        let _ = history.remove(position);
    }
    Ok((replaced, removal_positions.len()))
}

fn checked_index(index: i64, len: usize) -> Result<usize, DensityError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(DensityError::IndexOutOfBounds { index, len })
}
