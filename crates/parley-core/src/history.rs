//! History fold primitives.
//!
//! Log replay and the live history store apply the same structural edits to
//! an ordered history. These helpers are generic over the element type so the
//! replay engine can hold plain entries while the live store holds shared
//! (`Arc`) entries without either copying the other's semantics.

/// Replace the whole history with a single summary element.
///
/// Everything accumulated so far, including the summary of any earlier
/// compression, is discarded.
pub fn compress<T>(history: &mut Vec<T>, summary: T) {
    history.clear();
    history.push(summary);
}

/// Remove the last `count` elements, clamping at empty.
///
/// Returns how many elements were actually removed.
pub fn rewind<T>(history: &mut Vec<T>, count: usize) -> usize {
    let removed = count.min(history.len());
    history.truncate(history.len() - removed);
    removed
}
