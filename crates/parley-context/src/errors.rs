//! Error types for the live history store.

use thiserror::Error;

/// Machine-readable code for overlapping or duplicated indices.
pub const DENSITY_CONFLICT: &str = "DENSITY_CONFLICT";
/// Machine-readable code for indices outside `[0, len)`.
pub const DENSITY_INDEX_OUT_OF_BOUNDS: &str = "DENSITY_INDEX_OUT_OF_BOUNDS";
/// Machine-readable code for a stopped token worker.
pub const TOKEN_WORKER_CLOSED: &str = "TOKEN_WORKER_CLOSED";

/// Validation failures for a density result. The history is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DensityError {
    /// An index is both removed and replaced.
    #[error("index {index} is both removed and replaced")]
    Conflict {
        /// The offending index.
        index: i64,
    },

    /// An index is listed more than once in removals.
    #[error("index {index} is removed more than once")]
    DuplicateRemoval {
        /// The offending index.
        index: i64,
    },

    /// An index is negative or not less than the history length.
    #[error("index {index} out of bounds for history of length {len}")]
    IndexOutOfBounds {
        /// The offending index.
        index: i64,
        /// History length at validation time.
        len: usize,
    },
}

impl DensityError {
    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Conflict { .. } | Self::DuplicateRemoval { .. } => DENSITY_CONFLICT,
            Self::IndexOutOfBounds { .. } => DENSITY_INDEX_OUT_OF_BOUNDS,
        }
    }
}

/// Errors from [`HistoryStore`](crate::HistoryStore) operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// A density result failed validation.
    #[error("density edit rejected: {0}")]
    Density(#[from] DensityError),

    /// The background token worker is gone.
    #[error("token recalculation worker stopped")]
    WorkerClosed,
}

impl HistoryError {
    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Density(e) => e.code(),
            Self::WorkerClosed => TOKEN_WORKER_CLOSED,
        }
    }
}
