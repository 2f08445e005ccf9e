//! # parley-context
//!
//! The live-session counterpart of log replay: an in-memory history that
//! applies the same fold semantics incrementally, plus batched density
//! edits and serialized token accounting.
//!
//! - [`HistoryStore`]: raw and curated history, compress / rewind, density edits
//! - [`DensityResult`]: removals + replacements validated as one transaction
//! - [`TokenCounter`] / [`CharEstimator`]: pluggable token counting
//! - [`TokenTracker`]: single-consumer recalculation worker

#![deny(unsafe_code)]

pub mod density;
pub mod errors;
pub mod history_store;
pub mod token_counter;
pub mod token_tracker;

pub use density::{DensityApplied, DensityResult, apply_density};
pub use errors::{DENSITY_CONFLICT, DENSITY_INDEX_OUT_OF_BOUNDS, DensityError, HistoryError};
pub use history_store::{HistoryStore, HistoryStoreConfig};
pub use token_counter::{CharEstimator, TokenCounter};
pub use token_tracker::TokenTracker;
