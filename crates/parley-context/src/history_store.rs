//! Live conversation history with transactional density edits.
//!
//! [`HistoryStore`] holds entries as `Arc<ContentEntry>`: edits move whole
//! entries in and out of the sequence and never mutate one in place, so an
//! entry not touched by an edit is the very same allocation afterwards.
//!
//! Every mutation schedules a token recalculation on the store's
//! [`TokenTracker`]. Callers that need an exact total await
//! [`HistoryStore::wait_for_token_updates`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parley_core::{ContentEntry, history};
use parley_events::ReplayOutcome;
use parley_settings::HistorySettings;
use tracing::debug;

use crate::density::{DensityApplied, DensityResult, apply_density};
use crate::errors::HistoryError;
use crate::token_counter::{CharEstimator, TokenCounter};
use crate::token_tracker::TokenTracker;

/// Configuration for [`HistoryStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryStoreConfig {
    /// Ratio for the default [`CharEstimator`].
    pub chars_per_token: usize,
}

impl Default for HistoryStoreConfig {
    fn default() -> Self {
        Self { chars_per_token: 4 }
    }
}

impl HistoryStoreConfig {
    /// Config from loaded settings.
    pub fn from_settings(settings: &HistorySettings) -> Self {
        Self {
            chars_per_token: settings.chars_per_token,
        }
    }
}

/// In-memory history for a running session.
///
/// Single writer: every mutation takes `&mut self`. Must be created inside a
/// Tokio runtime.
pub struct HistoryStore {
    entries: Vec<Arc<ContentEntry>>,
    tokens: TokenTracker,
    generation: u64,
}

impl HistoryStore {
    /// Empty store with default config.
    pub fn new() -> Self {
        Self::with_config(HistoryStoreConfig::default())
    }

    /// Empty store using a [`CharEstimator`] built from `config`.
    pub fn with_config(config: HistoryStoreConfig) -> Self {
        Self::with_counter(Arc::new(CharEstimator::new(config.chars_per_token)))
    }

    /// Empty store using a custom token counter.
    pub fn with_counter(counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            entries: Vec::new(),
            tokens: TokenTracker::spawn(counter),
            generation: 0,
        }
    }

    /// Seed a store from a replayed session.
    pub fn from_replay(outcome: &ReplayOutcome, config: HistoryStoreConfig) -> Self {
        let mut store = Self::with_config(config);
        store.set(outcome.history.clone());
        store
    }

    /// Append one entry.
    pub fn add(&mut self, entry: ContentEntry) {
        self.entries.push(Arc::new(entry));
        self.schedule_recalculation();
    }

    /// Replace the whole history.
    pub fn set(&mut self, entries: Vec<ContentEntry>) {
        self.entries = entries.into_iter().map(Arc::new).collect();
        self.schedule_recalculation();
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.schedule_recalculation();
    }

    /// Replace the whole history with `summary`.
    pub fn compress(&mut self, summary: ContentEntry) {
        history::compress(&mut self.entries, Arc::new(summary));
        self.schedule_recalculation();
    }

    /// Remove the last `count` entries, clamping at empty. Returns how many were removed.
    pub fn rewind(&mut self, count: usize) -> usize {
        let removed = history::rewind(&mut self.entries, count);
        if removed > 0 {
            self.schedule_recalculation();
        }
        removed
    }

    /// Validate and apply a density result.
    ///
    /// Validation covers every index before anything changes; on error the
    /// history is exactly as before and no recalculation is scheduled.
    pub fn apply_density_result(
        &mut self,
        result: DensityResult,
    ) -> Result<DensityApplied, HistoryError> {
        let DensityResult {
            removals,
            replacements,
            metadata,
        } = result;
        let replacements: BTreeMap<i64, Arc<ContentEntry>> = replacements
            .into_iter()
            .map(|(index, entry)| (index, Arc::new(entry)))
            .collect();

        let (replaced, removed) = apply_density(&mut self.entries, &removals, replacements)?;
        debug!(replaced, removed, len = self.entries.len(), "density result applied");
        self.schedule_recalculation();

        Ok(DensityApplied {
            replaced,
            removed,
            metadata,
        })
    }

    /// Every stored entry, including ones the curated view drops.
    pub fn get_raw_history(&self) -> &[Arc<ContentEntry>] {
        &self.entries
    }

    /// Entries with meaningful content, for display and provider requests.
    pub fn get_curated_history(&self) -> Vec<Arc<ContentEntry>> {
        self.entries
            .iter()
            .filter(|e| !e.is_empty())
            .cloned()
            .collect()
    }

    /// Last computed token total. May lag behind recent mutations.
    pub fn total_tokens(&self) -> u64 {
        self.tokens.total()
    }

    /// Wait for all scheduled recalculations, then return the total.
    pub async fn wait_for_token_updates(&self) -> Result<u64, HistoryError> {
        self.tokens.flush().await
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn schedule_recalculation(&mut self) {
        self.generation += 1;
        self.tokens.request(self.generation, self.entries.clone());
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("len", &self.entries.len())
            .field("generation", &self.generation)
            .field("total_tokens", &self.tokens.total())
            .finish_non_exhaustive()
    }
}
