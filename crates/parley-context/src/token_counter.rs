//! Token counting for history entries.
//!
//! [`TokenCounter`] is the seam for real tokenizers. [`CharEstimator`] is the
//! default: `tokens ≈ ceil(chars / chars_per_token)` per entry.

use std::sync::Arc;

use parley_core::{ContentBlock, ContentEntry};

/// Counts tokens for history entries.
pub trait TokenCounter: Send + Sync + 'static {
    /// Tokens for one entry.
    fn count_entry(&self, entry: &ContentEntry) -> u64;

    /// Tokens for a whole history.
    fn count_history(&self, history: &[Arc<ContentEntry>]) -> u64 {
        history.iter().map(|e| self.count_entry(e)).sum()
    }
}

/// Character-based estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharEstimator {
    chars_per_token: usize,
}

impl CharEstimator {
    /// Estimator with the given ratio. A ratio of 0 is treated as 1.
    #[must_use]
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// Characters per token.
    #[must_use]
    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }
}

impl Default for CharEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenCounter for CharEstimator {
    fn count_entry(&self, entry: &ContentEntry) -> u64 {
        let chars: usize = entry.blocks.iter().map(block_chars).sum();
        u64::try_from(chars.div_ceil(self.chars_per_token)).unwrap_or(u64::MAX)
    }
}

fn block_chars(block: &ContentBlock) -> usize {
    match block {
        ContentBlock::Text { text } => text.len(),
        ContentBlock::ToolCall {
            name, parameters, ..
        } => name.len() + parameters.to_string().len(),
        ContentBlock::ToolResponse {
            tool_name,
            result,
            error,
            ..
        } => {
            let result_len = match result {
                serde_json::Value::String(s) => s.len(),
                other => other.to_string().len(),
            };
            tool_name.len() + result_len + error.as_ref().map_or(0, String::len)
        }
        ContentBlock::Thinking { thought, .. } => thought.len(),
        ContentBlock::Code { code, .. } => code.len(),
        ContentBlock::Media { data, url, .. } => data
            .as_ref()
            .or(url.as_ref())
            .map_or(0, String::len),
    }
}
