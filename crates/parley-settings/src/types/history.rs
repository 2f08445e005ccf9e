//! Live history store settings.

use serde::{Deserialize, Serialize};

/// Settings for the in-memory history store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// Approximate characters per token for the default estimator.
    pub chars_per_token: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { chars_per_token: 4 }
    }
}
