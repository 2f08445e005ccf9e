//! Session log and replay settings.

use serde::{Deserialize, Serialize};

/// Settings for the session event log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Directory holding `*.jsonl` session logs. A leading `~` expands to `$HOME`.
    pub sessions_dir: String,
    /// Fraction of skipped lines above which replay adds a corruption warning.
    pub corruption_warning_threshold: f64,
    /// Append an informational "Session resumed" event when reopening a log.
    pub resume_notice: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sessions_dir: "~/.parley/sessions".to_string(),
            corruption_warning_threshold: 0.05,
            resume_notice: true,
        }
    }
}
