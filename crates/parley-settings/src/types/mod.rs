//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`: the settings
//! file may be partial, and missing fields take their compiled default.

mod history;
mod logging;
mod session;

pub use history::*;
pub use logging::*;
pub use session::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "session": { "corruptionWarningThreshold": 0.1 },
///   "logging": { "level": "info" }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParleySettings {
    /// Session log and replay settings.
    pub session: SessionSettings,
    /// Live history store settings.
    pub history: HistorySettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for ParleySettings {
    fn default() -> Self {
        Self {
            session: SessionSettings::default(),
            history: HistorySettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ParleySettings {
    /// Reject values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.session.corruption_warning_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SettingsError::InvalidValue(format!(
                "session.corruptionWarningThreshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.history.chars_per_token == 0 {
            return Err(SettingsError::InvalidValue(
                "history.charsPerToken must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
