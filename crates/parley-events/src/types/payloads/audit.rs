//! Audit-only session events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a [`SessionEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, e.g. a resume marker.
    Info,
    /// Something degraded but recoverable.
    Warning,
    /// Something failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Payload for `session_event` records, and the item type of the replayed
/// audit list. Never enters conversation history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// How serious the event is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl SessionEvent {
    /// Build an event.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Informational event.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_wire_names() {
        let e: SessionEvent =
            serde_json::from_value(json!({"severity": "warning", "message": "x"})).unwrap();
        assert_eq!(e.severity, Severity::Warning);
        assert_eq!(Severity::Error.to_string(), "error");
    }

    #[test]
    fn unknown_severity_rejected() {
        let res =
            serde_json::from_value::<SessionEvent>(json!({"severity": "fatal", "message": "x"}));
        assert!(res.is_err());
    }

    #[test]
    fn message_required() {
        assert!(serde_json::from_value::<SessionEvent>(json!({"severity": "info"})).is_err());
    }
}
