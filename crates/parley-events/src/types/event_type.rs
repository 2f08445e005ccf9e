//! The [`EventType`] enum: the closed set of log record tags.
//!
//! Each variant serializes to the exact snake_case tag written on disk.
//! Tags outside this set are "unknown", a category distinct from malformed
//! records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All session log event types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Session anchor: identity and integrity hash.
    SessionStart,
    /// One conversation entry appended to history.
    Content,
    /// History collapsed into a single summary entry.
    Compressed,
    /// Last N history entries removed.
    Rewind,
    /// Provider and/or model changed.
    ProviderSwitch,
    /// Audit-only notice, never part of history.
    SessionEvent,
    /// Workspace directories replaced.
    DirectoriesChanged,
}

/// Every event type, in declaration order.
pub const ALL_EVENT_TYPES: [EventType; 7] = [
    EventType::SessionStart,
    EventType::Content,
    EventType::Compressed,
    EventType::Rewind,
    EventType::ProviderSwitch,
    EventType::SessionEvent,
    EventType::DirectoriesChanged,
];

impl EventType {
    /// The on-disk tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionStart => "session_start",
            Self::Content => "content",
            Self::Compressed => "compressed",
            Self::Rewind => "rewind",
            Self::ProviderSwitch => "provider_switch",
            Self::SessionEvent => "session_event",
            Self::DirectoriesChanged => "directories_changed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ALL_EVENT_TYPES
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_matches_as_str() {
        for t in ALL_EVENT_TYPES {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, t.as_str());
            let back: EventType = serde_json::from_value(json).unwrap();
            assert_eq!(back, t);
        }
    }

    #[test]
    fn from_str_roundtrip() {
        for t in ALL_EVENT_TYPES {
            assert_eq!(t.as_str().parse::<EventType>().unwrap(), t);
        }
    }

    #[test]
    fn from_str_unknown() {
        let err = "message.user".parse::<EventType>().unwrap_err();
        assert!(err.contains("message.user"));
    }

    #[test]
    fn display() {
        assert_eq!(EventType::ProviderSwitch.to_string(), "provider_switch");
    }
}
