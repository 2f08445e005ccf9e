//! The on-disk [`EventRecord`] and its typed form, [`LogEvent`].
//!
//! A record keeps its payload as opaque [`serde_json::Value`];
//! [`LogEvent::from_payload`] dispatches on [`EventType`] and deserializes
//! into the matching payload struct.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event_type::EventType;
use super::payloads::{
    CompressedPayload, ContentPayload, DirectoriesChangedPayload, ProviderSwitchPayload,
    RewindPayload, SessionEvent, SessionStartPayload,
};

/// Log format version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// One line of a session log.
///
/// ```json
/// {"v":1,"seq":3,"ts":"2025-01-01T00:00:00.000Z","type":"rewind","payload":{"itemsRemoved":2}}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Format version.
    pub v: u32,
    /// Writer-assigned sequence number. Expected to increase, not guaranteed.
    pub seq: i64,
    /// RFC 3339 timestamp. Informational only.
    pub ts: String,
    /// Event type tag.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Type-specific data.
    pub payload: Value,
}

impl EventRecord {
    /// Build a current-version record from a typed event.
    pub fn from_event(seq: i64, ts: impl Into<String>, event: &LogEvent) -> serde_json::Result<Self> {
        Ok(Self {
            v: FORMAT_VERSION,
            seq,
            ts: ts.into(),
            event_type: event.event_type(),
            payload: event.payload_value()?,
        })
    }
}

/// A typed, payload-validated event.
#[derive(Clone, Debug, PartialEq)]
pub enum LogEvent {
    /// `session_start`
    SessionStart(SessionStartPayload),
    /// `content`
    Content(ContentPayload),
    /// `compressed`
    Compressed(CompressedPayload),
    /// `rewind`
    Rewind(RewindPayload),
    /// `provider_switch`
    ProviderSwitch(ProviderSwitchPayload),
    /// `session_event`
    SessionEvent(SessionEvent),
    /// `directories_changed`
    DirectoriesChanged(DirectoriesChangedPayload),
}

impl LogEvent {
    /// Decode `payload` as the payload of `event_type`.
    pub fn from_payload(event_type: EventType, payload: Value) -> serde_json::Result<Self> {
        Ok(match event_type {
            EventType::SessionStart => Self::SessionStart(serde_json::from_value(payload)?),
            EventType::Content => Self::Content(serde_json::from_value(payload)?),
            EventType::Compressed => Self::Compressed(serde_json::from_value(payload)?),
            EventType::Rewind => Self::Rewind(serde_json::from_value(payload)?),
            EventType::ProviderSwitch => Self::ProviderSwitch(serde_json::from_value(payload)?),
            EventType::SessionEvent => Self::SessionEvent(serde_json::from_value(payload)?),
            EventType::DirectoriesChanged => {
                Self::DirectoriesChanged(serde_json::from_value(payload)?)
            }
        })
    }

    /// The tag this event is written under.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::SessionStart(_) => EventType::SessionStart,
            Self::Content(_) => EventType::Content,
            Self::Compressed(_) => EventType::Compressed,
            Self::Rewind(_) => EventType::Rewind,
            Self::ProviderSwitch(_) => EventType::ProviderSwitch,
            Self::SessionEvent(_) => EventType::SessionEvent,
            Self::DirectoriesChanged(_) => EventType::DirectoriesChanged,
        }
    }

    /// Serialize just the payload.
    pub fn payload_value(&self) -> serde_json::Result<Value> {
        match self {
            Self::SessionStart(p) => serde_json::to_value(p),
            Self::Content(p) => serde_json::to_value(p),
            Self::Compressed(p) => serde_json::to_value(p),
            Self::Rewind(p) => serde_json::to_value(p),
            Self::ProviderSwitch(p) => serde_json::to_value(p),
            Self::SessionEvent(p) => serde_json::to_value(p),
            Self::DirectoriesChanged(p) => serde_json::to_value(p),
        }
    }
}
