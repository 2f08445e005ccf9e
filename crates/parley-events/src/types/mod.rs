//! Event log types: the record envelope, the closed type set, and payloads.

pub mod base;
pub mod event_type;
pub mod payloads;

pub use base::{EventRecord, FORMAT_VERSION, LogEvent};
pub use event_type::{ALL_EVENT_TYPES, EventType};
pub use payloads::*;
