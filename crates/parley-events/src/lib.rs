//! # parley-events
//!
//! Append-only session event log for Parley conversations.
//!
//! A session is one JSONL file. Line 1 is the `session_start` anchor; every
//! following line is one [`EventRecord`]. The log is never rewritten:
//! compression and rewind are themselves events, and the current conversation
//! is whatever a replay of the file produces.
//!
//! - [`replay_session`]: fold a log into history, metadata, and audit events
//! - [`read_session_header`]: identify a log from its first line only
//! - [`parse_line`]: classify a single line (accepted, skipped, torn)
//! - [`SessionRecorder`]: write a log during a live session, or resume one
//! - [`list_sessions`] / [`find_session`]: enumerate logs in a directory

#![deny(unsafe_code)]

pub mod errors;
pub mod header;
pub mod listing;
pub mod metadata;
pub mod parser;
/// Session log file naming and directory resolution.
pub mod paths;
pub mod recorder;
pub mod replay;
pub mod types;

pub use errors::{RecorderError, ReplayError};
pub use header::read_session_header;
pub use listing::{SessionSummary, find_session, list_sessions};
pub use metadata::SessionMetadata;
pub use parser::{LineOutcome, ParsedEvent, SkipReason, SkippedLine, parse_line, parse_line_bytes};
pub use recorder::{RESUME_NOTICE, ResumeOptions, SessionRecorder};
pub use replay::{
    ConversationState, DEFAULT_CORRUPTION_WARNING_THRESHOLD, ReplayOptions, ReplayOutcome,
    replay_session, replay_session_with,
};
pub use types::{EventRecord, EventType, LogEvent, SessionEvent, Severity};
