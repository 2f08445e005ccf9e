//! The conversation reducer shared by replay and the live recorder.
//!
//! [`ConversationState::apply`] is the single transition function
//! `(state, event) -> state'`. Replay folds a file through it; the recorder
//! folds each event it writes, so both paths agree by construction.

use parley_core::{ContentEntry, history};
use tracing::debug;

use crate::metadata::SessionMetadata;
use crate::types::{LogEvent, SessionEvent};

/// Conversation state accumulated from a session's events.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversationState {
    history: Vec<ContentEntry>,
    metadata: SessionMetadata,
    session_events: Vec<SessionEvent>,
}

impl ConversationState {
    /// Fresh state anchored on `metadata`.
    pub fn new(metadata: SessionMetadata) -> Self {
        Self::from_parts(metadata, Vec::new(), Vec::new())
    }

    /// Rebuild state from previously replayed parts.
    pub fn from_parts(
        metadata: SessionMetadata,
        history: Vec<ContentEntry>,
        session_events: Vec<SessionEvent>,
    ) -> Self {
        Self {
            history,
            metadata,
            session_events,
        }
    }

    /// Apply one event.
    ///
    /// `session_start` after the anchor is informational only: it neither
    /// resets history nor refreshes metadata.
    pub fn apply(&mut self, event: LogEvent) {
        match event {
            LogEvent::SessionStart(payload) => {
                debug!(
                    session_id = %payload.session_id,
                    "ignoring session_start after anchor"
                );
            }
            LogEvent::Content(payload) => self.history.push(payload.content),
            LogEvent::Compressed(payload) => history::compress(&mut self.history, payload.summary),
            LogEvent::Rewind(payload) => {
                let requested = usize::try_from(payload.items_removed).unwrap_or(usize::MAX);
                let removed = history::rewind(&mut self.history, requested);
                if removed < requested {
                    debug!(requested, removed, "rewind clamped to empty history");
                }
            }
            LogEvent::ProviderSwitch(payload) => {
                self.metadata.provider = Some(payload.provider);
                if payload.model.is_some() {
                    self.metadata.model = payload.model;
                }
            }
            LogEvent::SessionEvent(event) => self.session_events.push(event),
            LogEvent::DirectoriesChanged(payload) => {
                self.metadata.workspace_dirs = payload.directories;
            }
        }
    }

    /// Current history.
    pub fn history(&self) -> &[ContentEntry] {
        &self.history
    }

    /// Current metadata.
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Audit events, in order.
    pub fn session_events(&self) -> &[SessionEvent] {
        &self.session_events
    }

    /// Decompose into `(history, metadata, session_events)`.
    pub fn into_parts(self) -> (Vec<ContentEntry>, SessionMetadata, Vec<SessionEvent>) {
        (self.history, self.metadata, self.session_events)
    }
}
