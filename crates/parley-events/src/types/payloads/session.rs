//! Session anchor payload.

use parley_core::SessionId;
use serde::{Deserialize, Serialize};

/// Payload for `session_start` events.
///
/// Only `sessionId` and `projectHash` are required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStartPayload {
    /// Session identity.
    pub session_id: SessionId,
    /// Integrity anchor checked against the caller's expected hash.
    pub project_hash: String,
    /// Workspace directories, in order.
    #[serde(default)]
    pub workspace_dirs: Vec<String>,
    /// Provider name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Session start time (RFC 3339). Falls back to the record timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl SessionStartPayload {
    /// Minimal payload with defaults for everything optional.
    pub fn new(session_id: SessionId, project_hash: impl Into<String>) -> Self {
        Self {
            session_id,
            project_hash: project_hash.into(),
            workspace_dirs: Vec::new(),
            provider: None,
            model: None,
            start_time: None,
        }
    }

    /// Set the provider and model.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>, model: Option<String>) -> Self {
        self.provider = Some(provider.into());
        self.model = model;
        self
    }

    /// Set the workspace directories.
    #[must_use]
    pub fn with_workspace_dirs(mut self, dirs: Vec<String>) -> Self {
        self.workspace_dirs = dirs;
        self
    }
}
