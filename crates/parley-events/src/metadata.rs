//! Session metadata: identity plus latest-wins provider and workspace state.

use parley_core::SessionId;
use serde::{Deserialize, Serialize};

use crate::types::SessionStartPayload;

/// Identity and mutable configuration of a recorded session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// Session identity.
    pub session_id: SessionId,
    /// Integrity anchor.
    pub project_hash: String,
    /// Workspace directories; replaced wholesale by `directories_changed`.
    pub workspace_dirs: Vec<String>,
    /// Current provider; replaced by `provider_switch`.
    pub provider: Option<String>,
    /// Current model.
    pub model: Option<String>,
    /// Session start time (RFC 3339).
    pub start_time: String,
}

impl SessionMetadata {
    /// Build metadata from an anchor payload. `record_ts` stands in for a
    /// missing `startTime`.
    pub fn from_session_start(payload: SessionStartPayload, record_ts: &str) -> Self {
        Self {
            session_id: payload.session_id,
            project_hash: payload.project_hash,
            workspace_dirs: payload.workspace_dirs,
            provider: payload.provider,
            model: payload.model,
            start_time: payload.start_time.unwrap_or_else(|| record_ts.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_time_falls_back_to_record_ts() {
        let payload = SessionStartPayload::new(SessionId::from("s1"), "h");
        let meta = SessionMetadata::from_session_start(payload, "2025-02-03T04:05:06Z");
        assert_eq!(meta.start_time, "2025-02-03T04:05:06Z");
        assert_eq!(meta.project_hash, "h");
    }

    #[test]
    fn explicit_start_time_wins() {
        let mut payload = SessionStartPayload::new(SessionId::from("s1"), "h")
            .with_provider("anthropic", Some("m1".into()));
        payload.start_time = Some("2024-01-01T00:00:00Z".into());
        let meta = SessionMetadata::from_session_start(payload, "ignored");
        assert_eq!(meta.start_time, "2024-01-01T00:00:00Z");
        assert_eq!(meta.provider.as_deref(), Some("anthropic"));
        assert_eq!(meta.model.as_deref(), Some("m1"));
    }
}
