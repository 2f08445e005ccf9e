//! Error types for replay and recording.
//!
//! [`ReplayError`] covers only whole-file failures. Per-line problems never
//! surface here; the replay loop turns them into warnings or silent skips.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal replay failures. No partial state is returned alongside these.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The log has no non-blank lines.
    #[error("session log is empty")]
    EmptyFile,

    /// The first record is not a `session_start` event.
    #[error("session log has no session_start record")]
    MissingSessionStart,

    /// The first record looks like a `session_start` but cannot be used as the anchor.
    #[error("invalid session_start on line {line}: {reason}")]
    InvalidSessionStart {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The anchor's `projectHash` differs from the caller's expectation.
    #[error("project hash mismatch: expected {expected}, found {found}")]
    ProjectHashMismatch {
        /// Hash the caller supplied.
        expected: String,
        /// Hash recorded in the log.
        found: String,
    },

    /// Reading the log failed.
    #[error("failed to read session log {}: {source}", path.display())]
    Io {
        /// Log file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ReplayError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Errors from the live session recorder.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Creating, opening or appending to the log failed.
    #[error("session log I/O error on {}: {source}", path.display())]
    Io {
        /// Log file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An event could not be serialized.
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Replaying an existing log for resume failed.
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

impl RecorderError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
