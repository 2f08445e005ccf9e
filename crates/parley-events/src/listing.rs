//! Enumerate session logs in a directory via their headers.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::header::read_session_header;
use crate::metadata::SessionMetadata;
use crate::paths::SESSION_FILE_EXTENSION;

/// A session log and its anchor metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Log file path.
    pub path: PathBuf,
    /// Metadata from the first line.
    pub metadata: SessionMetadata,
}

/// List readable session logs in `dir`, newest `startTime` first.
///
/// Files whose first line is not a valid anchor are left out. A missing
/// directory yields an empty list.
pub fn list_sessions(dir: &Path) -> std::io::Result<Vec<SessionSummary>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SESSION_FILE_EXTENSION) {
            continue;
        }
        match read_session_header(&path) {
            Some(metadata) => sessions.push(SessionSummary { path, metadata }),
            None => debug!(path = %path.display(), "skipping log without a readable header"),
        }
    }

    sessions.sort_by(|a, b| newest_first(&a.metadata.start_time, &b.metadata.start_time));
    Ok(sessions)
}

/// Path of the log whose header names `session_id`, if any.
pub fn find_session(dir: &Path, session_id: &str) -> std::io::Result<Option<PathBuf>> {
    Ok(list_sessions(dir)?
        .into_iter()
        .find(|s| s.metadata.session_id.as_str() == session_id)
        .map(|s| s.path))
}

/// Unparseable timestamps sort after parseable ones.
fn newest_first(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc));
    parse(b).cmp(&parse(a)).then_with(|| b.cmp(a))
}
