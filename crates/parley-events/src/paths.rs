use std::path::PathBuf;

use parley_settings::{SessionSettings, expand_home};

/// Session log file extension.
pub const SESSION_FILE_EXTENSION: &str = "jsonl";

/// Resolve the configured sessions directory, expanding `~`.
#[must_use]
pub fn sessions_dir(settings: &SessionSettings) -> PathBuf {
    expand_home(&settings.sessions_dir)
}

/// Replace characters that are awkward in file names.
#[must_use]
pub fn sanitize_timestamp_for_filename(timestamp: &str) -> String {
    timestamp
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' => '-',
            _ => c,
        })
        .collect()
}

/// Make a session ID usable as one path component.
///
/// Separators and control characters become `-`, and leading dots are
/// dropped so the result is never `.`, `..` or hidden.
#[must_use]
pub fn sanitize_session_id_for_filename(session_id: &str) -> String {
    let cleaned: String = session_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | ' ' => '-',
            c if c.is_control() => '-',
            _ => c,
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "session".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<startTime>_<sessionId>.jsonl`, both parts sanitized.
#[must_use]
pub fn session_file_name(start_time: &str, session_id: &str) -> String {
    format!(
        "{}_{}.{SESSION_FILE_EXTENSION}",
        sanitize_timestamp_for_filename(start_time),
        sanitize_session_id_for_filename(session_id)
    )
}
