//! Cheap session identification from the anchor line of a log.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::metadata::SessionMetadata;
use crate::parser::{LineOutcome, ParsedEvent, parse_line_bytes};
use crate::replay::LogLines;
use crate::types::LogEvent;

/// Upper bound on bytes read while looking for the anchor.
pub const MAX_HEADER_BYTES: u64 = 64 * 1024;

/// Decode the anchor of `path`: the first non-blank line, as replay sees it.
///
/// At most [`MAX_HEADER_BYTES`] are read. Returns `None` when the file cannot
/// be read, the anchor is cut off by that limit or is not valid JSON, or it is
/// not a `session_start` with `sessionId` and `projectHash`.
pub fn read_session_header(path: &Path) -> Option<SessionMetadata> {
    let file = File::open(path).ok()?;
    let reader = BufReader::new(file).take(MAX_HEADER_BYTES);
    let (line_number, first) = LogLines::new(reader).next()?.ok()?;

    match parse_line_bytes(&first, line_number, false) {
        LineOutcome::Accepted(ParsedEvent {
            event: LogEvent::SessionStart(start),
            ts,
            ..
        }) => Some(SessionMetadata::from_session_start(start, &ts)),
        _ => None,
    }
}
