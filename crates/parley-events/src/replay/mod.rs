//! Session replay: fold a JSONL log back into conversation state.
//!
//! The file is streamed line by line. Each non-blank line goes through
//! [`parse_line_bytes`](crate::parser::parse_line_bytes), and accepted events
//! are folded through [`ConversationState::apply`].
//!
//! Integrity policy:
//! - **Fatal**: empty file, first record not a valid `session_start`,
//!   `projectHash` mismatch. No partial state is returned.
//! - **Warned**: malformed mid-file lines, unknown types, invalid payloads,
//!   non-monotonic `seq`, newer format versions, and a corruption rate above
//!   the configured threshold.
//! - **Silent**: a malformed final line (torn write).

mod state;

pub use state::ConversationState;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use parley_core::ContentEntry;
use parley_settings::SessionSettings;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::errors::ReplayError;
use crate::metadata::SessionMetadata;
use crate::parser::{LineOutcome, ParsedEvent, parse_line_bytes};
use crate::types::{FORMAT_VERSION, LogEvent, SessionEvent};

/// Default fraction of skipped lines above which replay adds a corruption warning.
pub const DEFAULT_CORRUPTION_WARNING_THRESHOLD: f64 = 0.05;

/// Tunables for [`replay_session_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplayOptions {
    /// Skipped / considered lines ratio that triggers the aggregate warning.
    pub corruption_warning_threshold: f64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            corruption_warning_threshold: DEFAULT_CORRUPTION_WARNING_THRESHOLD,
        }
    }
}

impl ReplayOptions {
    /// Options from loaded settings.
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            corruption_warning_threshold: settings.corruption_warning_threshold,
        }
    }
}

/// Successful replay result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    /// Reconstructed conversation history.
    pub history: Vec<ContentEntry>,
    /// Session metadata with latest-wins values applied.
    pub metadata: SessionMetadata,
    /// Audit events, in file order.
    pub session_events: Vec<SessionEvent>,
    /// Human-readable warnings, in file order.
    pub warnings: Vec<String>,
    /// Raw `seq` of the last record that carried one, monotonic or not.
    pub last_seq: i64,
    /// Known-type, payload-valid records, including the anchor.
    pub event_count: usize,
}

/// Replay a session log with default options.
pub fn replay_session(
    path: &Path,
    expected_project_hash: &str,
) -> Result<ReplayOutcome, ReplayError> {
    replay_session_with(path, expected_project_hash, &ReplayOptions::default())
}

/// Replay a session log.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn replay_session_with(
    path: &Path,
    expected_project_hash: &str,
    options: &ReplayOptions,
) -> Result<ReplayOutcome, ReplayError> {
    let file = File::open(path).map_err(|e| ReplayError::io(path, e))?;
    let mut lines = LogLines::new(BufReader::new(file)).peekable();

    let (line_number, raw) = match lines.next() {
        None => return Err(ReplayError::EmptyFile),
        Some(item) => item.map_err(|e| ReplayError::io(path, e))?,
    };
    // The anchor is never tolerated as a torn write, so parse it as mid-file.
    let anchor = match parse_line_bytes(&raw, line_number, false) {
        LineOutcome::Accepted(parsed) => parsed,
        LineOutcome::Skipped(skipped) => {
            return Err(ReplayError::InvalidSessionStart {
                line: skipped.line_number,
                reason: skipped.reason.to_string(),
            });
        }
        LineOutcome::SilentlyDiscarded => return Err(ReplayError::MissingSessionStart),
    };
    let ParsedEvent {
        line_number,
        version,
        seq,
        ts,
        event: LogEvent::SessionStart(start),
    } = anchor
    else {
        return Err(ReplayError::MissingSessionStart);
    };
    if start.project_hash != expected_project_hash {
        return Err(ReplayError::ProjectHashMismatch {
            expected: expected_project_hash.to_owned(),
            found: start.project_hash,
        });
    }

    let mut state = ConversationState::new(SessionMetadata::from_session_start(start, &ts));
    let mut tracker = Tracker::new(seq);
    tracker.accept(line_number, version);

    while let Some(item) = lines.next() {
        let (line_number, raw) = item.map_err(|e| ReplayError::io(path, e))?;
        let is_last = lines.peek().is_none();

        match parse_line_bytes(&raw, line_number, is_last) {
            LineOutcome::Accepted(parsed) => {
                tracker.observe_seq(line_number, parsed.seq);
                tracker.accept(line_number, parsed.version);
                state.apply(parsed.event);
            }
            LineOutcome::Skipped(skipped) => {
                tracker.skip(line_number, skipped.warning());
                if let Some(seq) = skipped.seq {
                    tracker.observe_seq(line_number, seq);
                }
            }
            LineOutcome::SilentlyDiscarded => {
                debug!(line = line_number, "discarding incomplete final line");
            }
        }
    }

    tracker.check_corruption_rate(options.corruption_warning_threshold);

    let (history, metadata, session_events) = state.into_parts();
    info!(
        events = tracker.event_count,
        history_len = history.len(),
        warnings = tracker.warnings.len(),
        last_seq = tracker.last_seq,
        "session replay complete"
    );

    Ok(ReplayOutcome {
        history,
        metadata,
        session_events,
        warnings: tracker.warnings,
        last_seq: tracker.last_seq,
        event_count: tracker.event_count,
    })
}

/// Per-replay bookkeeping: warnings, counters, sequence tracking.
struct Tracker {
    warnings: Vec<String>,
    last_seq: i64,
    event_count: usize,
    considered: usize,
    skipped: usize,
    newer_version_seen: bool,
}

impl Tracker {
    fn new(anchor_seq: i64) -> Self {
        Self {
            warnings: Vec::new(),
            last_seq: anchor_seq,
            event_count: 0,
            considered: 0,
            skipped: 0,
            newer_version_seen: false,
        }
    }

    fn accept(&mut self, line: usize, version: u32) {
        self.considered += 1;
        self.event_count += 1;
        if version > FORMAT_VERSION && !self.newer_version_seen {
            self.newer_version_seen = true;
            self.warn(
                line,
                format!(
                    "line {line}: written by newer log format version {version} (supported: {FORMAT_VERSION})"
                ),
            );
        }
    }

    fn skip(&mut self, line: usize, warning: String) {
        self.considered += 1;
        self.skipped += 1;
        self.warn(line, warning);
    }

    fn observe_seq(&mut self, line: usize, seq: i64) {
        if seq <= self.last_seq {
            let previous = self.last_seq;
            self.warn(
                line,
                format!("line {line}: non-monotonic sequence number {seq} (previous {previous})"),
            );
        }
        self.last_seq = seq;
    }

    #[allow(clippy::cast_precision_loss)]
    fn check_corruption_rate(&mut self, threshold: f64) {
        if self.considered == 0 {
            return;
        }
        let rate = self.skipped as f64 / self.considered as f64;
        if rate > threshold {
            let message = format!(
                "high corruption rate: {} of {} lines skipped ({:.1}%)",
                self.skipped,
                self.considered,
                rate * 100.0
            );
            warn!(
                skipped = self.skipped,
                considered = self.considered,
                "high session log corruption rate"
            );
            self.warnings.push(message);
        }
    }

    fn warn(&mut self, line: usize, message: String) {
        warn!(line, reason = %message, "session log warning");
        self.warnings.push(message);
    }
}

/// Non-blank lines of a log with their 1-based line numbers.
///
/// Lines are yielded as raw bytes with the trailing `\n` removed so invalid
/// UTF-8 reaches the parser as a malformed line rather than an I/O error.
pub(crate) struct LogLines<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> LogLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for LogLines<R> {
    type Item = std::io::Result<(usize, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut buf = Vec::new();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    if buf.last() == Some(&b'\n') {
                        let _ = buf.pop();
                    }
                    if buf.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    return Some(Ok((self.line_number, buf)));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
