//! Per-line decoding and validation.
//!
//! [`parse_line`] classifies one raw line as accepted, skipped (with a
//! reason), or silently discarded. It never panics and never returns early
//! with an error: every failure is a [`LineOutcome`] value so the replay loop
//! stays free of error plumbing.
//!
//! Checks run in order:
//! 1. BOM strip (line 1 only)
//! 2. JSON parse; failure is malformed, or silently discarded on the last line
//! 3. Envelope: object with integer `seq`, string `type`, object `payload`
//! 4. `type` in the known set
//! 5. Payload deserializes into the type's struct

use std::fmt;

use serde_json::{Map, Value};

use crate::types::{EventType, FORMAT_VERSION, LogEvent};

const BOM: char = '\u{feff}';

/// A line that decoded into a known, payload-valid event.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedEvent {
    /// 1-based line number.
    pub line_number: usize,
    /// Record format version.
    pub version: u32,
    /// Raw sequence number.
    pub seq: i64,
    /// Record timestamp as written.
    pub ts: String,
    /// The typed event.
    pub event: LogEvent,
}

/// Why a line was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Not parseable as JSON (or not UTF-8).
    MalformedJson(String),
    /// Parsed, but the record envelope is missing or has a wrong-typed field.
    InvalidEnvelope(String),
    /// `type` is not one of the known tags.
    UnknownType(String),
    /// Known type whose payload does not match the required shape.
    InvalidPayload {
        /// The record's type.
        event_type: EventType,
        /// Deserializer message.
        detail: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson(detail) => write!(f, "malformed JSON ({detail})"),
            Self::InvalidEnvelope(detail) => write!(f, "invalid record ({detail})"),
            Self::UnknownType(t) => write!(f, "unknown event type \"{t}\""),
            Self::InvalidPayload { event_type, detail } => {
                write!(f, "invalid {event_type} payload ({detail})")
            }
        }
    }
}

/// A recoverable per-line failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line_number: usize,
    /// What was wrong.
    pub reason: SkipReason,
    /// The record's `seq`, when the JSON parsed far enough to have one.
    pub seq: Option<i64>,
}

impl SkippedLine {
    /// Human-readable warning naming the line.
    #[must_use]
    pub fn warning(&self) -> String {
        format!("line {}: {}, skipped", self.line_number, self.reason)
    }
}

/// Classification of one raw line.
#[derive(Clone, Debug, PartialEq)]
pub enum LineOutcome {
    /// Known type, valid payload.
    Accepted(ParsedEvent),
    /// Recoverable failure; replay warns and continues.
    Skipped(SkippedLine),
    /// Malformed final line, treated as a torn write. No warning.
    SilentlyDiscarded,
}

/// Classify a raw line given as bytes. Invalid UTF-8 counts as malformed JSON.
pub fn parse_line_bytes(raw: &[u8], line_number: usize, is_last: bool) -> LineOutcome {
    match std::str::from_utf8(raw) {
        Ok(text) => parse_line(text, line_number, is_last),
        Err(err) => malformed(line_number, is_last, format!("invalid UTF-8: {err}")),
    }
}

/// Classify one raw line.
///
/// `line_number` is 1-based; `is_last` marks the final line of the file.
pub fn parse_line(raw: &str, line_number: usize, is_last: bool) -> LineOutcome {
    let mut text = raw.trim_end_matches(['\r', '\n']);
    if line_number == 1 {
        text = text.strip_prefix(BOM).unwrap_or(text);
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(err) => return malformed(line_number, is_last, err.to_string()),
    };

    let Value::Object(mut record) = value else {
        return skip(line_number, SkipReason::InvalidEnvelope("not a JSON object".into()), None);
    };

    let seq = record.get("seq").and_then(Value::as_i64);
    match decode_record(&mut record) {
        Ok((version, seq, ts, event)) => LineOutcome::Accepted(ParsedEvent {
            line_number,
            version,
            seq,
            ts,
            event,
        }),
        Err(reason) => skip(line_number, reason, seq),
    }
}

fn decode_record(
    record: &mut Map<String, Value>,
) -> Result<(u32, i64, String, LogEvent), SkipReason> {
    let seq = match record.get("seq") {
        Some(v) => v
            .as_i64()
            .ok_or_else(|| SkipReason::InvalidEnvelope("\"seq\" is not an integer".into()))?,
        None => return Err(SkipReason::InvalidEnvelope("missing \"seq\"".into())),
    };

    let version = match record.get("v") {
        None => FORMAT_VERSION,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| SkipReason::InvalidEnvelope("\"v\" is not a version number".into()))?,
    };

    let ts = match record.get("ts") {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(SkipReason::InvalidEnvelope("\"ts\" is not a string".into())),
    };

    let tag = match record.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(SkipReason::InvalidEnvelope("\"type\" is not a string".into())),
        None => return Err(SkipReason::InvalidEnvelope("missing \"type\"".into())),
    };
    let event_type: EventType = tag
        .parse()
        .map_err(|_| SkipReason::UnknownType(tag.to_owned()))?;

    let payload = match record.remove("payload") {
        Some(p @ Value::Object(_)) => p,
        Some(_) => {
            return Err(SkipReason::InvalidPayload {
                event_type,
                detail: "payload is not an object".into(),
            });
        }
        None => {
            return Err(SkipReason::InvalidPayload {
                event_type,
                detail: "missing payload".into(),
            });
        }
    };

    let event = LogEvent::from_payload(event_type, payload).map_err(|err| {
        SkipReason::InvalidPayload {
            event_type,
            detail: err.to_string(),
        }
    })?;

    Ok((version, seq, ts, event))
}

fn malformed(line_number: usize, is_last: bool, detail: String) -> LineOutcome {
    if is_last {
        LineOutcome::SilentlyDiscarded
    } else {
        skip(line_number, SkipReason::MalformedJson(detail), None)
    }
}

fn skip(line_number: usize, reason: SkipReason, seq: Option<i64>) -> LineOutcome {
    LineOutcome::Skipped(SkippedLine {
        line_number,
        reason,
        seq,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use parley_core::ContentEntry;

    const START: &str = r#"{"v":1,"seq":1,"ts":"2025-01-01T00:00:00Z","type":"session_start","payload":{"sessionId":"s1","projectHash":"h"}}"#;

    fn content_line(seq: i64) -> String {
        format!(
            r#"{{"v":1,"seq":{seq},"ts":"t","type":"content","payload":{{"content":{{"speaker":"human","blocks":[{{"type":"text","text":"m{seq}"}}]}}}}}}"#
        )
    }

    #[test]
    fn accepts_session_start() {
        let outcome = parse_line(START, 1, false);
        assert_matches!(outcome, LineOutcome::Accepted(ParsedEvent { seq: 1, version: 1, event: LogEvent::SessionStart(ref p), .. }) if p.project_hash == "h");
    }

    #[test]
    fn accepts_content() {
        let outcome = parse_line(&content_line(4), 2, false);
        let LineOutcome::Accepted(parsed) = outcome else {
            panic!("expected accepted, got {outcome:?}");
        };
        assert_eq!(parsed.line_number, 2);
        assert_eq!(parsed.ts, "t");
        assert_eq!(
            parsed.event,
            LogEvent::Content(crate::types::ContentPayload {
                content: ContentEntry::human("m4")
            })
        );
    }

    #[test]
    fn strips_bom_on_first_line_only() {
        let with_bom = format!("\u{feff}{START}");
        assert_matches!(parse_line(&with_bom, 1, false), LineOutcome::Accepted(_));
        assert_matches!(
            parse_line(&with_bom, 2, false),
            LineOutcome::Skipped(SkippedLine { reason: SkipReason::MalformedJson(_), .. })
        );
    }

    #[test]
    fn tolerates_crlf() {
        let line = format!("{START}\r");
        assert_matches!(parse_line(&line, 1, false), LineOutcome::Accepted(_));
    }

    #[test]
    fn malformed_mid_file_is_skipped() {
        let outcome = parse_line(r#"{"v":1,"seq":"#, 5, false);
        let LineOutcome::Skipped(skipped) = outcome else {
            panic!("expected skip");
        };
        assert_eq!(skipped.line_number, 5);
        assert!(skipped.seq.is_none());
        assert_matches!(skipped.reason, SkipReason::MalformedJson(_));
        assert!(skipped.warning().contains("line 5"));
    }

    #[test]
    fn malformed_last_line_is_silently_discarded() {
        assert_eq!(
            parse_line(r#"{"v":1,"seq":9,"ty"#, 9, true),
            LineOutcome::SilentlyDiscarded
        );
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let bytes = [b'{', 0xff, b'}'];
        assert_matches!(
            parse_line_bytes(&bytes, 3, false),
            LineOutcome::Skipped(SkippedLine { reason: SkipReason::MalformedJson(_), .. })
        );
        assert_eq!(parse_line_bytes(&bytes, 3, true), LineOutcome::SilentlyDiscarded);
    }

    #[test]
    fn unknown_type_names_the_type_and_keeps_seq() {
        let outcome = parse_line(r#"{"v":1,"seq":7,"ts":"t","type":"telemetry","payload":{}}"#, 4, false);
        let LineOutcome::Skipped(skipped) = outcome else {
            panic!("expected skip");
        };
        assert_eq!(skipped.reason, SkipReason::UnknownType("telemetry".into()));
        assert_eq!(skipped.seq, Some(7));
        assert!(skipped.warning().contains("telemetry"));
    }

    #[test]
    fn unknown_type_on_last_line_still_warns() {
        assert_matches!(
            parse_line(r#"{"v":1,"seq":7,"type":"telemetry","payload":{}}"#, 4, true),
            LineOutcome::Skipped(_)
        );
    }

    #[test]
    fn invalid_payload_is_skipped() {
        let outcome = parse_line(r#"{"v":1,"seq":3,"ts":"t","type":"rewind","payload":{"itemsRemoved":-2}}"#, 3, false);
        assert_matches!(
            outcome,
            LineOutcome::Skipped(SkippedLine {
                reason: SkipReason::InvalidPayload { event_type: EventType::Rewind, .. },
                seq: Some(3),
                ..
            })
        );
    }

    #[test]
    fn partially_shaped_payload_is_rejected() {
        let outcome = parse_line(
            r#"{"v":1,"seq":3,"type":"compressed","payload":{"summary":{"speaker":"human","blocks":[]}}}"#,
            3,
            false,
        );
        assert_matches!(
            outcome,
            LineOutcome::Skipped(SkippedLine { reason: SkipReason::InvalidPayload { .. }, .. })
        );
    }

    #[test]
    fn missing_payload_is_invalid_payload() {
        assert_matches!(
            parse_line(r#"{"v":1,"seq":3,"type":"content"}"#, 3, false),
            LineOutcome::Skipped(SkippedLine { reason: SkipReason::InvalidPayload { .. }, .. })
        );
    }

    #[test]
    fn envelope_checks() {
        assert_matches!(
            parse_line("[1,2,3]", 2, false),
            LineOutcome::Skipped(SkippedLine { reason: SkipReason::InvalidEnvelope(_), .. })
        );
        assert_matches!(
            parse_line(r#"{"v":1,"type":"content","payload":{}}"#, 2, false),
            LineOutcome::Skipped(SkippedLine { reason: SkipReason::InvalidEnvelope(_), .. })
        );
        assert_matches!(
            parse_line(r#"{"v":1,"seq":1.5,"type":"content","payload":{}}"#, 2, false),
            LineOutcome::Skipped(SkippedLine { reason: SkipReason::InvalidEnvelope(_), .. })
        );
        assert_matches!(
            parse_line(r#"{"v":1,"seq":2,"payload":{}}"#, 2, false),
            LineOutcome::Skipped(SkippedLine { reason: SkipReason::InvalidEnvelope(_), seq: Some(2), .. })
        );
    }

    #[test]
    fn missing_version_defaults_to_current() {
        let outcome = parse_line(r#"{"seq":2,"type":"rewind","payload":{"itemsRemoved":1}}"#, 2, false);
        assert_matches!(outcome, LineOutcome::Accepted(ParsedEvent { version: 1, .. }));
    }

    #[test]
    fn newer_version_is_accepted() {
        let outcome = parse_line(r#"{"v":2,"seq":2,"type":"rewind","payload":{"itemsRemoved":1}}"#, 2, false);
        assert_matches!(outcome, LineOutcome::Accepted(ParsedEvent { version: 2, .. }));
    }
}
