//! Recorder → listing → resume → replay, across process-like boundaries.

use parley_core::{ContentBlock, ContentEntry, SessionId, Speaker};
use parley_events::types::SessionStartPayload;
use parley_events::{
    ResumeOptions, SessionRecorder, Severity, find_session, list_sessions, replay_session,
};
use serde_json::json;

fn start(id: &str, at: &str) -> SessionStartPayload {
    let mut payload = SessionStartPayload::new(SessionId::from(id), "hash")
        .with_workspace_dirs(vec!["/repo".into()]);
    payload.start_time = Some(at.into());
    payload
}

#[test]
fn recorded_sessions_are_listed_and_resumable() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = SessionRecorder::create(dir.path(), start("first", "2025-01-01T00:00:00.000Z")).unwrap();
    let _ = first.record_content(ContentEntry::human("hello")).unwrap();
    let _ = first
        .record_content(ContentEntry::new(
            Speaker::Ai,
            vec![
                ContentBlock::thinking("consider"),
                ContentBlock::tool_call("c1", "read_file", json!({"path": "a.rs"})),
            ],
        ))
        .unwrap();
    let _ = first
        .record_content(ContentEntry::new(
            Speaker::Tool,
            vec![ContentBlock::tool_response("c1", "read_file", json!("fn main() {}"))],
        ))
        .unwrap();
    drop(first);

    let second = SessionRecorder::create(dir.path(), start("second", "2025-02-01T00:00:00.000Z")).unwrap();
    drop(second);

    let listed: Vec<_> = list_sessions(dir.path())
        .unwrap()
        .into_iter()
        .map(|s| s.metadata.session_id.into_inner())
        .collect();
    assert_eq!(listed, ["second", "first"]);

    let path = find_session(dir.path(), "first").unwrap().unwrap();
    let (mut resumed, warnings) = SessionRecorder::resume(&path, "hash", &ResumeOptions::default()).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(resumed.history().len(), 3);

    let _ = resumed.record_rewind(2).unwrap();
    let _ = resumed.record_session_event(Severity::Warning, "rewound").unwrap();
    let _ = resumed.record_directories_changed(vec!["/repo".into(), "/lib".into()]).unwrap();
    let expected_history = resumed.history().to_vec();
    drop(resumed);

    let outcome = replay_session(&path, "hash").unwrap();
    assert_eq!(outcome.history, expected_history);
    assert_eq!(outcome.history.len(), 1);
    assert_eq!(outcome.session_events.len(), 2);
    assert_eq!(outcome.metadata.workspace_dirs, ["/repo", "/lib"]);
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.last_seq, 8);
}
