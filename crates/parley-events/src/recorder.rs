//! Live session recorder: appends events to a JSONL log as a session runs.
//!
//! Every append writes exactly one line and flushes it. The recorder folds
//! each written event through [`ConversationState`], so its in-memory view
//! always equals what a replay of the file would produce.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use parley_core::ContentEntry;
use parley_settings::SessionSettings;
use tracing::{debug, info, instrument, warn};

use crate::errors::RecorderError;
use crate::metadata::SessionMetadata;
use crate::paths::session_file_name;
use crate::replay::{ConversationState, ReplayOptions, ReplayOutcome, replay_session_with};
use crate::types::{
    CompressedPayload, ContentPayload, DirectoriesChangedPayload, EventRecord, LogEvent,
    ProviderSwitchPayload, RewindPayload, SessionEvent, SessionStartPayload, Severity,
};

/// Message of the informational event appended on resume.
pub const RESUME_NOTICE: &str = "Session resumed";

/// Options for [`SessionRecorder::resume`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResumeOptions {
    /// Replay tunables.
    pub replay: ReplayOptions,
    /// Append an info [`RESUME_NOTICE`] event after reopening.
    pub resume_notice: bool,
}

impl Default for ResumeOptions {
    fn default() -> Self {
        Self {
            replay: ReplayOptions::default(),
            resume_notice: true,
        }
    }
}

impl ResumeOptions {
    /// Options from loaded settings.
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            replay: ReplayOptions::from_settings(settings),
            resume_notice: settings.resume_notice,
        }
    }
}

/// Append-only writer for one session log.
pub struct SessionRecorder {
    path: PathBuf,
    writer: BufWriter<File>,
    next_seq: i64,
    state: ConversationState,
}

impl std::fmt::Debug for SessionRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecorder")
            .field("path", &self.path)
            .field("next_seq", &self.next_seq)
            .field("history_len", &self.state.history().len())
            .finish_non_exhaustive()
    }
}

impl SessionRecorder {
    /// Start a new log in `dir` named `<startTime>_<sessionId>.jsonl`.
    ///
    /// A missing `startTime` is filled with the current time.
    pub fn create(dir: &Path, start: SessionStartPayload) -> Result<Self, RecorderError> {
        std::fs::create_dir_all(dir).map_err(|e| RecorderError::io(dir, e))?;
        let start = with_start_time(start);
        let name = session_file_name(
            start.start_time.as_deref().unwrap_or_default(),
            start.session_id.as_str(),
        );
        Self::create_at(&dir.join(name), start)
    }

    /// Start a new log at an explicit path. Fails if the file exists.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn create_at(path: &Path, start: SessionStartPayload) -> Result<Self, RecorderError> {
        let start = with_start_time(start);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| RecorderError::io(path, e))?;

        let ts = start.start_time.clone().unwrap_or_else(now_ts);
        let metadata = SessionMetadata::from_session_start(start.clone(), &ts);
        let mut recorder = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_seq: 1,
            state: ConversationState::new(metadata),
        };
        let _ = recorder.write_record(&LogEvent::SessionStart(start), ts)?;
        info!(session_id = %recorder.metadata().session_id, "session log created");
        Ok(recorder)
    }

    /// Reopen an existing log for appending.
    ///
    /// The file is replayed first; its warnings are returned alongside the
    /// recorder. Sequencing continues at `lastSeq + 1`. A torn final fragment
    /// is terminated with a newline so new records start on their own line.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn resume(
        path: &Path,
        expected_project_hash: &str,
        options: &ResumeOptions,
    ) -> Result<(Self, Vec<String>), RecorderError> {
        let ReplayOutcome {
            history,
            metadata,
            session_events,
            warnings,
            last_seq,
            ..
        } = replay_session_with(path, expected_project_hash, &options.replay)?;

        let needs_newline = !ends_with_newline(path).map_err(|e| RecorderError::io(path, e))?;
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| RecorderError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        if needs_newline {
            warn!("terminating incomplete final line before resuming");
            writer
                .write_all(b"\n")
                .and_then(|()| writer.flush())
                .map_err(|e| RecorderError::io(path, e))?;
        }

        let mut recorder = Self {
            path: path.to_path_buf(),
            writer,
            next_seq: last_seq.saturating_add(1),
            state: ConversationState::from_parts(metadata, history, session_events),
        };
        if options.resume_notice {
            let _ = recorder.record_session_event(Severity::Info, RESUME_NOTICE)?;
        }
        info!(
            next_seq = recorder.next_seq,
            history_len = recorder.history().len(),
            warnings = warnings.len(),
            "session log resumed"
        );
        Ok((recorder, warnings))
    }

    /// Append a `content` event. Returns its `seq`.
    pub fn record_content(&mut self, content: ContentEntry) -> Result<i64, RecorderError> {
        self.append(LogEvent::Content(ContentPayload { content }))
    }

    /// Append a `compressed` event.
    pub fn record_compressed(
        &mut self,
        summary: ContentEntry,
        items_compressed: u64,
    ) -> Result<i64, RecorderError> {
        self.append(LogEvent::Compressed(CompressedPayload {
            summary,
            items_compressed,
        }))
    }

    /// Append a `rewind` event.
    pub fn record_rewind(&mut self, items_removed: u64) -> Result<i64, RecorderError> {
        self.append(LogEvent::Rewind(RewindPayload { items_removed }))
    }

    /// Append a `provider_switch` event.
    pub fn record_provider_switch(
        &mut self,
        provider: impl Into<String>,
        model: Option<String>,
    ) -> Result<i64, RecorderError> {
        self.append(LogEvent::ProviderSwitch(ProviderSwitchPayload {
            provider: provider.into(),
            model,
        }))
    }

    /// Append a `session_event` audit record.
    pub fn record_session_event(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<i64, RecorderError> {
        self.append(LogEvent::SessionEvent(SessionEvent::new(severity, message)))
    }

    /// Append a `directories_changed` event.
    pub fn record_directories_changed(
        &mut self,
        directories: Vec<String>,
    ) -> Result<i64, RecorderError> {
        self.append(LogEvent::DirectoriesChanged(DirectoriesChangedPayload {
            directories,
        }))
    }

    /// Log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `seq` the next record will carry.
    pub fn next_seq(&self) -> i64 {
        self.next_seq
    }

    /// History as a replay of the file would produce it.
    pub fn history(&self) -> &[ContentEntry] {
        self.state.history()
    }

    /// Current session metadata.
    pub fn metadata(&self) -> &SessionMetadata {
        self.state.metadata()
    }

    /// Audit events recorded so far.
    pub fn session_events(&self) -> &[SessionEvent] {
        self.state.session_events()
    }

    fn append(&mut self, event: LogEvent) -> Result<i64, RecorderError> {
        let seq = self.write_record(&event, now_ts())?;
        self.state.apply(event);
        Ok(seq)
    }

    fn write_record(&mut self, event: &LogEvent, ts: String) -> Result<i64, RecorderError> {
        let seq = self.next_seq;
        let record = EventRecord::from_event(seq, ts, event)?;
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .and_then(|()| self.writer.flush())
            .map_err(|e| RecorderError::io(&self.path, e))?;
        self.next_seq = seq.saturating_add(1);
        debug!(seq, event_type = %event.event_type(), "event recorded");
        Ok(seq)
    }
}

fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn with_start_time(mut start: SessionStartPayload) -> SessionStartPayload {
    if start.start_time.is_none() {
        start.start_time = Some(now_ts());
    }
    start
}

/// Whether the file is empty or its last byte is `\n`.
fn ends_with_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let _ = file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::replay_session;
    use assert_matches::assert_matches;
    use parley_core::SessionId;

    fn start() -> SessionStartPayload {
        SessionStartPayload::new(SessionId::from("sess-1"), "hash-1")
            .with_provider("anthropic", Some("claude".into()))
    }

    #[test]
    fn create_names_file_from_start_time_and_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut payload = start();
        payload.start_time = Some("2025-01-02T03:04:05.000Z".into());
        let recorder = SessionRecorder::create(dir.path(), payload).unwrap();
        assert_eq!(
            recorder.path().file_name().unwrap().to_str().unwrap(),
            "2025-01-02T03-04-05.000Z_sess-1.jsonl"
        );
        assert_eq!(recorder.next_seq(), 2);
    }

    #[test]
    fn create_keeps_hostile_ids_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let payload = SessionStartPayload::new(SessionId::from("x/../../escaped"), "hash-1");
        let recorder = SessionRecorder::create(dir.path(), payload).unwrap();

        assert_eq!(recorder.path().parent().unwrap(), dir.path());
        assert_eq!(recorder.metadata().session_id.as_str(), "x/../../escaped");
    }

    #[test]
    fn create_at_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jsonl");
        std::fs::write(&path, "").unwrap();
        assert_matches!(
            SessionRecorder::create_at(&path, start()),
            Err(RecorderError::Io { .. })
        );
    }

    #[test]
    fn every_record_is_one_line_with_increasing_seq() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        let mut rec = SessionRecorder::create_at(&path, start()).unwrap();
        assert_eq!(rec.record_content(ContentEntry::human("hi")).unwrap(), 2);
        assert_eq!(rec.record_rewind(1).unwrap(), 3);
        assert_eq!(rec.record_session_event(Severity::Warning, "w").unwrap(), 4);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        for (i, line) in lines.iter().enumerate() {
            let record: EventRecord = serde_json::from_str(line).unwrap();
            assert_eq!(record.v, 1);
            assert_eq!(record.seq, i64::try_from(i).unwrap() + 1);
        }
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn recorder_view_matches_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        let mut rec = SessionRecorder::create_at(&path, start()).unwrap();
        let _ = rec.record_content(ContentEntry::human("a")).unwrap();
        let _ = rec.record_content(ContentEntry::ai("b")).unwrap();
        let _ = rec.record_compressed(ContentEntry::summary("a+b"), 2).unwrap();
        let _ = rec.record_content(ContentEntry::human("c")).unwrap();
        let _ = rec.record_provider_switch("openai", None).unwrap();
        let _ = rec.record_directories_changed(vec!["/w".into()]).unwrap();
        let _ = rec.record_session_event(Severity::Info, "note").unwrap();

        let outcome = replay_session(&path, "hash-1").unwrap();
        assert_eq!(outcome.history, rec.history());
        assert_eq!(&outcome.metadata, rec.metadata());
        assert_eq!(outcome.session_events, rec.session_events());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.last_seq, 8);
        assert_eq!(outcome.event_count, 8);
        assert_eq!(outcome.metadata.model.as_deref(), Some("claude"));
    }

    #[test]
    fn resume_continues_sequence_and_adds_notice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        {
            let mut rec = SessionRecorder::create_at(&path, start()).unwrap();
            let _ = rec.record_content(ContentEntry::human("a")).unwrap();
        }

        let (mut rec, warnings) =
            SessionRecorder::resume(&path, "hash-1", &ResumeOptions::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(rec.history().len(), 1);
        assert_eq!(rec.session_events(), [SessionEvent::info(RESUME_NOTICE)]);
        assert_eq!(rec.record_content(ContentEntry::ai("b")).unwrap(), 4);

        let outcome = replay_session(&path, "hash-1").unwrap();
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.session_events.len(), 1);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn resume_without_notice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        drop(SessionRecorder::create_at(&path, start()).unwrap());

        let options = ResumeOptions {
            resume_notice: false,
            ..ResumeOptions::default()
        };
        let (rec, _) = SessionRecorder::resume(&path, "hash-1", &options).unwrap();
        assert!(rec.session_events().is_empty());
        assert_eq!(rec.next_seq(), 2);
    }

    #[test]
    fn resume_after_torn_write_isolates_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        {
            let mut rec = SessionRecorder::create_at(&path, start()).unwrap();
            let _ = rec.record_content(ContentEntry::human("a")).unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"v":1,"seq":3,"ts":"t","type":"cont"#).unwrap();
        drop(file);

        let (mut rec, warnings) =
            SessionRecorder::resume(&path, "hash-1", &ResumeOptions::default()).unwrap();
        assert!(warnings.is_empty());
        let _ = rec.record_content(ContentEntry::ai("b")).unwrap();

        let outcome = replay_session(&path, "hash-1").unwrap();
        let texts: Vec<_> = outcome.history.iter().map(ContentEntry::text).collect();
        assert_eq!(texts, ["a", "b"]);
        assert_eq!(outcome.warnings.len(), 2, "{:?}", outcome.warnings);
        assert!(outcome.warnings[0].contains("line 3"));
    }

    #[test]
    fn resume_with_wrong_hash_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        drop(SessionRecorder::create_at(&path, start()).unwrap());
        assert_matches!(
            SessionRecorder::resume(&path, "other", &ResumeOptions::default()),
            Err(RecorderError::Replay(crate::errors::ReplayError::ProjectHashMismatch { .. }))
        );
    }

    #[test]
    fn resume_options_from_settings() {
        let settings = SessionSettings {
            resume_notice: false,
            ..SessionSettings::default()
        };
        assert!(!ResumeOptions::from_settings(&settings).resume_notice);
    }
}
