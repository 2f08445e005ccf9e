//! Conversation content model.
//!
//! A [`ContentEntry`] is one turn-level unit of conversation: who spoke
//! ([`Speaker`]) and an ordered list of typed [`ContentBlock`]s. Provider
//! adapters translate vendor message shapes into entries; the session log
//! and the live history store treat them as immutable values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key marking an entry as a synthesized compression summary.
pub const SUMMARY_METADATA_KEY: &str = "isSummary";

/// Who produced a content entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The human user.
    Human,
    /// The model.
    Ai,
    /// A tool execution result fed back to the model.
    Tool,
}

impl Speaker {
    /// Wire string for this speaker.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
            Self::Tool => "tool",
        }
    }
}

/// A typed block inside a content entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Plain text.
    #[serde(rename = "text")]
    Text {
        /// The text.
        text: String,
    },
    /// A tool invocation requested by the model.
    #[serde(rename = "tool_call")]
    ToolCall {
        /// Tool call ID, echoed back by the matching response.
        id: String,
        /// Tool name.
        name: String,
        /// Tool arguments.
        #[serde(default)]
        parameters: Value,
    },
    /// The result of a tool invocation.
    #[serde(rename = "tool_response")]
    ToolResponse {
        /// ID of the tool call this responds to.
        #[serde(rename = "callId")]
        call_id: String,
        /// Tool name.
        #[serde(rename = "toolName")]
        tool_name: String,
        /// Result payload.
        #[serde(default)]
        result: Value,
        /// Error text when the tool failed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Model reasoning.
    #[serde(rename = "thinking")]
    Thinking {
        /// The reasoning text.
        thought: String,
        /// Provider verification signature.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    /// A code snippet.
    #[serde(rename = "code")]
    Code {
        /// Source text.
        code: String,
        /// Language hint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    /// Image, audio, or document content, inline or by reference.
    #[serde(rename = "media")]
    Media {
        /// MIME type (e.g. `image/png`).
        #[serde(rename = "mimeType")]
        mime_type: String,
        /// Base64-encoded data.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
        /// Remote location.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl ContentBlock {
    /// Create a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a tool call block.
    #[must_use]
    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, parameters: Value) -> Self {
        Self::ToolCall {
            id: id.into(),
            name: name.into(),
            parameters,
        }
    }

    /// Create a successful tool response block.
    #[must_use]
    pub fn tool_response(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: Value,
    ) -> Self {
        Self::ToolResponse {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            result,
            error: None,
        }
    }

    /// Create a thinking block.
    #[must_use]
    pub fn thinking(thought: impl Into<String>) -> Self {
        Self::Thinking {
            thought: thought.into(),
            signature: None,
        }
    }

    /// Returns the text if this is a text block, `None` otherwise.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Whether this block carries nothing worth sending to a provider.
    ///
    /// Only text blocks can be blank; every other block kind is structural.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text { text } => text.trim().is_empty(),
            _ => false,
        }
    }
}

/// One unit of conversation history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Who produced the entry.
    pub speaker: Speaker,
    /// Ordered content blocks.
    pub blocks: Vec<ContentBlock>,
    /// Free-form metadata travelling with the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ContentEntry {
    /// Create an entry from a speaker and blocks.
    #[must_use]
    pub fn new(speaker: Speaker, blocks: Vec<ContentBlock>) -> Self {
        Self {
            speaker,
            blocks,
            metadata: None,
        }
    }

    /// A single-text-block entry from the human.
    #[must_use]
    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Speaker::Human, vec![ContentBlock::text(text)])
    }

    /// A single-text-block entry from the model.
    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Speaker::Ai, vec![ContentBlock::text(text)])
    }

    /// A compression summary entry, marked via [`SUMMARY_METADATA_KEY`].
    #[must_use]
    pub fn summary(text: impl Into<String>) -> Self {
        Self::human(text).with_metadata(SUMMARY_METADATA_KEY, Value::Bool(true))
    }

    /// Attach a metadata key/value, returning the updated entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        let _ = self
            .metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Look up a metadata value.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }

    /// Whether this entry was synthesized by compression.
    #[must_use]
    pub fn is_summary(&self) -> bool {
        self.metadata_value(SUMMARY_METADATA_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the entry has no meaningful content (no blocks, or only blank text).
    ///
    /// Curated history views drop these; raw storage keeps them.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(ContentBlock::is_blank)
    }

    /// Concatenated text of all text blocks, newline-separated.
    #[must_use]
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn speaker_wire_names() {
        assert_eq!(serde_json::to_value(Speaker::Human).unwrap(), "human");
        assert_eq!(serde_json::to_value(Speaker::Ai).unwrap(), "ai");
        assert_eq!(serde_json::to_value(Speaker::Tool).unwrap(), "tool");
        assert_eq!(Speaker::Tool.as_str(), "tool");
    }

    #[test]
    fn unknown_speaker_rejected() {
        let result = serde_json::from_value::<ContentEntry>(json!({
            "speaker": "system",
            "blocks": [],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_blocks_rejected() {
        let result = serde_json::from_value::<ContentEntry>(json!({"speaker": "human"}));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_block_type_rejected() {
        let result = serde_json::from_value::<ContentEntry>(json!({
            "speaker": "ai",
            "blocks": [{"type": "hologram", "text": "?"}],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn text_block_wire_format() {
        let entry = ContentEntry::human("hello");
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            v,
            json!({"speaker": "human", "blocks": [{"type": "text", "text": "hello"}]})
        );
    }

    #[test]
    fn tool_blocks_parse() {
        let entry: ContentEntry = serde_json::from_value(json!({
            "speaker": "tool",
            "blocks": [
                {"type": "tool_response", "callId": "c1", "toolName": "read", "result": {"ok": true}},
                {"type": "tool_call", "id": "c2", "name": "grep"},
            ],
        }))
        .unwrap();
        assert_eq!(entry.speaker, Speaker::Tool);
        assert_matches_tool_response(&entry.blocks[0]);
        match &entry.blocks[1] {
            ContentBlock::ToolCall { parameters, .. } => assert!(parameters.is_null()),
            other => panic!("expected tool call, got {other:?}"),
        }
    }

    fn assert_matches_tool_response(block: &ContentBlock) {
        match block {
            ContentBlock::ToolResponse {
                call_id,
                tool_name,
                error,
                ..
            } => {
                assert_eq!(call_id, "c1");
                assert_eq!(tool_name, "read");
                assert!(error.is_none());
            }
            other => panic!("expected tool response, got {other:?}"),
        }
    }

    #[test]
    fn media_block_optional_fields_omitted() {
        let block = ContentBlock::Media {
            mime_type: "image/png".into(),
            data: Some("aGk=".into()),
            url: None,
        };
        let v = serde_json::to_value(&block).unwrap();
        assert_eq!(v, json!({"type": "media", "mimeType": "image/png", "data": "aGk="}));
    }

    #[test]
    fn summary_is_marked() {
        let summary = ContentEntry::summary("earlier: setup done");
        assert!(summary.is_summary());
        assert_eq!(summary.speaker, Speaker::Human);
        assert!(!ContentEntry::ai("hi").is_summary());
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let entry = ContentEntry::ai("x").with_metadata("model", json!("m-1"));
        let back: ContentEntry = serde_json::from_value(serde_json::to_value(&entry).unwrap()).unwrap();
        assert_eq!(back.metadata_value("model"), Some(&json!("m-1")));
    }

    #[test]
    fn emptiness() {
        assert!(ContentEntry::new(Speaker::Ai, vec![]).is_empty());
        assert!(ContentEntry::ai("   \n").is_empty());
        assert!(!ContentEntry::ai("ok").is_empty());
        let call = ContentEntry::new(
            Speaker::Ai,
            vec![ContentBlock::text(""), ContentBlock::tool_call("c", "ls", json!({}))],
        );
        assert!(!call.is_empty());
    }

    #[test]
    fn text_joins_text_blocks_only() {
        let entry = ContentEntry::new(
            Speaker::Ai,
            vec![
                ContentBlock::text("a"),
                ContentBlock::thinking("hidden"),
                ContentBlock::text("b"),
            ],
        );
        assert_eq!(entry.text(), "a\nb");
    }
}
