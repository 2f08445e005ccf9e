//! Payloads that change conversation history.

use parley_core::ContentEntry;
use serde::{Deserialize, Serialize};

/// Payload for `content` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentPayload {
    /// The entry appended to history.
    pub content: ContentEntry,
}

/// Payload for `compressed` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedPayload {
    /// The single entry that replaces all prior history.
    pub summary: ContentEntry,
    /// How many entries the writer compressed. Informational.
    pub items_compressed: u64,
}

/// Payload for `rewind` events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewindPayload {
    /// Entries to remove from the tail. Negative values fail to deserialize.
    pub items_removed: u64,
}
