//! Chat-log data model: timestamped entries, the XML loader, and the sorted
//! store answering time-windowed "active message" queries.
//!
//! The persisted log is a popcorn-style document: a `<popcorn>` root whose
//! children each carry an `in` time attribute (seconds), a `name` attribute
//! and a `message` attribute. Nothing else in the document is consulted.

use std::path::Path;

use crate::error::{OverlayError, OverlayResult};

/// One chat message with its playback timestamp in seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatEntry {
    /// Timestamp in seconds relative to playback start.
    pub time: f64,
    /// Author display name.
    pub user: String,
    /// Message body.
    pub text: String,
}

/// Parse a chat log file into entries ordered by timestamp.
///
/// Any failure (missing file, malformed document, malformed timestamp) is a
/// [`OverlayError::Load`]; callers that want playback to survive a bad file
/// substitute an empty set (see [`crate::ChatOverlay::reload_messages`]).
pub fn load_from_file(path: impl AsRef<Path>) -> OverlayResult<Vec<ChatEntry>> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)
        .map_err(|e| OverlayError::load(format!("read chat log '{}': {e}", path.display())))?;
    parse_log(&xml)
}

/// Parse a chat log document from its XML text.
pub fn parse_log(xml: &str) -> OverlayResult<Vec<ChatEntry>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| OverlayError::load(format!("malformed chat log: {e}")))?;

    let root = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("popcorn"))
        .or_else(|| {
            // The root element itself may be <popcorn>.
            (doc.root_element().has_tag_name("popcorn")).then(|| doc.root_element())
        })
        .ok_or_else(|| OverlayError::load("chat log has no <popcorn> container"))?;

    let mut entries = Vec::new();
    for node in root.children().filter(|n| n.is_element()) {
        let raw_time = node.attribute("in").unwrap_or("0");
        let time: f64 = raw_time.trim().parse().map_err(|_| {
            OverlayError::load(format!("malformed timestamp '{raw_time}' in chat log"))
        })?;
        if !time.is_finite() {
            return Err(OverlayError::load(format!(
                "non-finite timestamp '{raw_time}' in chat log"
            )));
        }
        entries.push(ChatEntry {
            time,
            user: node.attribute("name").unwrap_or_default().to_string(),
            text: node.attribute("message").unwrap_or_default().to_string(),
        });
    }
    Ok(entries)
}

/// Ordered message store keyed by timestamp.
///
/// Always sorted ascending after any mutation; queries are binary searches
/// over the sorted sequence.
#[derive(Clone, Debug, Default)]
pub struct MessageStore {
    entries: Vec<ChatEntry>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole store, sorting defensively even if the input claims
    /// to be ordered. Ties keep their input order (stable sort); relative
    /// order among equal timestamps is not contractual.
    pub fn replace_all(&mut self, mut entries: Vec<ChatEntry>) {
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.entries = entries;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contiguous sub-slice of entries with `time - window <= t <= time`.
    ///
    /// Lower/upper bound pair over the sorted sequence, `O(log n + k)`.
    pub fn query_active(&self, time: f64, window: f64) -> &[ChatEntry] {
        let lo = self.entries.partition_point(|e| e.time < time - window);
        let hi = self.entries.partition_point(|e| e.time <= time);
        if lo >= hi {
            return &[];
        }
        &self.entries[lo..hi]
    }
}
