use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{ConversationRecord, RecordFiles, Source};

/// Cache schema version; any other value in `index.json` triggers a rebuild
pub const INDEX_VERSION: u32 = 1;

/// Display/filter projection of a [`ConversationRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub project: String,
    pub project_path: String,
    pub summary: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub note: String,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub saved_at: DateTime<Utc>,
    pub message_count: usize,
    #[serde(default)]
    pub source: Source,
    pub transcript_file: String,
    pub metadata_file: String,
}

impl IndexEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl From<&ConversationRecord> for IndexEntry {
    fn from(record: &ConversationRecord) -> Self {
        Self {
            id: record.id.clone(),
            project: record.project.clone(),
            project_path: record.project_path.clone(),
            summary: record.summary.clone(),
            tags: record.tags.clone(),
            note: record.note.clone(),
            saved_at: record.saved_at,
            message_count: record.message_count,
            source: record.source,
            transcript_file: record.transcript_file.clone(),
            metadata_file: record.metadata_file.clone(),
        }
    }
}

impl From<ConversationRecord> for IndexEntry {
    fn from(record: ConversationRecord) -> Self {
        Self::from(&record)
    }
}

impl RecordFiles for IndexEntry {
    fn project_path(&self) -> &str {
        &self.project_path
    }

    fn transcript_file(&self) -> &str {
        &self.transcript_file
    }

    fn metadata_file(&self) -> &str {
        &self.metadata_file
    }
}

/// The persisted `index.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultIndex {
    pub version: u32,
    pub entries: Vec<IndexEntry>,
}

impl VaultIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { version: INDEX_VERSION, entries }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first. Only `rebuild()` guarantees this order on its own.
    pub fn sort_by_saved_at_desc(&mut self) {
        sort_entries_newest_first(&mut self.entries);
    }
}

impl Default for VaultIndex {
    fn default() -> Self {
        Self::empty()
    }
}

pub fn sort_entries_newest_first(entries: &mut [IndexEntry]) {
    entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
}
