use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Manual,
    Auto,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Manual => f.write_str("manual"),
            Source::Auto => f.write_str("auto"),
        }
    }
}

/// Canonical metadata of one saved conversation, stored as `<prefix>.meta.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub project: String,
    pub project_path: String,
    #[serde(default = "unknown_session")]
    pub session_id: String,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub git_commit: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub note: String,
    pub summary: String,
    pub message_count: usize,
    #[serde(default)]
    pub source: Source,
    pub transcript_file: String,
    pub metadata_file: String,
}

/// Caller-supplied fields for a save; the vault fills in ids, filenames and timestamps
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub project_path: String,
    pub session_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub git_branch: Option<String>,
    pub git_commit: Option<String>,
    pub tags: BTreeSet<String>,
    pub note: String,
    pub summary: String,
    pub message_count: usize,
    pub source: Source,
}

fn unknown_session() -> String {
    "unknown".to_string()
}

/// Anything that knows where its two sibling files live
pub trait RecordFiles {
    fn project_path(&self) -> &str;
    fn transcript_file(&self) -> &str;
    fn metadata_file(&self) -> &str;
}

impl RecordFiles for ConversationRecord {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reads_minimal_metadata_with_defaults() {
        let json = r#"{
            "id": "abc",
            "project": "demo",
            "project_path": "/home/user/demo",
            "created_at": "2026-02-19T12:00:00Z",
            "saved_at": 1771502400000,
            "summary": "s",
            "message_count": 3,
            "transcript_file": "a.md",
            "metadata_file": "a.meta.json"
        }"#;

        let record: ConversationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.session_id, "unknown");
        assert_eq!(record.source, Source::Manual);
        assert!(record.tags.is_empty());
        assert!(record.git_branch.is_none());
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Auto).unwrap(), r#""auto""#);
        let parsed: Source = serde_json::from_str(r#""manual""#).unwrap();
        assert_eq!(parsed, Source::Manual);
    }
}
