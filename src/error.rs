//! Error types for the vault library.
//!
//! Library entry points return [`VaultError`] so callers can tell the failure
//! kinds apart (an oversized transcript is reported differently from a missing
//! record). The command-line layer wraps these in `anyhow` with extra context.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    /// The transcript file is bigger than the configured ceiling. No parse was attempted.
    #[error("Transcript is {size_mb:.2} MB, which exceeds the {limit_mb} MB limit")]
    TranscriptTooLarge { size_mb: f64, limit_mb: f64 },

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// An id prefix that matches more than one conversation
    #[error("Ambiguous id '{prefix}' matches {} conversations: {}", .matches.len(), .matches.join(", "))]
    AmbiguousId { prefix: String, matches: Vec<String> },

    /// A filename or namespace that would escape its directory
    #[error("Invalid store key: '{0}'")]
    InvalidKey(String),

    #[error("Invalid redaction pattern '{pattern}': {source}")]
    InvalidRedactionPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Export format '{0}' is not supported")]
    UnsupportedExportFormat(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl VaultError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound { kind, key: key.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    /// True for the "nothing there" family of failures. An ambiguous prefix names no
    /// single record, so it counts.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::AmbiguousId { .. })
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_message_reports_size_and_limit() {
        let err = VaultError::TranscriptTooLarge { size_mb: 1.2, limit_mb: 1.0 };
        let msg = err.to_string();
        assert!(msg.contains("1.20 MB"));
        assert!(msg.contains("exceeds the 1 MB limit"));
    }

    #[test]
    fn test_not_found_helper() {
        let err = VaultError::not_found("Conversation", "abcd");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Conversation not found: abcd");
    }

    #[test]
    fn test_ambiguous_id_lists_matches() {
        let err = VaultError::AmbiguousId {
            prefix: "abcd".to_string(),
            matches: vec!["abcd1".to_string(), "abcd2".to_string()],
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Ambiguous id 'abcd' matches 2 conversations: abcd1, abcd2");
    }
}
