//! Data models for the conversation vault.
//!
//! - [`Message`] / [`ParsedTranscript`] - normalized parser output
//! - [`ConversationRecord`] - canonical per-conversation metadata, one file per record
//! - [`IndexEntry`] / [`VaultIndex`] - the rebuildable listing cache
//! - [`ProjectInfo`] - a project namespace discovered during a rebuild scan
//!
//! Timestamps read back from disk go through the tolerant deserializer in
//! `parsers::deserializers`, so both RFC 3339 strings and Unix milliseconds load.

pub mod index;
pub mod project;
pub mod record;
pub mod transcript;

pub use index::{INDEX_VERSION, IndexEntry, VaultIndex, sort_entries_newest_first};
pub use project::ProjectInfo;
pub use record::{ConversationRecord, NewRecord, RecordFiles, Source};
pub use transcript::{Message, ParsedTranscript, Role};
