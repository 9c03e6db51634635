//! Session Vault - Save, index and retrieve AI coding session transcripts
//!
//! This library turns JSONL session transcripts into Markdown documents stored in a
//! per-project vault directory, and keeps a rebuildable index over them. It supports:
//!
//! - Parsing transcripts (bare and wrapped message shapes, streaming for large files)
//! - Rendering Markdown with summaries and configurable secret redaction
//! - Storing records under `<vault>/projects/<slug>/` with JSON metadata sidecars
//! - A self-healing `index.json` cache with id-prefix resolution
//! - List, search, section extraction, delete and export operations
//!
//! # Example
//!
//! ```no_run
//! use session_vault::{FsStore, IndexCache};
//!
//! let store = FsStore::new("/Users/alice/.session-vault");
//! let index = IndexCache::new(&store).load()?;
//! println!("Indexed {} conversations", index.len());
//! # Ok::<(), session_vault::VaultError>(())
//! ```

pub mod cli;
pub mod error;
pub mod filters;
pub mod index_storage;
pub mod indexer;
pub mod models;
pub mod operations;
pub mod parsers;
pub mod render;
pub mod storage;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, VaultError};
pub use index_storage::{IndexCache, resolve_id};
pub use indexer::build_index;
pub use models::{ConversationRecord, IndexEntry, ParsedTranscript, VaultIndex};
pub use operations::VaultContext;
pub use parsers::{ParseLimits, parse_jsonl_str, parse_transcript_file};
pub use render::{RedactionRule, render_markdown};
pub use storage::Vault;
pub use store::{FsStore, KeyedStore, MemoryStore, StoreKey};
pub use utils::paths::{path_to_slug, project_name};
