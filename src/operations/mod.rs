//! User-facing vault operations
//!
//! Each operation takes a [`VaultContext`] holding the store and the loaded config, so
//! nothing here reads the environment or global state. Results are plain serializable
//! values; the command-line layer prints them as JSON.

pub mod delete;
pub mod export;
pub mod get;
pub mod list;
pub mod save;
pub mod search;

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use delete::{DeleteOutcome, DeleteRequest, delete_conversations, parse_older_than};
pub use export::{ExportTarget, export_conversations};
pub use get::{ConversationView, Section, extract_section, get_conversation};
pub use list::{DEFAULT_LIST_LIMIT, ListPage, ListQuery, MAX_LIST_LIMIT, list_conversations};
pub use save::{
    AutoSaveOutcome, SaveOutcome, SaveRequest, SessionEndInput, SkipReason, auto_save,
    save_conversation,
};
pub use search::{SearchHit, SearchQuery, SearchResults, parse_date_bound, search_conversations};

use crate::error::Result;
use crate::index_storage::IndexCache;
use crate::models::IndexEntry;
use crate::store::{FsStore, KeyedStore};
use crate::utils::{Config, load_config};

/// Store plus configuration, passed explicitly into every operation
pub struct VaultContext<S: KeyedStore> {
    pub store: S,
    pub config: Config,
}

impl<S: KeyedStore> VaultContext<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn index(&self) -> IndexCache<'_, S> {
        IndexCache::new(&self.store)
    }
}

impl VaultContext<FsStore> {
    /// Open the vault at `root`, loading its config (defaults if absent or invalid)
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let store = FsStore::new(root);
        let config = load_config(&store);
        Self { store, config }
    }
}

/// The listing view of one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub id: String,
    pub project: String,
    pub summary: String,
    pub tags: BTreeSet<String>,
    pub saved_at: DateTime<Utc>,
    pub message_count: usize,
}

impl From<&IndexEntry> for ConversationSummary {
    fn from(entry: &IndexEntry) -> Self {
        Self {
            id: entry.id.clone(),
            project: entry.project.clone(),
            summary: entry.summary.clone(),
            tags: entry.tags.clone(),
            saved_at: entry.saved_at,
            message_count: entry.message_count,
        }
    }
}

/// Force a full index rebuild, returning the number of entries
pub fn rebuild_index<S: KeyedStore>(ctx: &VaultContext<S>) -> Result<usize> {
    Ok(ctx.index().rebuild()?.len())
}

/// Project filter shared by list and search: case-insensitive project name equality
pub(crate) fn project_matches(entry: &IndexEntry, project: &str) -> bool {
    entry.project.to_lowercase() == project.to_lowercase()
}
