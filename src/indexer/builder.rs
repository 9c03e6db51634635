//! Index builder: derives the listing cache from the metadata files on disk.
//!
//! # Error Handling Strategy
//!
//! Rebuilding follows a **graceful degradation** approach:
//!
//! - **Project-level errors**: a namespace that cannot be listed is skipped with a warning
//! - **File-level errors**: a metadata file that cannot be read or parsed is skipped with a
//!   warning; the remaining files still make it into the index
//! - **Store-level errors**: only a failure to enumerate the projects themselves is returned
//!
//! Metadata files are the source of truth, so a partially readable vault still produces a
//! usable index and the skipped files are visible in the logs.

use rayon::prelude::*;

use crate::error::{Result, VaultError};
use crate::indexer::project_discovery::discover_projects;
use crate::models::{IndexEntry, sort_entries_newest_first};
use crate::store::{KeyedStore, StoreKey};

/// Build index entries from every `*.meta.json` in the vault
///
/// Metadata files are parsed in parallel. The result is sorted by `saved_at`
/// (newest first).
///
/// # Errors
///
/// Returns an error only if the project namespaces cannot be enumerated.
///
/// # Examples
///
/// ```no_run
/// use session_vault::{FsStore, build_index};
///
/// let store = FsStore::new("/home/alice/.session-vault");
/// let entries = build_index(&store)?;
/// println!("Indexed {} conversations", entries.len());
/// # Ok::<(), session_vault::VaultError>(())
/// ```
pub fn build_index<S: KeyedStore>(store: &S) -> Result<Vec<IndexEntry>> {
    let keys: Vec<StoreKey> = discover_projects(store)?
        .into_iter()
        .flat_map(|project| {
            let slug = project.slug;
            project.metadata_files.into_iter().map(move |name| StoreKey::project(slug.clone(), name))
        })
        .collect();

    let mut entries: Vec<IndexEntry> = keys
        .par_iter()
        .filter_map(|key| match read_entry(store, key) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(file = %key, error = %e, "skipping unreadable metadata file");
                None
            }
        })
        .collect();

    tracing::info!(entries = entries.len(), files = keys.len(), "built index from metadata");

    sort_entries_newest_first(&mut entries);
    Ok(entries)
}

fn read_entry<S: KeyedStore>(store: &S, key: &StoreKey) -> Result<IndexEntry> {
    let bytes = store.get(key)?;
    serde_json::from_slice(&bytes).map_err(|e| VaultError::json("parse conversation metadata", e))
}
