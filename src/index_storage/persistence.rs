//! Index cache persistence: load/save with atomic writes and self-healing

use crate::error::{Result, VaultError};
use crate::index_storage::resolver::{ResolveError, resolve_id};
use crate::indexer::build_index;
use crate::models::{INDEX_VERSION, IndexEntry, VaultIndex};
use crate::store::{KeyedStore, StoreKey};

pub const INDEX_FILENAME: &str = "index.json";

/// The `index.json` cache over all saved conversations
///
/// Metadata files stay authoritative. Whenever the cache is missing, unreadable,
/// unparseable or written by another schema version, [`load`](Self::load) rebuilds it
/// from them instead of surfacing an error.
///
/// The read-modify-write in [`add`](Self::add) and [`remove`](Self::remove) is not
/// locked. Every write goes through its own temp file and an atomic rename, so
/// concurrent writers never fail and readers never see a torn file, but one writer
/// can still lose another's update.
pub struct IndexCache<'a, S: KeyedStore> {
    store: &'a S,
}

impl<'a, S: KeyedStore> IndexCache<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn key() -> StoreKey {
        StoreKey::root(INDEX_FILENAME)
    }

    /// Load the cache, rebuilding and persisting it when it cannot be used as is
    pub fn load(&self) -> Result<VaultIndex> {
        let bytes = match self.store.get(&Self::key()) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                tracing::debug!("index missing, rebuilding");
                return self.rebuild();
            }
            Err(e) => {
                tracing::warn!(error = %e, "index unreadable, rebuilding");
                return self.rebuild();
            }
        };

        match serde_json::from_slice::<VaultIndex>(&bytes) {
            Ok(index) if index.version == INDEX_VERSION => Ok(index),
            Ok(index) => {
                tracing::warn!(
                    expected = INDEX_VERSION,
                    found = index.version,
                    "index version mismatch, rebuilding"
                );
                self.rebuild()
            }
            Err(e) => {
                tracing::warn!(error = %e, "index corrupted, rebuilding");
                self.rebuild()
            }
        }
    }

    /// Scan every metadata file and replace the cache with the result
    ///
    /// The rebuilt index is sorted by `saved_at`, newest first. An empty vault yields
    /// (and persists) an empty index.
    pub fn rebuild(&self) -> Result<VaultIndex> {
        let index = VaultIndex::new(build_index(self.store)?);
        self.save(&index)?;
        tracing::info!(entries = index.len(), "rebuilt index");
        Ok(index)
    }

    /// Write the cache atomically
    pub fn save(&self, index: &VaultIndex) -> Result<()> {
        let json = serde_json::to_string_pretty(index)
            .map_err(|e| VaultError::json("serialize index", e))?;
        self.store.put(&Self::key(), json.as_bytes())
    }

    /// Append an entry. Order is not maintained; readers sort explicitly.
    ///
    /// If loading had to rebuild the cache, the rebuild already picked up the new
    /// record from its metadata file, so an entry with the same id is replaced
    /// rather than duplicated.
    pub fn add(&self, entry: IndexEntry) -> Result<()> {
        let mut index = self.load()?;
        match index.entries.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry,
            None => index.entries.push(entry),
        }
        self.save(&index)
    }

    /// Drop the entry with this id, returning whether one was removed
    ///
    /// The cache is only rewritten when something changed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut index = self.load()?;
        let before = index.entries.len();
        index.entries.retain(|entry| entry.id != id);
        if index.entries.len() == before {
            return Ok(false);
        }
        self.save(&index)?;
        Ok(true)
    }

    /// Drop every entry whose id is in `ids`, returning how many were removed
    pub fn remove_many(&self, ids: &[String]) -> Result<usize> {
        let mut index = self.load()?;
        let before = index.entries.len();
        index.entries.retain(|entry| !ids.contains(&entry.id));
        let removed = before - index.entries.len();
        if removed > 0 {
            self.save(&index)?;
        }
        Ok(removed)
    }

    /// Exact-id lookup
    pub fn find(&self, id: &str) -> Result<Option<IndexEntry>> {
        Ok(self.load()?.entries.into_iter().find(|entry| entry.id == id))
    }

    /// Resolve a full id or unambiguous prefix to one entry
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] for unknown or too-short candidates,
    /// [`VaultError::AmbiguousId`] when a prefix matches several ids.
    pub fn resolve(&self, candidate: &str) -> Result<IndexEntry> {
        let index = self.load()?;
        match resolve_id(&index.entries, candidate) {
            Ok(entry) => Ok(entry.clone()),
            Err(ResolveError::Ambiguous(matches)) => {
                Err(VaultError::AmbiguousId { prefix: candidate.to_string(), matches })
            }
            Err(ResolveError::TooShort | ResolveError::NotFound) => {
                Err(VaultError::not_found("Conversation", candidate))
            }
        }
    }
}
