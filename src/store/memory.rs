use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use super::{KeyedStore, StoreKey};
use crate::error::{Result, VaultError};

/// In-memory store with the same key rules as [`FsStore`](super::FsStore)
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<StoreKey, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, BTreeMap<StoreKey, Vec<u8>>> {
        // A panic mid-insert cannot leave a BTreeMap half-written, so poison is ignored
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyedStore for MemoryStore {
    fn get(&self, key: &StoreKey) -> Result<Vec<u8>> {
        key.validate()?;
        self.documents()
            .get(key)
            .cloned()
            .ok_or_else(|| VaultError::not_found("File", key.to_string()))
    }

    fn put(&self, key: &StoreKey, bytes: &[u8]) -> Result<()> {
        key.validate()?;
        self.documents().insert(key.clone(), bytes.to_vec());
        Ok(())
    }

    fn contains(&self, key: &StoreKey) -> Result<bool> {
        key.validate()?;
        Ok(self.documents().contains_key(key))
    }

    fn list(&self, namespace: &str) -> Result<Vec<String>> {
        Ok(self
            .documents()
            .keys()
            .filter(|key| key.namespace.as_deref() == Some(namespace))
            .map(|key| key.name.clone())
            .collect())
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        let namespaces: BTreeSet<String> =
            self.documents().keys().filter_map(|key| key.namespace.clone()).collect();
        Ok(namespaces.into_iter().collect())
    }

    fn delete(&self, key: &StoreKey) -> Result<bool> {
        key.validate()?;
        Ok(self.documents().remove(key).is_some())
    }
}
