//! Keyed storage behind the vault
//!
//! The vault treats its root directory as a tiny database: project directories are
//! namespaces and filenames are keys. [`KeyedStore`] captures exactly the operations the
//! vault and the index cache need, so callers never build paths themselves.
//!
//! - [`FsStore`] - the on-disk layout (`<root>/<name>` and `<root>/projects/<ns>/<name>`)
//! - [`MemoryStore`] - an in-process map, used by tests

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::utils::validate_key_component;

/// Address of one stored document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey {
    /// Project slug, or `None` for documents at the vault root
    pub namespace: Option<String>,
    pub name: String,
}

impl StoreKey {
    pub fn root(name: impl Into<String>) -> Self {
        Self { namespace: None, name: name.into() }
    }

    pub fn project(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: Some(namespace.into()), name: name.into() }
    }

    /// Rejects keys that would leave their directory
    pub fn validate(&self) -> Result<()> {
        if let Some(namespace) = &self.namespace {
            validate_key_component(namespace)?;
        }
        validate_key_component(&self.name)
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

pub trait KeyedStore: Send + Sync {
    /// Fetch a document; a missing key is [`VaultError::NotFound`](crate::error::VaultError)
    fn get(&self, key: &StoreKey) -> Result<Vec<u8>>;

    /// Create or replace a document
    fn put(&self, key: &StoreKey, bytes: &[u8]) -> Result<()>;

    fn contains(&self, key: &StoreKey) -> Result<bool>;

    /// Names of all documents in a project namespace; empty if it does not exist
    fn list(&self, namespace: &str) -> Result<Vec<String>>;

    /// All project namespaces; empty if there are none
    fn namespaces(&self) -> Result<Vec<String>>;

    /// Remove a document, returning whether it existed
    fn delete(&self, key: &StoreKey) -> Result<bool>;

    fn get_string(&self, key: &StoreKey) -> Result<String> {
        let bytes = self.get(key)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
