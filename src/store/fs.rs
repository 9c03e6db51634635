//! Filesystem-backed store: load/save with atomic writes

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use walkdir::WalkDir;

use super::{KeyedStore, StoreKey};
use crate::error::{Result, VaultError};

const PROJECTS_DIR: &str = "projects";

/// Store rooted at a vault directory
///
/// Layout:
/// - `<root>/<name>` for root documents (`index.json`, `config.json`)
/// - `<root>/projects/<namespace>/<name>` for per-project documents
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    /// Absolute path of a key (validated first)
    pub fn path_for(&self, key: &StoreKey) -> Result<PathBuf> {
        key.validate()?;
        Ok(match &key.namespace {
            Some(namespace) => self.projects_dir().join(namespace).join(&key.name),
            None => self.root.join(&key.name),
        })
    }

    /// Entries directly inside `dir` matching `keep`, as names. A missing dir is empty.
    fn child_names(&self, dir: &Path, keep: impl Fn(&walkdir::DirEntry) -> bool) -> Result<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if keep(&entry) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}

impl KeyedStore for FsStore {
    fn get(&self, key: &StoreKey) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => VaultError::not_found("File", key.to_string()),
            _ => VaultError::io(&path, e),
        })
    }

    fn put(&self, key: &StoreKey, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| VaultError::io(parent, e))?;
        }

        // Write atomically (temp file + rename); each writer gets its own temp file
        let temp = path.with_file_name(format!("{}.{}.tmp", key.name, Uuid::new_v4().simple()));
        if let Err(e) = fs::write(&temp, bytes) {
            let _ = fs::remove_file(&temp);
            return Err(VaultError::io(&temp, e));
        }
        if let Err(e) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(VaultError::io(&path, e));
        }
        Ok(())
    }

    fn contains(&self, key: &StoreKey) -> Result<bool> {
        Ok(self.path_for(key)?.is_file())
    }

    fn list(&self, namespace: &str) -> Result<Vec<String>> {
        let dir = self.path_for(&StoreKey::project(namespace, "_"))?;
        let dir = dir.parent().map(Path::to_path_buf).unwrap_or(dir);
        self.child_names(&dir, |entry| entry.file_type().is_file())
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        self.child_names(&self.projects_dir(), |entry| entry.file_type().is_dir())
    }

    fn delete(&self, key: &StoreKey) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(VaultError::io(&path, e)),
        }
    }
}
