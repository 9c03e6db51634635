use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::models::{ConversationRecord, NewRecord, RecordFiles};
use crate::store::{KeyedStore, StoreKey};
use crate::utils::{path_to_slug, project_name};

pub const TRANSCRIPT_EXTENSION: &str = ".md";
pub const METADATA_EXTENSION: &str = ".meta.json";

const PREFIX_RANDOM_HEX_LEN: usize = 8;

/// Append-only record storage over a [`KeyedStore`]
///
/// Every saved conversation becomes two sibling documents in the project's namespace:
/// the rendered body (`<prefix>.md`) and its metadata (`<prefix>.meta.json`).
/// Records are never updated in place.
pub struct Vault<'a, S: KeyedStore> {
    store: &'a S,
}

impl<'a, S: KeyedStore> Vault<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Persist a rendered body and its metadata, returning the canonical record
    ///
    /// The body is written before the metadata, so a metadata file always has its
    /// transcript. If the metadata cannot be written, the body is removed again.
    /// Identical inputs produce distinct ids and filenames.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidKey`] when the project path has no usable slug,
    /// or an I/O error from the store.
    pub fn save(&self, body: &str, new: &NewRecord) -> Result<ConversationRecord> {
        let slug = path_to_slug(&new.project_path);
        let now = Utc::now();

        let prefix = loop {
            let candidate = file_prefix(now);
            let transcript = StoreKey::project(&slug, format!("{candidate}{TRANSCRIPT_EXTENSION}"));
            let metadata = StoreKey::project(&slug, format!("{candidate}{METADATA_EXTENSION}"));
            if !self.store.contains(&transcript)? && !self.store.contains(&metadata)? {
                break candidate;
            }
            tracing::debug!(prefix = %candidate, "filename prefix collision, regenerating");
        };

        let record = ConversationRecord {
            id: Uuid::new_v4().to_string(),
            project: project_name(&new.project_path),
            project_path: new.project_path.clone(),
            session_id: new.session_id.clone().unwrap_or_else(|| "unknown".to_string()),
            created_at: new.created_at.unwrap_or(now),
            saved_at: now,
            git_branch: new.git_branch.clone(),
            git_commit: new.git_commit.clone(),
            tags: new.tags.clone(),
            note: new.note.clone(),
            summary: new.summary.clone(),
            message_count: new.message_count,
            source: new.source,
            transcript_file: format!("{prefix}{TRANSCRIPT_EXTENSION}"),
            metadata_file: format!("{prefix}{METADATA_EXTENSION}"),
        };

        let body_key = StoreKey::project(&slug, &record.transcript_file);
        self.store.put(&body_key, body.as_bytes())?;

        if let Err(e) = self.write_metadata(&slug, &record) {
            // A body without metadata is invisible to the index
            if let Err(cleanup) = self.store.delete(&body_key) {
                tracing::warn!(file = %body_key, error = %cleanup, "failed to remove orphaned body");
            }
            return Err(e);
        }

        tracing::info!(id = %record.id, project = %record.project, file = %record.transcript_file, "saved conversation");
        Ok(record)
    }

    fn write_metadata(&self, slug: &str, record: &ConversationRecord) -> Result<()> {
        let metadata = serde_json::to_string_pretty(record)
            .map_err(|e| VaultError::json("serialize conversation metadata", e))?;
        self.store.put(&StoreKey::project(slug, &record.metadata_file), metadata.as_bytes())
    }

    /// Rendered body of a record
    pub fn read_transcript(&self, project_path: &str, transcript_file: &str) -> Result<String> {
        self.store
            .get_string(&StoreKey::project(path_to_slug(project_path), transcript_file))
    }

    /// Canonical metadata of a record
    pub fn read_metadata(
        &self,
        project_path: &str,
        metadata_file: &str,
    ) -> Result<ConversationRecord> {
        let bytes =
            self.store.get(&StoreKey::project(path_to_slug(project_path), metadata_file))?;
        serde_json::from_slice(&bytes).map_err(|e| VaultError::json("parse conversation metadata", e))
    }

    /// Remove both sibling documents. Deleting twice is not an error.
    ///
    /// Returns whether anything was removed.
    pub fn delete(&self, record: &impl RecordFiles) -> Result<bool> {
        let slug = path_to_slug(record.project_path());
        let transcript = self.store.delete(&StoreKey::project(&slug, record.transcript_file()))?;
        let metadata = self.store.delete(&StoreKey::project(&slug, record.metadata_file()))?;
        Ok(transcript || metadata)
    }
}

/// `YYYY-MM-DD_<8 random hex>`
fn file_prefix(now: chrono::DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}_{}", now.format("%Y-%m-%d"), &random[..PREFIX_RANDOM_HEX_LEN])
}
