use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::VaultContext;
use crate::error::{Result, VaultError};
use crate::models::{ConversationRecord, IndexEntry};
use crate::storage::Vault;
use crate::store::KeyedStore;
use crate::utils::ExportFormat;

const EXPORT_ID_CHARS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// A full id or unambiguous prefix
    One(String),
    All,
}

impl ExportTarget {
    /// `all` selects every conversation; anything else is an id
    pub fn parse(value: &str) -> Self {
        if value == "all" { ExportTarget::All } else { ExportTarget::One(value.to_string()) }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    metadata: &'a ConversationRecord,
    transcript: &'a str,
}

/// Write conversations into `output_dir`, returning the created files
///
/// Files are named `<saved date>_<first 8 id chars>.<ext>`. `md` writes the stored
/// body; `json` writes `{metadata, transcript}`.
///
/// # Errors
///
/// [`VaultError::UnsupportedExportFormat`] for `html`, resolution errors for a single
/// id, and I/O errors. With [`ExportTarget::All`], conversations whose files are gone
/// are skipped.
pub fn export_conversations<S: KeyedStore>(
    ctx: &VaultContext<S>,
    target: &ExportTarget,
    format: ExportFormat,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if format == ExportFormat::Html {
        return Err(VaultError::UnsupportedExportFormat(format.to_string()));
    }

    let entries = match target {
        ExportTarget::One(id) => vec![ctx.index().resolve(id)?],
        ExportTarget::All => ctx.index().load()?.entries,
    };
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    fs::create_dir_all(output_dir).map_err(|e| VaultError::io(output_dir, e))?;

    let vault = Vault::new(&ctx.store);
    let mut files = Vec::with_capacity(entries.len());
    for entry in &entries {
        match export_one(&vault, entry, format, output_dir) {
            Ok(path) => files.push(path),
            Err(e) if e.is_not_found() && *target == ExportTarget::All => {
                tracing::warn!(id = %entry.id, error = %e, "skipping conversation with missing files");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(files)
}

fn export_one<S: KeyedStore>(
    vault: &Vault<'_, S>,
    entry: &IndexEntry,
    format: ExportFormat,
    output_dir: &Path,
) -> Result<PathBuf> {
    let transcript = vault.read_transcript(&entry.project_path, &entry.transcript_file)?;
    let contents = match format {
        ExportFormat::Json => {
            let metadata = vault.read_metadata(&entry.project_path, &entry.metadata_file)?;
            serde_json::to_string_pretty(&JsonExport { metadata: &metadata, transcript: &transcript })
                .map_err(|e| VaultError::json("serialize export", e))?
        }
        _ => transcript,
    };

    let path = output_dir.join(export_file_name(entry, format));
    fs::write(&path, contents).map_err(|e| VaultError::io(&path, e))?;
    Ok(path)
}

fn export_file_name(entry: &IndexEntry, format: ExportFormat) -> String {
    let short_id: String = entry.id.chars().take(EXPORT_ID_CHARS).collect();
    format!("{}_{}.{}", entry.saved_at.format("%Y-%m-%d"), short_id, format.extension())
}
