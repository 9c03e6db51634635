use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Serialize;

use super::{ConversationSummary, VaultContext};
use crate::error::{Result, VaultError};
use crate::models::IndexEntry;
use crate::storage::Vault;
use crate::store::KeyedStore;

static OLDER_THAN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+)([dhm])$").ok());

/// Days in the `m` unit of `older_than`
const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, Default)]
pub struct DeleteRequest {
    /// Full ids or unambiguous prefixes; when present, `older_than` and `tag` are ignored
    pub ids: Vec<String>,
    /// `<n>d`, `<n>h` or `<n>m` (30-day months)
    pub older_than: Option<String>,
    pub tag: Option<String>,
    /// `false` only previews the selection
    pub confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteOutcome {
    NoMatches,
    Preview { would_delete: Vec<ConversationSummary>, count: usize },
    Deleted { deleted_ids: Vec<String>, deleted_count: usize },
}

/// Select conversations and either preview or delete them
///
/// # Errors
///
/// [`VaultError::InvalidFilter`] when nothing selects conversations or `older_than` is
/// malformed, [`VaultError::AmbiguousId`] when an id prefix matches several
/// conversations. Unknown ids are skipped.
pub fn delete_conversations<S: KeyedStore>(
    ctx: &VaultContext<S>,
    request: &DeleteRequest,
) -> Result<DeleteOutcome> {
    let selected = select(ctx, request)?;
    if selected.is_empty() {
        return Ok(DeleteOutcome::NoMatches);
    }

    if !request.confirm {
        let would_delete: Vec<ConversationSummary> =
            selected.iter().map(ConversationSummary::from).collect();
        return Ok(DeleteOutcome::Preview { count: would_delete.len(), would_delete });
    }

    let vault = Vault::new(&ctx.store);
    let mut deleted_ids: Vec<String> = Vec::with_capacity(selected.len());
    for entry in selected {
        if let Err(e) = vault.delete(&entry) {
            // Entries whose files are already gone must not outlive this call
            if let Err(cleanup) = ctx.index().remove_many(&deleted_ids) {
                tracing::warn!(error = %cleanup, "failed to drop deleted conversations from the index");
            }
            return Err(e);
        }
        deleted_ids.push(entry.id);
    }
    ctx.index().remove_many(&deleted_ids)?;

    tracing::info!(count = deleted_ids.len(), "deleted conversations");
    Ok(DeleteOutcome::Deleted { deleted_count: deleted_ids.len(), deleted_ids })
}

fn select<S: KeyedStore>(ctx: &VaultContext<S>, request: &DeleteRequest) -> Result<Vec<IndexEntry>> {
    if !request.ids.is_empty() {
        let index = ctx.index();
        let mut selected: Vec<IndexEntry> = Vec::new();
        for id in &request.ids {
            match index.resolve(id) {
                Ok(entry) => {
                    if !selected.iter().any(|e| e.id == entry.id) {
                        selected.push(entry);
                    }
                }
                Err(VaultError::NotFound { .. }) => {
                    tracing::warn!(id = %id, "no conversation matches, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        return Ok(selected);
    }

    if request.older_than.is_none() && request.tag.is_none() {
        return Err(VaultError::InvalidFilter(
            "delete needs ids, older_than or tag".to_string(),
        ));
    }

    let cutoff = request.older_than.as_deref().map(parse_older_than).transpose()?;
    let mut entries = ctx.index().load()?.entries;
    entries.retain(|entry| {
        cutoff.is_none_or(|cutoff| entry.saved_at < cutoff)
            && request.tag.as_deref().is_none_or(|tag| entry.has_tag(tag))
    });
    Ok(entries)
}

/// Cutoff instant for an age like `30d`, `12h` or `6m`, measured from now
pub fn parse_older_than(value: &str) -> Result<DateTime<Utc>> {
    parse_older_than_at(value, Utc::now())
}

fn parse_older_than_at(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let invalid = || {
        VaultError::InvalidFilter(format!(
            "invalid older_than '{}' (use e.g. 30d, 12h or 6m)",
            value
        ))
    };

    let captures = OLDER_THAN.as_ref().and_then(|re| re.captures(value)).ok_or_else(invalid)?;
    let amount: i64 = captures[1].parse().map_err(|_| invalid())?;
    let age = match &captures[2] {
        "d" => Duration::try_days(amount),
        "h" => Duration::try_hours(amount),
        _ => amount.checked_mul(DAYS_PER_MONTH).and_then(Duration::try_days),
    }
    .ok_or_else(invalid)?;

    now.checked_sub_signed(age).ok_or_else(invalid)
}
