use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;

use super::{VaultContext, project_matches};
use crate::error::{Result, VaultError};
use crate::filters::{FilterExpr, apply_filters};
use crate::models::{IndexEntry, sort_entries_newest_first};
use crate::storage::Vault;
use crate::store::KeyedStore;

const SUMMARY_SCORE: u32 = 3;
const NOTE_SCORE: u32 = 2;
const TAG_SCORE: u32 = 2;
const BODY_SCORE: u32 = 1;
const CONTEXT_LINES: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Matched case-insensitively as a substring
    pub query: String,
    pub project: Option<String>,
    pub tag: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub filter: FilterExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub summary: String,
    pub match_context: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    pub total: usize,
}

/// Score every candidate conversation against the query, best first
///
/// Metadata hits score summary 3, note 2, tags 2. The stored body is only read when
/// no metadata field matched, and adds 1. Equal scores keep newest-first order.
pub fn search_conversations<S: KeyedStore>(
    ctx: &VaultContext<S>,
    query: &SearchQuery,
) -> Result<SearchResults> {
    let mut entries = ctx.index().load()?.entries;
    sort_entries_newest_first(&mut entries);

    entries.retain(|entry| {
        query.project.as_deref().is_none_or(|project| project_matches(entry, project))
            && query.tag.as_deref().is_none_or(|tag| entry.has_tag(tag))
            && query.date_from.is_none_or(|from| entry.saved_at >= from)
            && query.date_to.is_none_or(|to| entry.saved_at <= to)
    });
    let entries = apply_filters(entries, &query.filter);

    let needle = query.query.to_lowercase();
    let vault = Vault::new(&ctx.store);
    let mut results: Vec<SearchHit> =
        entries.iter().filter_map(|entry| score_entry(&vault, entry, &needle)).collect();

    results.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(SearchResults { total: results.len(), results })
}

fn score_entry<S: KeyedStore>(
    vault: &Vault<'_, S>,
    entry: &IndexEntry,
    needle: &str,
) -> Option<SearchHit> {
    let mut score = 0;
    let mut context: Option<String> = None;

    if entry.summary.to_lowercase().contains(needle) {
        score += SUMMARY_SCORE;
        context.get_or_insert_with(|| entry.summary.clone());
    }
    if entry.note.to_lowercase().contains(needle) {
        score += NOTE_SCORE;
        context.get_or_insert_with(|| entry.note.clone());
    }
    if entry.tags.iter().any(|tag| tag.to_lowercase().contains(needle)) {
        score += TAG_SCORE;
        context.get_or_insert_with(|| {
            format!("Tags: {}", entry.tags.iter().cloned().collect::<Vec<_>>().join(", "))
        });
    }

    if context.as_deref().is_none_or(str::is_empty) {
        match vault.read_transcript(&entry.project_path, &entry.transcript_file) {
            Ok(body) => {
                if let Some(found) = extract_context(&body, needle, CONTEXT_LINES) {
                    score += BODY_SCORE;
                    context = Some(found);
                }
            }
            Err(e) => {
                tracing::debug!(id = %entry.id, error = %e, "skipping body search");
            }
        }
    }

    (score > 0).then(|| SearchHit {
        id: entry.id.clone(),
        summary: entry.summary.clone(),
        match_context: context.unwrap_or_default(),
        score,
    })
}

/// The first line containing `needle` (already lowercased) with `radius` lines either side
fn extract_context(content: &str, needle: &str, radius: usize) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let hit = lines.iter().position(|line| line.to_lowercase().contains(needle))?;
    let start = hit.saturating_sub(radius);
    let end = (hit + radius + 1).min(lines.len());
    Some(lines[start..end].join("\n"))
}

/// Parse a search date bound: RFC 3339, or `YYYY-MM-DD` meaning the start of that day
/// (`end_of_day = false`) or its last instant (`end_of_day = true`), in UTC
pub fn parse_date_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let day = crate::filters::parser::parse_day(value).ok_or_else(|| {
        VaultError::InvalidFilter(format!("'{}' is not a YYYY-MM-DD date or RFC 3339 time", value))
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };
    Ok(day.and_time(time).and_utc())
}
