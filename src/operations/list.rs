use serde::Serialize;

use super::{ConversationSummary, VaultContext, project_matches};
use crate::error::Result;
use crate::filters::{FilterExpr, apply_filters};
use crate::models::sort_entries_newest_first;
use crate::store::KeyedStore;

pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Project name, case-insensitive
    pub project: Option<String>,
    pub tag: Option<String>,
    pub filter: FilterExpr,
    /// Clamped to `1..=MAX_LIST_LIMIT`; `None` means [`DEFAULT_LIST_LIMIT`]
    pub limit: Option<usize>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListPage {
    pub conversations: Vec<ConversationSummary>,
    /// Matches before pagination
    pub total: usize,
}

/// Newest-first page of saved conversations
pub fn list_conversations<S: KeyedStore>(
    ctx: &VaultContext<S>,
    query: &ListQuery,
) -> Result<ListPage> {
    let mut entries = ctx.index().load()?.entries;
    sort_entries_newest_first(&mut entries);

    if let Some(project) = &query.project {
        entries.retain(|entry| project_matches(entry, project));
    }
    if let Some(tag) = &query.tag {
        entries.retain(|entry| entry.has_tag(tag));
    }
    let entries = apply_filters(entries, &query.filter);

    let total = entries.len();
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let conversations =
        entries.iter().skip(query.offset).take(limit).map(ConversationSummary::from).collect();

    Ok(ListPage { conversations, total })
}
