use chrono::{DateTime, NaiveTime, Utc};

use super::ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};
use super::parser::parse_day;
use crate::models::IndexEntry;

/// Keep the entries the expression matches, preserving order
pub fn apply_filters(entries: Vec<IndexEntry>, filter: &FilterExpr) -> Vec<IndexEntry> {
    if filter.is_empty() {
        return entries;
    }
    entries.into_iter().filter(|entry| matches_entry(entry, filter)).collect()
}

/// Evaluate the expression left to right against one entry
pub fn matches_entry(entry: &IndexEntry, filter: &FilterExpr) -> bool {
    let Some(first) = filter.filters.first() else {
        return true;
    };

    let mut result = evaluate_field_filter(entry, first);
    for (operator, next) in filter.operators.iter().zip(&filter.filters[1..]) {
        let next = evaluate_field_filter(entry, next);
        result = match operator {
            FilterOperator::And => result && next,
            FilterOperator::Or => result || next,
        };
    }
    result
}

fn evaluate_field_filter(entry: &IndexEntry, filter: &FieldFilter) -> bool {
    match filter.field {
        FilterField::Project => match_project(entry, &filter.value),
        FilterField::Tag => entry.has_tag(&filter.value),
        FilterField::Source => entry.source.to_string().eq_ignore_ascii_case(&filter.value),
        FilterField::Since => start_of_day(&filter.value).is_some_and(|from| entry.saved_at >= from),
        FilterField::Until => match start_of_day_after(&filter.value) {
            Some(end) => entry.saved_at < end,
            // Last representable day: nothing can be later
            None => parse_day(&filter.value).is_some(),
        },
    }
}

/// Project name equality or project path substring, both case-insensitive
///
/// A leading `~` is expanded to the home directory for the path comparison.
pub fn match_project(entry: &IndexEntry, value: &str) -> bool {
    if entry.project.eq_ignore_ascii_case(value) {
        return true;
    }

    let needle = value.to_lowercase();
    let needle = match (needle.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => format!("{}{}", home.to_string_lossy().to_lowercase(), rest),
        _ => needle,
    };
    entry.project_path.to_lowercase().contains(&needle)
}

fn start_of_day(value: &str) -> Option<DateTime<Utc>> {
    parse_day(value).map(|day| day.and_time(NaiveTime::MIN).and_utc())
}

fn start_of_day_after(value: &str) -> Option<DateTime<Utc>> {
    parse_day(value)?.succ_opt().map(|day| day.and_time(NaiveTime::MIN).and_utc())
}
