//! Identifier resolution: full ids or unambiguous prefixes

use std::fmt;

use crate::models::IndexEntry;

/// Shortest prefix accepted for a non-exact match
pub const MIN_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Candidate is below [`MIN_PREFIX_LEN`] and matches no id exactly
    TooShort,
    NotFound,
    /// Candidate is a prefix of several ids; they are listed for messaging
    Ambiguous(Vec<String>),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::TooShort => {
                write!(f, "id prefix must be at least {} characters", MIN_PREFIX_LEN)
            }
            ResolveError::NotFound => f.write_str("no conversation matches"),
            ResolveError::Ambiguous(ids) => {
                write!(f, "ambiguous id prefix, matches {}", ids.join(", "))
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Map an id or id prefix to exactly one entry
///
/// An exact id match always wins, even if the candidate is also a prefix of other ids.
pub fn resolve_id<'a>(
    entries: &'a [IndexEntry],
    candidate: &str,
) -> Result<&'a IndexEntry, ResolveError> {
    if let Some(entry) = entries.iter().find(|e| e.id == candidate) {
        return Ok(entry);
    }

    if candidate.chars().count() < MIN_PREFIX_LEN {
        return Err(ResolveError::TooShort);
    }

    let matches: Vec<&IndexEntry> = entries.iter().filter(|e| e.id.starts_with(candidate)).collect();
    match matches.as_slice() {
        [] => Err(ResolveError::NotFound),
        [only] => Ok(*only),
        many => Err(ResolveError::Ambiguous(many.iter().map(|e| e.id.clone()).collect())),
    }
}
