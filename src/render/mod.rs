//! Turning parsed transcripts into stored documents: Markdown rendering,
//! redaction and summaries. Everything here is pure.

pub mod markdown;
pub mod redaction;
pub mod summary;

pub use markdown::{RenderMetadata, render_markdown, render_with};
pub use redaction::{DEFAULT_REPLACEMENT, RedactionRule, Redactor};
pub use summary::{EMPTY_SUMMARY, generate_summary, title_from_summary};
