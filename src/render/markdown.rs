use super::redaction::{RedactionRule, Redactor};
use crate::error::Result;
use crate::models::ParsedTranscript;

const UNTITLED: &str = "Untitled Session";

/// Presentation metadata for the document header; every field is optional
#[derive(Debug, Clone, Default)]
pub struct RenderMetadata {
    pub title: Option<String>,
    pub date: Option<String>,
    pub project: Option<String>,
    pub branch: Option<String>,
    pub tags: Vec<String>,
}

/// Render a transcript as a Markdown document.
///
/// Layout: a `# Session:` title line, optional `**Field:**` lines, a `---` separator,
/// then one `## <Role>` section per message. Redaction rules run on each message body
/// in list order before it is written.
///
/// # Errors
///
/// Returns [`VaultError::InvalidRedactionPattern`](crate::error::VaultError) if a rule's
/// pattern does not compile.
pub fn render_markdown(
    transcript: &ParsedTranscript,
    metadata: &RenderMetadata,
    rules: &[RedactionRule],
) -> Result<String> {
    let redactor = Redactor::new(rules)?;
    Ok(render_with(transcript, metadata, &redactor))
}

pub fn render_with(
    transcript: &ParsedTranscript,
    metadata: &RenderMetadata,
    redactor: &Redactor,
) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(transcript.messages.len() * 3 + 10);

    let title = metadata.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(UNTITLED);
    lines.push(format!("# Session: {}", title));
    lines.push(String::new());

    if let Some(date) = &metadata.date {
        lines.push(format!("**Date:** {}", date));
    }
    if let Some(project) = &metadata.project {
        lines.push(format!("**Project:** {}", project));
    }
    if let Some(branch) = &metadata.branch {
        lines.push(format!("**Branch:** {}", branch));
    }
    if !metadata.tags.is_empty() {
        lines.push(format!("**Tags:** {}", metadata.tags.join(", ")));
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    for message in &transcript.messages {
        let content =
            if redactor.is_empty() { message.content.clone() } else { redactor.apply(&message.content) };
        lines.push(format!("## {}", message.role.label()));
        lines.push(content);
        lines.push(String::new());
    }

    lines.join("\n")
}
