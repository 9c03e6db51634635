//! Line-level decoding of transcript records.
//!
//! A transcript line comes in one of two shapes:
//!
//! - bare: `{"role": "user", "content": ...}`
//! - wrapped: `{"type": "user", "message": {"role": "user", "content": ...}, "uuid": ...}`
//!
//! Both are reduced to the same [`RawMessage`] before any text is extracted, so
//! equivalent content yields identical output regardless of shape.

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;

use crate::models::{Message, Role};

#[derive(Debug, Deserialize)]
struct RawMessage {
    role: String,
    #[serde(default)]
    content: Option<RawContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Text(String),
    Blocks(Vec<RawBlock>),
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBlock {
    Plain(String),
    Typed(TypedBlock),
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TypedBlock {
    Text {
        text: String,
    },
    ToolResult,
    #[serde(other)]
    Unknown,
}

impl RawContent {
    /// Echoed tool output: a block list made of nothing but `tool_result` blocks
    fn is_only_tool_results(&self) -> bool {
        match self {
            RawContent::Blocks(blocks) => {
                !blocks.is_empty()
                    && blocks.iter().all(|b| matches!(b, RawBlock::Typed(TypedBlock::ToolResult)))
            }
            _ => false,
        }
    }

    fn extract_text(&self) -> Option<String> {
        match self {
            RawContent::Text(text) => Some(text.clone()),
            RawContent::Blocks(blocks) => {
                let parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|block| match block {
                        RawBlock::Plain(text) => Some(text.as_str()),
                        RawBlock::Typed(TypedBlock::Text { text }) => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() { None } else { Some(parts.join("\n")) }
            }
            RawContent::Other(_) => None,
        }
    }
}

/// Decode one non-blank line.
///
/// `Err` means the line is not valid JSON (or its message is malformed);
/// `Ok(None)` means a well-formed record that carries no user/assistant text.
pub(crate) fn decode_line(line: &str) -> Result<Option<Message>, serde_json::Error> {
    let value: Value = serde_json::from_str(line)?;
    let body = match value.get("message") {
        Some(inner) if inner.get("role").is_some() => inner,
        _ => &value,
    };

    if body.get("role").is_none() {
        return Ok(None);
    }

    let raw = RawMessage::deserialize(body)?;
    Ok(normalize(raw))
}

fn normalize(raw: RawMessage) -> Option<Message> {
    let role: Role = raw.role.parse().ok()?;
    let content = raw.content?;

    if role == Role::User && content.is_only_tool_results() {
        return None;
    }

    let text = content.extract_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(Message { role, content: trimmed.to_string() })
}
