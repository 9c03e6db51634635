use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ConversationSummary, VaultContext};
use crate::error::Result;
use crate::storage::Vault;
use crate::store::KeyedStore;

const DECISION_KEYWORDS: &[&str] = &[
    "decided",
    "chose",
    "chosen",
    "approach",
    "because",
    "instead of",
    "opted for",
    "going with",
    "let's go with",
    "decision",
    "trade-off",
    "tradeoff",
];

const ERROR_KEYWORDS: &[&str] = &[
    "error",
    "exception",
    "failed",
    "failure",
    "bug",
    "issue",
    "crash",
    "fix",
    "fixed",
    "broken",
    "stacktrace",
    "stack trace",
    "traceback",
];

const NO_DECISIONS: &str = "No decision-related content found.";
const NO_CODE: &str = "No code blocks found.";
const NO_ERRORS: &str = "No error-related content found.";

/// Part of a stored conversation to return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Full,
    Decisions,
    Code,
    Errors,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Full => "full",
            Section::Decisions => "decisions",
            Section::Code => "code",
            Section::Errors => "errors",
        };
        f.write_str(name)
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Section::Full),
            "decisions" => Ok(Section::Decisions),
            "code" => Ok(Section::Code),
            "errors" => Ok(Section::Errors),
            _ => Err(format!("unknown section '{}' (full, decisions, code, errors)", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationView {
    pub content: String,
    pub metadata: ConversationSummary,
}

/// Fetch one conversation by id or unambiguous id prefix
pub fn get_conversation<S: KeyedStore>(
    ctx: &VaultContext<S>,
    id: &str,
    section: Section,
) -> Result<ConversationView> {
    let entry = ctx.index().resolve(id)?;
    let body = Vault::new(&ctx.store).read_transcript(&entry.project_path, &entry.transcript_file)?;

    Ok(ConversationView {
        content: extract_section(&body, section),
        metadata: ConversationSummary::from(&entry),
    })
}

/// Cut one section out of a rendered conversation
pub fn extract_section(body: &str, section: Section) -> String {
    match section {
        Section::Full => body.to_string(),
        Section::Decisions => {
            extract_keyword_blocks(body, DECISION_KEYWORDS).unwrap_or_else(|| NO_DECISIONS.to_string())
        }
        Section::Code => extract_code_blocks(body).unwrap_or_else(|| NO_CODE.to_string()),
        Section::Errors => {
            extract_keyword_blocks(body, ERROR_KEYWORDS).unwrap_or_else(|| NO_ERRORS.to_string())
        }
    }
}

fn is_header(line: &str) -> bool {
    line.starts_with("## ")
}

/// Runs of lines starting at a keyword hit and ending at the next blank line or header,
/// each preceded by the nearest `## ` header above it
fn extract_keyword_blocks(body: &str, keywords: &[&str]) -> Option<String> {
    let lines: Vec<&str> = body.split('\n').collect();
    let mut relevant: Vec<&str> = Vec::new();
    let mut in_block = false;

    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();

        if is_header(&lower) {
            if in_block {
                relevant.push("");
            }
            in_block = false;
        }

        if keywords.iter().any(|keyword| lower.contains(keyword)) {
            if !in_block {
                if let Some(header) = lines[..i].iter().rev().find(|l| is_header(l)) {
                    relevant.push(*header);
                }
            }
            in_block = true;
        }

        if in_block {
            relevant.push(*line);
            if line.trim().is_empty() && i > 0 && !lines[i - 1].trim().is_empty() {
                in_block = false;
            }
        }
    }

    (!relevant.is_empty()).then(|| relevant.join("\n"))
}

/// Fenced code blocks, fences included; an unterminated fence is dropped
fn extract_code_blocks(body: &str) -> Option<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in body.split('\n') {
        let is_fence = line.trim_start().starts_with("```");
        if let Some(mut block) = current.take() {
            block.push(line);
            if is_fence {
                blocks.push(block.join("\n"));
            } else {
                current = Some(block);
            }
        } else if is_fence {
            current = Some(vec![line]);
        }
    }

    (!blocks.is_empty()).then(|| blocks.join("\n\n"))
}
