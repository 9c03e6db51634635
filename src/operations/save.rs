use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::VaultContext;
use crate::error::Result;
use crate::models::{ConversationRecord, IndexEntry, NewRecord, ParsedTranscript, Source};
use crate::parsers::{ParseLimits, parse_transcript_file};
use crate::render::{RenderMetadata, Redactor, generate_summary, render_with, title_from_summary};
use crate::storage::Vault;
use crate::store::KeyedStore;
use crate::utils::{collect_git_info, project_name};

const TITLE_MAX_CHARS: usize = 60;
const AUTO_TAG: &str = "auto";
const AUTO_NOTE: &str = "Auto-saved on session end";

#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    pub transcript_path: PathBuf,
    pub project_path: String,
    pub session_id: Option<String>,
    pub tags: BTreeSet<String>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Box<ConversationRecord>),
    /// The transcript held no user or assistant text; nothing was written
    Empty,
}

/// Parse, render and persist a transcript, then index it
pub fn save_conversation<S: KeyedStore>(
    ctx: &VaultContext<S>,
    request: &SaveRequest,
) -> Result<SaveOutcome> {
    let limits = ParseLimits::from_megabytes(ctx.config.max_transcript_size_mb);
    let transcript = parse_transcript_file(&request.transcript_path, &limits)?;
    if transcript.is_empty() {
        return Ok(SaveOutcome::Empty);
    }

    let record = persist(
        ctx,
        &transcript,
        PersistArgs {
            project_path: &request.project_path,
            session_id: request.session_id.clone(),
            tags: request.tags.clone(),
            note: request.note.clone(),
            source: Source::Manual,
        },
    )?;
    Ok(SaveOutcome::Saved(Box::new(record)))
}

/// Payload a SessionEnd hook receives on stdin
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionEndInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub cwd: String,
    #[serde(default)]
    pub hook_event_name: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Disabled,
    MissingTranscriptPath,
    TranscriptNotFound(PathBuf),
    NoMessages,
    BelowThreshold { count: usize, min: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => f.write_str("auto-save is disabled"),
            SkipReason::MissingTranscriptPath => f.write_str("no transcript_path in input"),
            SkipReason::TranscriptNotFound(path) => {
                write!(f, "transcript not found: {}", path.display())
            }
            SkipReason::NoMessages => f.write_str("transcript has no messages"),
            SkipReason::BelowThreshold { count, min } => {
                write!(f, "only {} messages, need at least {}", count, min)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutoSaveOutcome {
    Saved(Box<ConversationRecord>),
    Skipped(SkipReason),
}

/// Save a finished session if auto-save is on and the session is long enough
pub fn auto_save<S: KeyedStore>(
    ctx: &VaultContext<S>,
    input: &SessionEndInput,
) -> Result<AutoSaveOutcome> {
    if !ctx.config.auto_save {
        return Ok(AutoSaveOutcome::Skipped(SkipReason::Disabled));
    }

    let Some(transcript_path) = input.transcript_path.as_deref().filter(|p| !p.is_empty())
    else {
        return Ok(AutoSaveOutcome::Skipped(SkipReason::MissingTranscriptPath));
    };
    let transcript_path = Path::new(transcript_path);
    if !transcript_path.exists() {
        return Ok(AutoSaveOutcome::Skipped(SkipReason::TranscriptNotFound(
            transcript_path.to_path_buf(),
        )));
    }

    let limits = ParseLimits::from_megabytes(ctx.config.max_transcript_size_mb);
    let transcript = parse_transcript_file(transcript_path, &limits)?;
    if transcript.is_empty() {
        return Ok(AutoSaveOutcome::Skipped(SkipReason::NoMessages));
    }
    if transcript.message_count < ctx.config.auto_save_min_messages {
        return Ok(AutoSaveOutcome::Skipped(SkipReason::BelowThreshold {
            count: transcript.message_count,
            min: ctx.config.auto_save_min_messages,
        }));
    }

    let record = persist(
        ctx,
        &transcript,
        PersistArgs {
            project_path: &input.cwd,
            session_id: input.session_id.clone(),
            tags: BTreeSet::from([AUTO_TAG.to_string()]),
            note: AUTO_NOTE.to_string(),
            source: Source::Auto,
        },
    )?;
    Ok(AutoSaveOutcome::Saved(Box::new(record)))
}

struct PersistArgs<'a> {
    project_path: &'a str,
    session_id: Option<String>,
    tags: BTreeSet<String>,
    note: String,
    source: Source,
}

fn persist<S: KeyedStore>(
    ctx: &VaultContext<S>,
    transcript: &ParsedTranscript,
    args: PersistArgs<'_>,
) -> Result<ConversationRecord> {
    let redactor = Redactor::new(&ctx.config.redaction_rules)?;
    let git = collect_git_info(Path::new(args.project_path));
    // The summary lands in the title and in the index, so it is redacted too
    let summary = redactor.apply(&generate_summary(transcript));

    let metadata = RenderMetadata {
        title: Some(title_from_summary(&summary, TITLE_MAX_CHARS)),
        date: Some(Utc::now().to_rfc3339()),
        project: Some(project_name(args.project_path)),
        branch: git.branch.clone(),
        tags: args.tags.iter().cloned().collect(),
    };
    let body = render_with(transcript, &metadata, &redactor);

    let new = NewRecord {
        project_path: args.project_path.to_string(),
        session_id: args.session_id.filter(|id| !id.is_empty()),
        created_at: None,
        git_branch: git.branch,
        git_commit: git.commit,
        tags: args.tags,
        note: args.note,
        summary,
        message_count: transcript.message_count,
        source: args.source,
    };
    let record = Vault::new(&ctx.store).save(&body, &new)?;
    ctx.index().add(IndexEntry::from(&record))?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::error::VaultError;
    use crate::operations::test_support::memory_context;
    use crate::render::RedactionRule;
    use crate::utils::Config;

    fn write_transcript(dir: &TempDir, lines: &[&str]) -> PathBuf {
        let path = dir.path().join("session.jsonl");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn exchange(turns: usize) -> Vec<String> {
        (0..turns)
            .flat_map(|i| {
                [
                    format!(r#"{{"role":"user","content":"question {i} with sk-secret{i}"}}"#),
                    format!(r#"{{"role":"assistant","content":"answer {i}"}}"#),
                ]
            })
            .collect()
    }

    #[test]
    fn test_save_persists_and_indexes() {
        let dir = TempDir::new().unwrap();
        let lines = exchange(2);
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let path = write_transcript(&dir, &lines);

        let mut ctx = memory_context();
        ctx.config.redaction_rules = vec![RedactionRule::new(r"sk-\w+", "[KEY]")];
        let request = SaveRequest {
            transcript_path: path,
            project_path: dir.path().join("my-app").to_string_lossy().into_owned(),
            tags: BTreeSet::from(["auth".to_string()]),
            note: "first pass".to_string(),
            ..Default::default()
        };

        let SaveOutcome::Saved(record) = save_conversation(&ctx, &request).unwrap() else {
            panic!("expected a saved record");
        };

        assert_eq!(record.project, "my-app");
        assert_eq!(record.message_count, 4);
        assert_eq!(record.session_id, "unknown");
        assert_eq!(record.source, Source::Manual);
        assert_eq!(record.summary, "question 0 with [KEY]");

        let vault = Vault::new(&ctx.store);
        let body = vault.read_transcript(&record.project_path, &record.transcript_file).unwrap();
        assert!(body.starts_with("# Session: question 0"));
        assert!(body.contains("**Tags:** auth"));
        assert!(body.contains("[KEY]"));
        assert!(!body.contains("sk-secret"));

        assert_eq!(ctx.index().find(&record.id).unwrap().unwrap().summary, record.summary);
    }

    #[test]
    fn test_save_empty_transcript_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_transcript(&dir, &[r#"{"type":"summary","summary":"x"}"#]);
        let ctx = memory_context();
        let request = SaveRequest {
            transcript_path: path,
            project_path: "/home/user/demo".to_string(),
            ..Default::default()
        };

        assert_eq!(save_conversation(&ctx, &request).unwrap(), SaveOutcome::Empty);
        assert!(ctx.store.namespaces().unwrap().is_empty());
    }

    #[test]
    fn test_save_missing_transcript_is_not_found() {
        let ctx = memory_context();
        let request = SaveRequest {
            transcript_path: PathBuf::from("/nope/session.jsonl"),
            project_path: "/home/user/demo".to_string(),
            ..Default::default()
        };
        assert!(save_conversation(&ctx, &request).unwrap_err().is_not_found());
    }

    #[test]
    fn test_save_rejects_invalid_redaction_pattern() {
        let dir = TempDir::new().unwrap();
        let path = write_transcript(&dir, &[r#"{"role":"user","content":"hi"}"#]);
        let mut ctx = memory_context();
        ctx.config.redaction_rules = vec![RedactionRule::new("(unclosed", "x")];
        let request = SaveRequest {
            transcript_path: path,
            project_path: "/home/user/demo".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            save_conversation(&ctx, &request),
            Err(VaultError::InvalidRedactionPattern { .. })
        ));
    }

    fn auto_context() -> VaultContext<crate::store::MemoryStore> {
        let mut ctx = memory_context();
        ctx.config = Config { auto_save: true, auto_save_min_messages: 4, ..Config::default() };
        ctx
    }

    fn hook_input(path: Option<&Path>) -> SessionEndInput {
        SessionEndInput {
            session_id: Some("sess-1".to_string()),
            transcript_path: path.map(|p| p.to_string_lossy().into_owned()),
            cwd: "/home/user/demo".to_string(),
            hook_event_name: "SessionEnd".to_string(),
            reason: Some("exit".to_string()),
        }
    }

    #[test]
    fn test_auto_save_skip_reasons() {
        let dir = TempDir::new().unwrap();

        let ctx = memory_context();
        assert_eq!(
            auto_save(&ctx, &hook_input(None)).unwrap(),
            AutoSaveOutcome::Skipped(SkipReason::Disabled)
        );

        let ctx = auto_context();
        assert_eq!(
            auto_save(&ctx, &hook_input(None)).unwrap(),
            AutoSaveOutcome::Skipped(SkipReason::MissingTranscriptPath)
        );

        let missing = dir.path().join("missing.jsonl");
        assert_eq!(
            auto_save(&ctx, &hook_input(Some(&missing))).unwrap(),
            AutoSaveOutcome::Skipped(SkipReason::TranscriptNotFound(missing.clone()))
        );

        let empty = write_transcript(&dir, &["not json"]);
        assert_eq!(
            auto_save(&ctx, &hook_input(Some(&empty))).unwrap(),
            AutoSaveOutcome::Skipped(SkipReason::NoMessages)
        );

        let short = exchange(1);
        let short: Vec<&str> = short.iter().map(String::as_str).collect();
        let short = write_transcript(&dir, &short);
        assert_eq!(
            auto_save(&ctx, &hook_input(Some(&short))).unwrap(),
            AutoSaveOutcome::Skipped(SkipReason::BelowThreshold { count: 2, min: 4 })
        );
        assert!(ctx.store.namespaces().unwrap().is_empty());
    }

    #[test]
    fn test_auto_save_saves_with_auto_metadata() {
        let dir = TempDir::new().unwrap();
        let lines = exchange(2);
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let path = write_transcript(&dir, &lines);
        let ctx = auto_context();

        let AutoSaveOutcome::Saved(record) = auto_save(&ctx, &hook_input(Some(&path))).unwrap()
        else {
            panic!("expected a saved record");
        };

        assert_eq!(record.source, Source::Auto);
        assert_eq!(record.tags, BTreeSet::from(["auto".to_string()]));
        assert_eq!(record.note, "Auto-saved on session end");
        assert_eq!(record.session_id, "sess-1");
        assert_eq!(record.project, "demo");
    }

    #[test]
    fn test_session_end_input_tolerates_extra_fields() {
        let input: SessionEndInput = serde_json::from_str(
            r#"{"session_id":"s","transcript_path":"/t.jsonl","cwd":"/p","hook_event_name":"SessionEnd","permission_mode":"default"}"#,
        )
        .unwrap();
        assert_eq!(input.transcript_path.as_deref(), Some("/t.jsonl"));
        assert!(input.reason.is_none());
    }
}
