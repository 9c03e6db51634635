/// Transcript parsing and rendering against files on disk
mod common;

use std::io::Cursor;

use common::TranscriptBuilder;
use session_vault::models::Role;
use session_vault::parsers::parse_jsonl_reader;
use session_vault::render::{RenderMetadata, generate_summary};
use session_vault::{
    ParseLimits, VaultError, parse_jsonl_str, parse_transcript_file, render_markdown,
};
use tempfile::TempDir;

#[test]
fn test_bare_user_and_assistant() {
    let transcript = parse_jsonl_str(
        "{\"role\":\"user\",\"content\":\"hi\"}\n{\"role\":\"assistant\",\"content\":\"hello\"}",
    );

    assert_eq!(transcript.message_count, 2);
    let roles: Vec<Role> = transcript.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
}

#[test]
fn test_tool_result_echo_is_dropped() {
    let jsonl = TranscriptBuilder::new().user("run it").tool_result().assistant("done").to_jsonl();

    let transcript = parse_jsonl_str(&jsonl);

    assert_eq!(transcript.message_count, 2);
    assert_eq!(transcript.messages[0].content, "run it");
    assert_eq!(transcript.messages[1].content, "done");
}

#[test]
fn test_mixed_shapes_and_garbage_lines() {
    let jsonl = TranscriptBuilder::new()
        .raw(r#"{"type":"summary","summary":"old session"}"#)
        .wrapped("user", "wrapped question")
        .raw("not json at all")
        .raw("")
        .assistant("bare answer")
        .raw(r#"{"role":"system","content":"ignored"}"#)
        .to_jsonl();

    let transcript = parse_jsonl_str(&jsonl);

    assert_eq!(transcript.message_count, 2);
    assert_eq!(transcript.messages[0].content, "wrapped question");
    assert_eq!(transcript.messages[1].content, "bare answer");
}

#[test]
fn test_streaming_matches_whole_buffer() {
    let mut builder = TranscriptBuilder::new();
    for i in 0..200 {
        builder = builder
            .wrapped("user", &format!("question {} with ünïcödé", i))
            .tool_result()
            .assistant(&format!("answer {}\nspanning lines", i))
            .raw("{ broken");
    }
    let jsonl = builder.to_jsonl();

    let whole = parse_jsonl_str(&jsonl);
    let streamed = parse_jsonl_reader(Cursor::new(jsonl.as_bytes())).unwrap();

    assert_eq!(whole, streamed);
    assert_eq!(whole.message_count, 400);
}

#[test]
fn test_file_streaming_path_matches_buffered_path() {
    let dir = TempDir::new().unwrap();
    let path = TranscriptBuilder::new()
        .user("first")
        .assistant("second")
        .write_to(dir.path(), "session.jsonl");

    let buffered = parse_transcript_file(&path, &ParseLimits::default()).unwrap();
    let streaming_limits = ParseLimits { max_size_mb: 10.0, streaming_threshold_bytes: 0 };
    let streamed = parse_transcript_file(&path, &streaming_limits).unwrap();

    assert_eq!(buffered, streamed);
    assert_eq!(buffered.message_count, 2);
}

#[test]
fn test_oversized_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.jsonl");
    let line = format!("{{\"role\":\"user\",\"content\":\"{}\"}}\n", "x".repeat(1000));
    let target = (1.2 * 1024.0 * 1024.0) as usize;
    std::fs::write(&path, line.repeat(target / line.len() + 1)).unwrap();

    let err = parse_transcript_file(&path, &ParseLimits::from_megabytes(1.0)).unwrap_err();

    match err {
        VaultError::TranscriptTooLarge { size_mb, limit_mb } => {
            assert!((size_mb - 1.2).abs() < 0.01, "size_mb = {}", size_mb);
            assert_eq!(limit_mb, 1.0);
        }
        other => panic!("expected TranscriptTooLarge, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err =
        parse_transcript_file(&dir.path().join("nope.jsonl"), &ParseLimits::default()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_render_keeps_every_message_in_order() {
    let jsonl = TranscriptBuilder::new()
        .user("alpha")
        .assistant("beta")
        .user("gamma")
        .assistant("delta")
        .to_jsonl();
    let transcript = parse_jsonl_str(&jsonl);

    let document = render_markdown(&transcript, &RenderMetadata::default(), &[]).unwrap();

    let sections = ["## User\nalpha", "## Claude\nbeta", "## User\ngamma", "## Claude\ndelta"];
    let positions: Vec<usize> = sections
        .iter()
        .map(|section| document.find(section).expect("section missing"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(document.matches("## ").count(), 4);
}

#[test]
fn test_long_first_message_summary() {
    let jsonl = TranscriptBuilder::new().user(&"word ".repeat(40)).to_jsonl();

    let summary = generate_summary(&parse_jsonl_str(&jsonl));

    assert!(summary.chars().count() <= 123);
    assert!(summary.ends_with("..."));
}
