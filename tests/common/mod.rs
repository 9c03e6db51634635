//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use session_vault::{FsStore, path_to_slug};
use tempfile::TempDir;

/// Builder for on-disk vault directories
pub struct VaultDirBuilder {
    temp_dir: TempDir,
}

impl VaultDirBuilder {
    /// Create a new builder with an empty vault root
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the vault root
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `config.json` with the given content
    pub fn with_config(self, json: &str) -> Self {
        fs::write(self.temp_dir.path().join("config.json"), json)
            .expect("Failed to write config.json");
        self
    }

    /// Write `index.json` with the given content
    pub fn with_index(self, json: &str) -> Self {
        fs::write(self.temp_dir.path().join("index.json"), json)
            .expect("Failed to write index.json");
        self
    }

    /// Add a saved conversation (metadata sidecar plus Markdown body)
    pub fn with_record(self, record: &MetadataBuilder) -> Self {
        let dir = self.project_dir(&record.project_path);
        fs::write(dir.join(record.metadata_file()), record.to_json())
            .expect("Failed to write metadata file");
        fs::write(dir.join(record.transcript_file()), &record.body)
            .expect("Failed to write transcript body");
        self
    }

    /// Add a raw file inside a project directory
    pub fn with_project_file(self, project_path: &str, name: &str, content: &str) -> Self {
        let dir = self.project_dir(project_path);
        fs::write(dir.join(name), content).expect("Failed to write project file");
        self
    }

    fn project_dir(&self, project_path: &str) -> PathBuf {
        let dir = self.temp_dir.path().join("projects").join(path_to_slug(project_path));
        fs::create_dir_all(&dir).expect("Failed to create project dir");
        dir
    }

    pub fn store(&self) -> FsStore {
        FsStore::new(self.temp_dir.path())
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for VaultDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for JSONL transcripts
#[derive(Default)]
pub struct TranscriptBuilder {
    lines: Vec<String>,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bare `{"role":"user","content":...}` record
    pub fn user(self, text: &str) -> Self {
        self.bare("user", text)
    }

    /// Bare `{"role":"assistant","content":...}` record
    pub fn assistant(self, text: &str) -> Self {
        self.bare("assistant", text)
    }

    fn bare(self, role: &str, text: &str) -> Self {
        let line = serde_json::json!({ "role": role, "content": text }).to_string();
        self.raw(&line)
    }

    /// Wrapped record with text blocks and envelope fields
    pub fn wrapped(self, role: &str, text: &str) -> Self {
        let line = serde_json::json!({
            "type": role,
            "message": { "role": role, "content": [{ "type": "text", "text": text }] },
            "uuid": "550e8400-e29b-41d4-a716-446655440000",
            "timestamp": "2026-02-19T10:00:00Z",
        })
        .to_string();
        self.raw(&line)
    }

    /// User record that only echoes a tool result
    pub fn tool_result(self) -> Self {
        self.raw(
            r#"{"role":"user","content":[{"type":"tool_result","tool_use_id":"1","content":"ok"}]}"#,
        )
    }

    /// Any line, verbatim
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn to_jsonl(&self) -> String {
        self.lines.join("\n")
    }

    /// Write the transcript into `dir` and return its path
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.to_jsonl()).expect("Failed to write transcript");
        path
    }
}

/// Builder for per-record metadata sidecars
pub struct MetadataBuilder {
    id: String,
    project_path: String,
    saved_at: String,
    summary: String,
    tags: Vec<String>,
    body: String,
}

impl MetadataBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            project_path: "/home/user/demo".to_string(),
            saved_at: "2026-02-19T10:00:00Z".to_string(),
            summary: "Test conversation".to_string(),
            tags: Vec::new(),
            body: "# Session: Test conversation\n".to_string(),
        }
    }

    pub fn project_path(mut self, project_path: &str) -> Self {
        self.project_path = project_path.to_string();
        self
    }

    /// Set `saved_at` (RFC 3339)
    pub fn saved_at(mut self, saved_at: &str) -> Self {
        self.saved_at = saved_at.to_string();
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    fn prefix(&self) -> String {
        let short_id: String = self.id.chars().take(8).collect();
        format!("{}_{}", &self.saved_at[..10], short_id)
    }

    pub fn transcript_file(&self) -> String {
        format!("{}.md", self.prefix())
    }

    pub fn metadata_file(&self) -> String {
        format!("{}.meta.json", self.prefix())
    }

    pub fn to_json(&self) -> String {
        let project = Path::new(&self.project_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        serde_json::to_string_pretty(&serde_json::json!({
            "id": self.id,
            "project": project,
            "project_path": self.project_path,
            "session_id": "unknown",
            "created_at": self.saved_at,
            "saved_at": self.saved_at,
            "git_branch": null,
            "git_commit": null,
            "tags": self.tags,
            "note": "",
            "summary": self.summary,
            "message_count": 2,
            "source": "manual",
            "transcript_file": self.transcript_file(),
            "metadata_file": self.metadata_file(),
        }))
        .expect("Failed to serialize metadata")
    }
}
