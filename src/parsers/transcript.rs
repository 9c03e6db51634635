use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use super::records::decode_line;
use crate::error::{Result, VaultError};
use crate::models::{Message, ParsedTranscript};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Files above this size are parsed line by line instead of read whole
pub const DEFAULT_STREAMING_THRESHOLD_BYTES: u64 = 5 * 1024 * 1024;

/// Size policy applied before a transcript file is parsed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseLimits {
    /// Hard ceiling in (binary) megabytes
    pub max_size_mb: f64,
    /// Inputs larger than this are streamed
    pub streaming_threshold_bytes: u64,
}

impl ParseLimits {
    pub fn from_megabytes(max_size_mb: f64) -> Self {
        let ceiling = (max_size_mb * BYTES_PER_MB) as u64;
        Self {
            max_size_mb,
            streaming_threshold_bytes: DEFAULT_STREAMING_THRESHOLD_BYTES.min(ceiling),
        }
    }

    fn max_bytes(&self) -> u64 {
        (self.max_size_mb * BYTES_PER_MB) as u64
    }
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self::from_megabytes(10.0)
    }
}

/// Parse a whole JSONL buffer.
pub fn parse_jsonl_str(content: &str) -> ParsedTranscript {
    let messages: Vec<Message> = content
        .lines()
        .enumerate()
        .filter_map(|(line_num, line)| parse_line(line_num, line))
        .collect();
    ParsedTranscript::from_messages(messages)
}

/// Parse JSONL from a reader one line at a time, holding at most one line in memory.
///
/// Lines are decoded with the same lossy UTF-8 rules as [`parse_transcript_file`]'s
/// whole-buffer path, so both produce identical results for the same bytes.
pub fn parse_jsonl_reader<R: BufRead>(mut reader: R) -> std::io::Result<ParsedTranscript> {
    let mut messages = Vec::new();
    let mut buf = Vec::new();
    let mut line_num = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(message) = parse_line(line_num, &line) {
            messages.push(message);
        }
        line_num += 1;
    }

    Ok(ParsedTranscript::from_messages(messages))
}

/// Read and parse a transcript file, enforcing the size ceiling first.
///
/// # Errors
///
/// - [`VaultError::TranscriptTooLarge`] when the file exceeds `limits.max_size_mb`;
///   nothing is read in that case
/// - [`VaultError::NotFound`] when the file does not exist
/// - [`VaultError::Io`] for other read failures
pub fn parse_transcript_file(path: &Path, limits: &ParseLimits) -> Result<ParsedTranscript> {
    // Size is taken from the open handle so the check and the read see the same file
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => VaultError::not_found("Transcript", path.display().to_string()),
        _ => VaultError::io(path, e),
    })?;
    let size = file.metadata().map_err(|e| VaultError::io(path, e))?.len();

    if size > limits.max_bytes() {
        return Err(VaultError::TranscriptTooLarge {
            size_mb: size as f64 / BYTES_PER_MB,
            limit_mb: limits.max_size_mb,
        });
    }

    let transcript = if size > limits.streaming_threshold_bytes {
        debug!(path = %path.display(), size, "streaming transcript");
        parse_jsonl_reader(BufReader::new(file)).map_err(|e| VaultError::io(path, e))?
    } else {
        let mut bytes = Vec::with_capacity(size as usize);
        BufReader::new(file).read_to_end(&mut bytes).map_err(|e| VaultError::io(path, e))?;
        parse_jsonl_str(&String::from_utf8_lossy(&bytes))
    };

    Ok(transcript)
}

fn parse_line(line_num: usize, line: &str) -> Option<Message> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match decode_line(line) {
        Ok(message) => message,
        Err(e) => {
            warn!(line = line_num + 1, error = %e, "skipping malformed transcript line");
            None
        }
    }
}
