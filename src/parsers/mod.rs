//! JSONL transcript parsing
//!
//! # Error Handling Strategy
//!
//! Parsing follows a **graceful degradation** approach:
//!
//! - **Individual line failures**: Malformed JSON lines are logged through `tracing` and
//!   skipped. A bad line never aborts the parse, no matter how many there are.
//!
//! - **Ignored records**: Lines that decode fine but carry no user/assistant text (system
//!   records, summaries, snapshots, echoed tool output) are dropped silently.
//!
//! - **Size ceiling**: The only fatal condition is an input larger than the configured limit,
//!   which is rejected with [`VaultError::TranscriptTooLarge`](crate::error::VaultError)
//!   before any byte is parsed.
//!
//! - **Memory bound**: Large inputs are streamed line by line. The streaming and the
//!   whole-buffer paths share one line decoder and produce identical output.

pub mod deserializers;
mod records;
pub mod transcript;

pub use transcript::{
    DEFAULT_STREAMING_THRESHOLD_BYTES, ParseLimits, parse_jsonl_reader, parse_jsonl_str,
    parse_transcript_file,
};
