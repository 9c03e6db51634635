//! Durable, file-per-record persistence sharded by project slug

pub mod vault;

pub use vault::{METADATA_EXTENSION, TRANSCRIPT_EXTENSION, Vault};
