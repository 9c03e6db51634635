//! The rebuildable listing cache and identifier resolution
//!
//! The cache lives at `<vault>/index.json`:
//!
//! ```json
//! { "version": 1, "entries": [ ... ] }
//! ```
//!
//! It is derived entirely from the `*.meta.json` files and can be deleted at any time.

pub mod persistence;
pub mod resolver;

pub use persistence::{INDEX_FILENAME, IndexCache};
pub use resolver::{MIN_PREFIX_LEN, ResolveError, resolve_id};
