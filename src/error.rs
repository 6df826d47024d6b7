//! Error types for the editor core.
//!
//! Invalid graph mutations are not errors: they are ignored and reported as
//! `false`/`None` by [`crate::GraphModel`]. Only the persistence boundary and
//! untyped drop payloads can fail.

use thiserror::Error;

/// Errors surfaced by parsing, storage and snapshot (de)serialization.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Unknown node kind '{0}'")]
    UnknownNodeKind(String),

    #[error("Malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
