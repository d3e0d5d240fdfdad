//! Error taxonomy for the link engine

use std::path::PathBuf;

use thiserror::Error;

use crate::model::NoteId;

/// Errors surfaced by engine operations.
///
/// Absence-shaped outcomes that callers handle in normal flow (a path that
/// does not exist within `max_depth`) are expressed as `Ok(None)`, not as
/// variants here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Requested note id is not in the index.
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),

    /// A source file could not be read or decoded during scanning. Collected
    /// per-file in refresh reports; never aborts a refresh.
    #[error("unreadable source {}: {reason}", .path.display())]
    UnreadableSource { path: PathBuf, reason: String },

    /// A persisted snapshot failed validation. Converted to "absent" plus a
    /// full rescan before it reaches callers.
    #[error("snapshot rejected: {0}")]
    Snapshot(String),

    /// Programmer-error class: a search depth that can never find anything.
    #[error("max_depth must be at least 1 (got {0})")]
    InvalidDepth(usize),
}
