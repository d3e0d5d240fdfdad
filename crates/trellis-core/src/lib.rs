//! Trellis Core — note-link graph model, analysis, path search, snapshots

pub mod model;
pub mod graph;
pub mod cache;
pub mod analysis;
pub mod pathfind;
pub mod snapshot;
pub mod error;


#[cfg(test)]
pub mod test_utils;

pub use model::{
    ContextLayers, DirectedLink, LinkAnalysis, Note, NoteFingerprint, NoteId, PathResult,
    DEFAULT_COMPLEXITY,
};
pub use graph::{LinkGraph, TouchedNotes};
pub use cache::LruCache;
pub use analysis::{granularity, link_density, LinkAnalyzer, DEFAULT_EXCERPT_CHARS};
pub use pathfind::{traversal_cost, AStar, BreadthFirst, PathFinder, PathStrategy, SearchStrategy};
pub use snapshot::{
    clear_snapshot, load_snapshot, save_snapshot, snapshot_dir, snapshot_path, Snapshot,
    SNAPSHOT_DIR, SNAPSHOT_FILE, SNAPSHOT_VERSION,
};
pub use error::EngineError;
