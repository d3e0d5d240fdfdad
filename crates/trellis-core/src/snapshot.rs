//! Versioned on-disk snapshot of the link index
//!
//! Persists forward edges (as each note's target set), note metadata, and
//! fingerprints — never the reverse index or the analysis/path caches,
//! which are always rebuilt. Anything wrong with a snapshot (missing,
//! corrupt, truncated, version-mismatched) degrades to "absent" and a full
//! rescan; it is never a fatal error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::graph::LinkGraph;
use crate::model::{Note, NoteFingerprint, NoteId};

/// Snapshot directory under the corpus root.
pub const SNAPSHOT_DIR: &str = ".trellis";

/// Snapshot file name.
pub const SNAPSHOT_FILE: &str = "index.json";

/// Bump on any incompatible layout change; mismatched snapshots are
/// discarded, not migrated.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: String,
    pub notes: Vec<Note>,
    pub fingerprints: HashMap<NoteId, NoteFingerprint>,
}

impl Snapshot {
    /// Rebuild the in-memory index. The reverse adjacency is re-derived
    /// from forward edges here; it is never trusted from disk.
    pub fn into_graph(self) -> (LinkGraph, HashMap<NoteId, NoteFingerprint>) {
        let mut graph = LinkGraph::new();
        for note in self.notes {
            graph.upsert(note);
        }
        (graph, self.fingerprints)
    }
}

pub fn snapshot_dir(root: &Path) -> PathBuf {
    root.join(SNAPSHOT_DIR)
}

pub fn snapshot_path(root: &Path) -> PathBuf {
    root.join(SNAPSHOT_DIR).join(SNAPSHOT_FILE)
}

/// Serialize the index for fast cold start. Returns the snapshot location.
pub fn save_snapshot(
    graph: &LinkGraph,
    fingerprints: &HashMap<NoteId, NoteFingerprint>,
    root: &Path,
) -> anyhow::Result<PathBuf> {
    let dir = snapshot_dir(root);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        saved_at: chrono::Utc::now().to_rfc3339(),
        notes: graph.all_notes().cloned().collect(),
        fingerprints: fingerprints.clone(),
    };
    let path = snapshot_path(root);
    std::fs::write(&path, serde_json::to_vec(&snapshot)?)?;

    tracing::debug!(
        "snapshot saved: {} ({} notes, {} fingerprints)",
        path.display(),
        graph.note_count(),
        snapshot.fingerprints.len()
    );
    Ok(path)
}

/// Load the persisted index, or `None` when no usable snapshot exists.
pub fn load_snapshot(root: &Path) -> Option<Snapshot> {
    let path = snapshot_path(root);
    if !path.exists() {
        return None;
    }
    match read_snapshot(&path) {
        Ok(snapshot) => {
            tracing::debug!(
                "snapshot loaded: {} ({} notes)",
                path.display(),
                snapshot.notes.len()
            );
            Some(snapshot)
        }
        Err(e) => {
            tracing::warn!("discarding snapshot {}: {}", path.display(), e);
            None
        }
    }
}

fn read_snapshot(path: &Path) -> Result<Snapshot, EngineError> {
    let bytes = std::fs::read(path)
        .map_err(|e| EngineError::Snapshot(format!("read failed: {e}")))?;
    let snapshot: Snapshot = serde_json::from_slice(&bytes)
        .map_err(|e| EngineError::Snapshot(format!("deserialize failed: {e}")))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(EngineError::Snapshot(format!(
            "version mismatch: found {}, expected {}",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    Ok(snapshot)
}

/// Remove any persisted snapshot for this corpus.
pub fn clear_snapshot(root: &Path) -> std::io::Result<()> {
    let dir = snapshot_dir(root);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    Ok(())
}
