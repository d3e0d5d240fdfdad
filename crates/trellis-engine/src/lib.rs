//! Trellis Engine — the facade collaborators talk to
//!
//! One [`LinkEngine`] instance owns the graph, the analysis and path
//! caches, and the fingerprint state; there is no process-wide state.
//! Graph reads run concurrently behind a `tokio::sync::RwLock`; every
//! mutation goes through the exclusive write path and is followed by the
//! cache-invalidation discipline the caches rely on.

pub mod queries;


use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;

use trellis_core::{
    load_snapshot, save_snapshot, EngineError, LinkAnalysis, LinkAnalyzer, LinkGraph, Note,
    NoteFingerprint, NoteId, PathFinder, PathResult, PathStrategy, TouchedNotes,
};
use trellis_indexer::Coordinator;

pub use queries::{GraphStatistics, Neighborhood, NeighborhoodMember};
pub use trellis_indexer::{EngineConfig, RefreshFailure, RefreshReport};

pub struct LinkEngine {
    root: PathBuf,
    config: EngineConfig,
    graph: Arc<RwLock<LinkGraph>>,
    coordinator: Arc<Coordinator>,
    analyzer: Mutex<LinkAnalyzer>,
    paths: Mutex<PathFinder>,
}

impl LinkEngine {
    /// Build an engine over a corpus root without touching the filesystem.
    /// Callers usually want [`LinkEngine::open`].
    pub fn new(root: impl AsRef<Path>, config: EngineConfig) -> Self {
        Self::with_state(root, config, LinkGraph::new(), HashMap::new())
    }

    /// Open a corpus: load the persisted index when present and valid
    /// (rebuilding the reverse adjacency from forward edges), then run a
    /// refresh so the index reflects the corpus as it is on disk. A
    /// missing or rejected snapshot degrades to a full rescan.
    pub async fn open(
        root: impl AsRef<Path>,
        config: EngineConfig,
    ) -> anyhow::Result<(Self, RefreshReport)> {
        let root = root.as_ref();
        let (graph, fingerprints) = match load_snapshot(root) {
            Some(snapshot) => snapshot.into_graph(),
            None => (LinkGraph::new(), HashMap::new()),
        };
        let engine = Self::with_state(root, config, graph, fingerprints);
        let report = engine.refresh().await?;
        Ok((engine, report))
    }

    fn with_state(
        root: impl AsRef<Path>,
        config: EngineConfig,
        graph: LinkGraph,
        fingerprints: HashMap<NoteId, NoteFingerprint>,
    ) -> Self {
        let root = root.as_ref().to_path_buf();
        let coordinator = Arc::new(Coordinator::with_fingerprints(
            &root,
            config.clone(),
            fingerprints,
        ));
        LinkEngine {
            analyzer: Mutex::new(LinkAnalyzer::new(
                config.analysis_cache_capacity,
                config.excerpt_chars,
            )),
            paths: Mutex::new(PathFinder::new(config.path_cache_capacity)),
            graph: Arc::new(RwLock::new(graph)),
            coordinator,
            config,
            root,
        }
    }

    /// Incrementally re-index the corpus: scan, fingerprint-diff, parse
    /// only changed notes, apply deltas, invalidate affected caches, and
    /// (by configuration) persist the index.
    pub async fn refresh(&self) -> anyhow::Result<RefreshReport> {
        let coordinator = Arc::clone(&self.coordinator);
        // Scanning, hashing, and parsing never need the graph; only the
        // apply step takes the write lock.
        let collected = tokio::task::spawn_blocking(move || coordinator.collect()).await??;

        let (report, touched) = {
            let mut graph = self.graph.write().await;
            self.coordinator.apply(&mut graph, collected)
        };
        self.invalidate(&touched);

        if self.config.persist_after_refresh && report.mutated() {
            self.save().await?;
        }
        Ok(report)
    }

    /// Clear all indexed state and re-derive it from source files.
    pub async fn full_refresh(&self) -> anyhow::Result<RefreshReport> {
        let (report, touched) = {
            let mut graph = self.graph.write().await;
            self.coordinator.full_rescan(&mut graph)?
        };
        self.invalidate(&touched);

        if self.config.persist_after_refresh {
            self.save().await?;
        }
        Ok(report)
    }

    /// Insert or replace a single note directly, bypassing the corpus
    /// scan. Idempotent with respect to observable graph state.
    pub async fn upsert_note(&self, note: Note) {
        let touched = {
            let mut graph = self.graph.write().await;
            graph.upsert(note)
        };
        self.invalidate(&touched);
    }

    /// Remove a note from the index. Links pointing at it survive as
    /// dangling data.
    pub async fn remove_note(&self, id: &NoteId) -> Result<(), EngineError> {
        let touched = {
            let mut graph = self.graph.write().await;
            graph.remove(id)
        };
        match touched {
            Some(touched) => {
                self.invalidate(&touched);
                Ok(())
            }
            None => Err(EngineError::NoteNotFound(id.clone())),
        }
    }

    pub async fn analyze(&self, id: &NoteId) -> Result<LinkAnalysis, EngineError> {
        let graph = self.graph.read().await;
        self.analyzer
            .lock()
            .expect("analyzer lock poisoned")
            .analyze(&graph, id)
    }

    /// `Ok(None)` means no path exists within `max_depth`.
    pub async fn shortest_path(
        &self,
        from: &NoteId,
        to: &NoteId,
        max_depth: usize,
        strategy: Option<PathStrategy>,
    ) -> Result<Option<PathResult>, EngineError> {
        let strategy = strategy.unwrap_or(self.config.default_strategy);
        let graph = self.graph.read().await;
        self.paths
            .lock()
            .expect("path cache lock poisoned")
            .shortest_path(&graph, from, to, max_depth, strategy)
    }

    pub async fn neighborhood(
        &self,
        id: &NoteId,
        depth: usize,
    ) -> Result<Neighborhood, EngineError> {
        let graph = self.graph.read().await;
        queries::neighborhood(&graph, id, depth)
    }

    pub async fn graph_statistics(&self) -> GraphStatistics {
        let graph = self.graph.read().await;
        queries::graph_statistics(&graph)
    }

    pub async fn get_note(&self, id: &NoteId) -> Option<Note> {
        let graph = self.graph.read().await;
        graph.note(id).cloned()
    }

    /// Persist the index for fast cold start. Returns the snapshot path.
    pub async fn save(&self) -> anyhow::Result<PathBuf> {
        let graph = self.graph.read().await;
        save_snapshot(&graph, &self.coordinator.fingerprints(), &self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Cache-invalidation discipline shared by every mutation path: a
    /// change to the note count invalidates all analyses (density depends
    /// on corpus size); otherwise only the touched notes lose their
    /// entries. The path cache is cleared wholesale on any mutation.
    fn invalidate(&self, touched: &TouchedNotes) {
        if touched.is_empty() {
            return;
        }
        {
            let mut analyzer = self.analyzer.lock().expect("analyzer lock poisoned");
            if touched.count_changed {
                analyzer.invalidate_all();
            } else {
                analyzer.invalidate(touched.ids.iter());
            }
        }
        self.paths
            .lock()
            .expect("path cache lock poisoned")
            .invalidate_all();
        tracing::debug!(
            "caches invalidated ({} notes touched, count_changed={})",
            touched.ids.len(),
            touched.count_changed
        );
    }
}
