//! Refresh orchestration: scan, diff, parse, apply
//!
//! `collect` does the slow work (walking the corpus, fingerprint diffing,
//! parallel parsing) without touching the graph; `apply` is the
//! single-writer step that folds the collected deltas into the index. A
//! refresh always completes: per-file failures are aggregated into the
//! report and the previous indexed state of a failing note is retained.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

use trellis_core::{EngineError, LinkGraph, NoteFingerprint, NoteId, TouchedNotes};

use crate::config::EngineConfig;
use crate::fingerprint::stat_file;
use crate::pool::{ParsePool, ParsedNote};
use crate::scanner::{ScannedFile, Scanner};

/// One file that could not be indexed this cycle.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of one refresh cycle.
#[derive(Debug, Clone, Serialize, Default)]
pub struct RefreshReport {
    pub scanned: usize,
    pub added: usize,
    pub modified: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub failed: usize,
    pub errors: Vec<RefreshFailure>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RefreshReport {
    /// Whether this cycle changed the index at all.
    pub fn mutated(&self) -> bool {
        self.added + self.modified + self.removed > 0
    }
}

/// Deltas gathered by `collect`, ready for single-writer application.
pub struct Collected {
    started: Instant,
    scanned: usize,
    results: Vec<(ScannedFile, Result<ParsedNote, EngineError>)>,
    removed: Vec<NoteId>,
}

pub struct Coordinator {
    root: PathBuf,
    config: EngineConfig,
    fingerprints: DashMap<NoteId, NoteFingerprint>,
}

impl Coordinator {
    pub fn new(root: impl AsRef<Path>, config: EngineConfig) -> Self {
        Self::with_fingerprints(root, config, HashMap::new())
    }

    /// Resume from a persisted fingerprint map so the first refresh after a
    /// cold start only re-parses what actually changed on disk.
    pub fn with_fingerprints(
        root: impl AsRef<Path>,
        config: EngineConfig,
        fingerprints: HashMap<NoteId, NoteFingerprint>,
    ) -> Self {
        Coordinator {
            root: root.as_ref().to_path_buf(),
            config,
            fingerprints: fingerprints.into_iter().collect(),
        }
    }

    /// Copy of the fingerprint map, for snapshotting.
    pub fn fingerprints(&self) -> HashMap<NoteId, NoteFingerprint> {
        self.fingerprints
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Scan the corpus and parse everything that changed since the last
    /// fingerprint snapshot. Read-only with respect to the graph.
    pub fn collect(&self) -> anyhow::Result<Collected> {
        let started = Instant::now();
        let scanner = Scanner::new(&self.root, &self.config.include)?;
        let files = scanner.scan();
        let scanned = files.len();

        let mut seen: HashSet<NoteId> = HashSet::with_capacity(files.len());
        let mut candidates = Vec::new();
        for file in files {
            if !seen.insert(file.id.clone()) {
                tracing::warn!("duplicate note id {} at {}; keeping the first", file.id, file.rel);
                continue;
            }
            // Fast pre-check: size+mtime match means skip without hashing.
            // A stat failure sends the file to the pool, which reports the
            // real error.
            let unchanged = match stat_file(&file.path) {
                Ok((size, mtime)) => self
                    .fingerprints
                    .get(&file.id)
                    .is_some_and(|old| old.same_stat(size, mtime)),
                Err(_) => false,
            };
            if !unchanged {
                candidates.push(file);
            }
        }

        let removed: Vec<NoteId> = self
            .fingerprints
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|id| !seen.contains(id))
            .collect();

        tracing::debug!(
            "scan: {} files, {} changed candidates, {} removed",
            scanned,
            candidates.len(),
            removed.len()
        );

        let pool = ParsePool::new(self.config.effective_pool_size());
        let results = pool.run(candidates);

        Ok(Collected { started, scanned, results, removed })
    }

    /// Fold collected deltas into the graph. Single writer: callers hold
    /// the exclusive graph reference for the duration.
    pub fn apply(&self, graph: &mut LinkGraph, collected: Collected) -> (RefreshReport, TouchedNotes) {
        let Collected { started, scanned, results, removed } = collected;
        let mut report = RefreshReport { scanned, ..Default::default() };
        report.unchanged = scanned.saturating_sub(results.len());
        let mut touched = TouchedNotes::default();

        for (file, outcome) in results {
            match outcome {
                Ok(parsed) => {
                    let known = self.fingerprints.get(&file.id).map(|e| e.value().clone());
                    match known {
                        // Stat moved but content did not: refresh the stored
                        // stat so the next pre-check is cheap again.
                        Some(old) if !old.changed(&parsed.fingerprint) => {
                            self.fingerprints.insert(file.id.clone(), parsed.fingerprint);
                            report.unchanged += 1;
                        }
                        Some(_) => {
                            touched.merge(graph.upsert(parsed.note));
                            self.fingerprints.insert(file.id.clone(), parsed.fingerprint);
                            report.modified += 1;
                        }
                        None => {
                            touched.merge(graph.upsert(parsed.note));
                            self.fingerprints.insert(file.id.clone(), parsed.fingerprint);
                            report.added += 1;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to index {}: {e}", file.rel);
                    report.failed += 1;
                    report.errors.push(RefreshFailure {
                        path: file.path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for id in removed {
            if let Some(t) = graph.remove(&id) {
                touched.merge(t);
            }
            self.fingerprints.remove(&id);
            report.removed += 1;
        }

        report.elapsed = started.elapsed();
        tracing::info!(
            "refresh: {} scanned, {} added, {} modified, {} removed, {} failed in {:?}",
            report.scanned,
            report.added,
            report.modified,
            report.removed,
            report.failed,
            report.elapsed
        );
        (report, touched)
    }

    /// Scan + apply in one call, for synchronous callers and tests.
    pub fn refresh(&self, graph: &mut LinkGraph) -> anyhow::Result<(RefreshReport, TouchedNotes)> {
        let collected = self.collect()?;
        Ok(self.apply(graph, collected))
    }

    /// Drop all state and re-derive everything from source files. The
    /// fallback path when no persisted index exists or it fails validation.
    pub fn full_rescan(&self, graph: &mut LinkGraph) -> anyhow::Result<(RefreshReport, TouchedNotes)> {
        graph.clear();
        self.fingerprints.clear();
        let (report, mut touched) = self.refresh(graph)?;
        touched.count_changed = true;
        Ok((report, touched))
    }
}
