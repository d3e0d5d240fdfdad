//! Bounded worker pool for note parsing
//!
//! Workers read and parse note files into immutable [`ParsedNote`] records;
//! they never touch the graph. Per-file failures come back as values so a
//! slow or broken file cannot abort the batch. Only the coordinator thread
//! applies results to the index.

use std::sync::mpsc;
use std::sync::Mutex;

use trellis_core::{EngineError, Note, NoteFingerprint};

use crate::extractor::extract_links;
use crate::fingerprint::fingerprint_bytes;
use crate::frontmatter::parse_note_source;
use crate::scanner::ScannedFile;

/// A fully parsed note plus the fingerprint of the bytes it came from.
#[derive(Debug, Clone)]
pub struct ParsedNote {
    pub note: Note,
    pub fingerprint: NoteFingerprint,
}

pub struct ParsePool {
    workers: usize,
}

impl ParsePool {
    pub fn new(workers: usize) -> Self {
        ParsePool {
            workers: workers.max(1),
        }
    }

    /// Parse a batch of files across the pool. Results carry the original
    /// [`ScannedFile`]; completion order is irrelevant, so they are
    /// returned re-sorted by relative path for deterministic reporting.
    pub fn run(&self, files: Vec<ScannedFile>) -> Vec<(ScannedFile, Result<ParsedNote, EngineError>)> {
        if files.is_empty() {
            return Vec::new();
        }
        let worker_count = self.workers.min(files.len());
        let (job_tx, job_rx) = mpsc::channel::<ScannedFile>();
        let (result_tx, result_rx) = mpsc::channel();
        let job_rx = Mutex::new(job_rx);

        let total = files.len();
        for file in files {
            // Send cannot fail while job_rx is alive on this stack frame.
            let _ = job_tx.send(file);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for worker_id in 0..worker_count {
                let job_rx = &job_rx;
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    tracing::debug!("parse worker {worker_id} started");
                    loop {
                        let job = {
                            let Ok(guard) = job_rx.lock() else { break };
                            guard.recv()
                        };
                        let Ok(file) = job else { break };
                        let outcome = read_and_parse(&file);
                        if result_tx.send((file, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            let mut results: Vec<_> = result_rx.iter().collect();
            debug_assert_eq!(results.len(), total);
            results.sort_by(|(a, _), (b, _)| a.rel.cmp(&b.rel));
            results
        })
    }
}

/// Worker body: read the source, fingerprint it, and assemble the note.
fn read_and_parse(file: &ScannedFile) -> Result<ParsedNote, EngineError> {
    let bytes = std::fs::read(&file.path).map_err(|e| EngineError::UnreadableSource {
        path: file.path.clone(),
        reason: e.to_string(),
    })?;
    let (size, mtime_ns) = crate::fingerprint::stat_file(&file.path)?;
    let fingerprint = fingerprint_bytes(&bytes, size, mtime_ns);

    let content = String::from_utf8(bytes).map_err(|_| EngineError::UnreadableSource {
        path: file.path.clone(),
        reason: "not valid UTF-8".to_string(),
    })?;

    Ok(ParsedNote {
        note: build_note(file, &content),
        fingerprint,
    })
}

/// Assemble a [`Note`] from source text. Pure apart from the id/title
/// inputs; exercised directly by tests.
pub fn build_note(file: &ScannedFile, content: &str) -> Note {
    let (front, body) = parse_note_source(content);
    let front = front.unwrap_or_default();

    let fallback_title = file
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file.id.to_string());

    let mut note = Note::new(
        file.id.clone(),
        front.title.unwrap_or(fallback_title),
        body.to_string(),
    );
    note.tags = front.tags;
    if let Some(complexity) = front.complexity {
        note.complexity = complexity;
    }
    note.metadata = front.extra;
    note.links = extract_links(body);
    note
}
