//! Link density, granularity, and context-layer derivation

use std::collections::BTreeSet;

use crate::cache::LruCache;
use crate::error::EngineError;
use crate::graph::LinkGraph;
use crate::model::{ContextLayers, LinkAnalysis, NoteId};

/// Default bound on excerpt length, in characters.
pub const DEFAULT_EXCERPT_CHARS: usize = 280;

/// Fraction of possible bidirectional slots a note actually uses.
///
/// `resolved_outgoing` excludes dangling targets: a link to a note that
/// does not exist occupies no slot toward a real note. Defined as 0 when
/// fewer than two notes exist.
pub fn link_density(resolved_outgoing: usize, incoming: usize, note_count: usize) -> f64 {
    if note_count < 2 {
        return 0.0;
    }
    let used = (resolved_outgoing + incoming) as f64;
    let slots = 2.0 * (note_count - 1) as f64;
    (used / slots).clamp(0.0, 1.0)
}

/// Specificity score in [0, 1].
///
/// Notes mostly *referenced* are specific/terminal (→ 1), notes mostly
/// *referencing others* are general/overview (→ 0). A note with links in
/// neither direction is neutral (0.5).
pub fn granularity(outgoing: usize, incoming: usize) -> f64 {
    if outgoing > 0 {
        incoming as f64 / (incoming + outgoing) as f64
    } else if incoming > 0 {
        1.0
    } else {
        0.5
    }
}

/// First paragraph or the first `max_chars` characters, whichever is shorter.
fn excerpt(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim_start();
    let paragraph = trimmed.split("\n\n").next().unwrap_or("").trim_end();
    if paragraph.chars().count() <= max_chars {
        paragraph.to_string()
    } else {
        paragraph.chars().take(max_chars).collect()
    }
}

/// Derives [`LinkAnalysis`] records, memoized in a bounded LRU cache.
///
/// The analyzer never observes graph mutations itself; the owner calls
/// [`LinkAnalyzer::invalidate`] / [`LinkAnalyzer::invalidate_all`] after
/// each mutation so a stale entry is never served.
pub struct LinkAnalyzer {
    cache: LruCache<NoteId, LinkAnalysis>,
    excerpt_chars: usize,
}

impl LinkAnalyzer {
    pub fn new(cache_capacity: usize, excerpt_chars: usize) -> Self {
        LinkAnalyzer {
            cache: LruCache::new(cache_capacity),
            excerpt_chars,
        }
    }

    pub fn analyze(&mut self, graph: &LinkGraph, id: &NoteId) -> Result<LinkAnalysis, EngineError> {
        let Some(note) = graph.note(id) else {
            return Err(EngineError::NoteNotFound(id.clone()));
        };
        if let Some(hit) = self.cache.get(id) {
            return Ok(hit.clone());
        }

        let outgoing: BTreeSet<NoteId> = graph.outgoing(id).cloned().collect();
        let incoming: BTreeSet<NoteId> = graph.incoming(id).cloned().collect();
        let resolved = outgoing.iter().filter(|t| graph.contains(t)).count();

        let analysis = LinkAnalysis {
            id: id.clone(),
            density: link_density(resolved, incoming.len(), graph.note_count()),
            granularity: granularity(outgoing.len(), incoming.len()),
            layers: ContextLayers {
                title: note.title.clone(),
                excerpt: excerpt(&note.body, self.excerpt_chars),
                body: note.body.clone(),
            },
            outgoing,
            incoming,
        };
        self.cache.insert(id.clone(), analysis.clone());
        Ok(analysis)
    }

    /// Drop cached entries for the given ids.
    pub fn invalidate<'a>(&mut self, ids: impl IntoIterator<Item = &'a NoteId>) {
        for id in ids {
            self.cache.remove(id);
        }
    }

    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
