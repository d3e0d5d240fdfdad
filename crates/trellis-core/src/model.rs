//! Core data structures for the note-link graph

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Complexity assumed for notes whose front-matter declares none.
pub const DEFAULT_COMPLEXITY: f64 = 1.0;

/// Unique, stable identifier for a note.
///
/// Derived from the corpus-relative source path and from wiki-link targets
/// with the same fold, so `[[Graph Theory]]` matches the note stored at
/// `Graph Theory.md` by plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NoteId(pub String);

impl NoteId {
    /// Derive the id for a corpus-relative path: separators normalized to
    /// `/`, extension stripped, each segment case-folded with internal
    /// whitespace collapsed to underscores.
    pub fn from_relative_path(rel: &str) -> Self {
        let normalized = rel.replace('\\', "/");
        let mut segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        if let Some(last) = segments.pop() {
            let stem = match last.rfind('.') {
                Some(pos) if pos > 0 => &last[..pos],
                _ => last,
            };
            let mut folded: Vec<String> = segments.iter().map(|s| fold_segment(s)).collect();
            folded.push(fold_segment(stem));
            NoteId(folded.join("/"))
        } else {
            NoteId(String::new())
        }
    }

    /// Normalize a raw wiki-link target into id form: trim, internal
    /// whitespace to underscores, case-fold.
    pub fn from_link_target(raw: &str) -> Self {
        NoteId(fold_segment(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn fold_segment(raw: &str) -> String {
    raw.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        NoteId(s.to_string())
    }
}

/// A single indexed note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub tags: Vec<String>,
    /// Declared complexity from front-matter; [`DEFAULT_COMPLEXITY`] when absent.
    pub complexity: f64,
    /// Free-form front-matter keys, preserved but not interpreted.
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub body: String,
    /// Normalized outgoing link targets. Targets need not resolve to an
    /// indexed note; dangling targets are valid data.
    pub links: BTreeSet<NoteId>,
}

impl Note {
    pub fn new(id: NoteId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Note {
            id,
            title: title.into(),
            tags: Vec::new(),
            complexity: DEFAULT_COMPLEXITY,
            metadata: BTreeMap::new(),
            body: body.into(),
            links: BTreeSet::new(),
        }
    }

    pub fn with_links(mut self, links: impl IntoIterator<Item = NoteId>) -> Self {
        self.links = links.into_iter().collect();
        self
    }
}

/// An ordered source → target reference between notes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectedLink {
    pub source: NoteId,
    pub target: NoteId,
}

/// Progressively cheaper representations of a note's content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextLayers {
    pub title: String,
    /// First paragraph or the first N characters of the body, whichever is
    /// shorter.
    pub excerpt: String,
    pub body: String,
}

/// Derived link summary for a single note. Cached; rebuilt on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkAnalysis {
    pub id: NoteId,
    pub outgoing: BTreeSet<NoteId>,
    pub incoming: BTreeSet<NoteId>,
    /// Fraction of possible bidirectional slots actually used, in [0, 1].
    pub density: f64,
    /// 0 = pure overview (only references others), 1 = pure sink (only
    /// referenced by others), 0.5 = isolated.
    pub granularity: f64,
    pub layers: ContextLayers,
}

/// A found path between two notes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathResult {
    /// Note ids from source to target, inclusive.
    pub path: Vec<NoteId>,
    /// Hop count; `path.len() - 1`.
    pub distance: usize,
    /// Mean absolute complexity delta along the path. Callers use it to
    /// rank same-length alternatives; the engine never picks for them.
    pub cost: f64,
}

/// Cheap identity summary of a note source, for change detection only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteFingerprint {
    pub size: u64,
    /// Modification time in nanoseconds since the epoch. Nanosecond
    /// resolution catches same-second rewrites on filesystems that
    /// provide it.
    pub mtime_ns: i64,
    /// SHA-256 of the raw bytes, hex-encoded. Authoritative for `changed`.
    pub content_hash: String,
}

impl NoteFingerprint {
    /// Hash comparison; size/mtime are a fast pre-check only.
    pub fn changed(&self, other: &NoteFingerprint) -> bool {
        self.content_hash != other.content_hash
    }

    /// Fast pre-check: a matching size and mtime lets the scanner skip
    /// hashing entirely.
    pub fn same_stat(&self, size: u64, mtime_ns: i64) -> bool {
        self.size == size && self.mtime_ns == mtime_ns
    }
}
