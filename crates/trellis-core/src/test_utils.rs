//! Shared fixtures for trellis-core tests

use crate::model::{Note, NoteId};

/// Build a note with the given id and outgoing link targets.
pub fn note(id: &str, links: &[&str]) -> Note {
    Note::new(NoteId::from(id), id.to_string(), format!("body of {id}"))
        .with_links(links.iter().map(|l| NoteId::from(*l)))
}

/// Same as [`note`], with a declared complexity.
pub fn note_with_complexity(id: &str, links: &[&str], complexity: f64) -> Note {
    let mut n = note(id, links);
    n.complexity = complexity;
    n
}

/// The three-note chain used across tests: `a → b → c`.
pub fn chain() -> crate::graph::LinkGraph {
    let mut graph = crate::graph::LinkGraph::new();
    graph.upsert(note("a", &["b"]));
    graph.upsert(note("b", &["c"]));
    graph.upsert(note("c", &[]));
    graph
}
