//! Read-only derivations over the link graph

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use trellis_core::{EngineError, LinkGraph, NoteId};

/// One note reached by a neighborhood expansion.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NeighborhoodMember {
    pub id: NoteId,
    /// Hops from the origin, 1-based (the origin itself is not a member).
    pub distance: usize,
}

/// The notes within `depth` undirected hops of an origin.
#[derive(Debug, Clone, Serialize)]
pub struct Neighborhood {
    pub origin: NoteId,
    pub depth: usize,
    /// Sorted by distance, then id.
    pub members: Vec<NeighborhoodMember>,
}

/// Level-order expansion around a note, following links in either
/// direction.
pub fn neighborhood(
    graph: &LinkGraph,
    origin: &NoteId,
    depth: usize,
) -> Result<Neighborhood, EngineError> {
    if !graph.contains(origin) {
        return Err(EngineError::NoteNotFound(origin.clone()));
    }

    let mut distances: HashMap<NoteId, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    distances.insert(origin.clone(), 0);
    queue.push_back(origin.clone());

    while let Some(current) = queue.pop_front() {
        let hops = distances[&current];
        if hops == depth {
            continue;
        }
        for neighbor in graph.undirected_neighbors(&current) {
            if !distances.contains_key(&neighbor) {
                distances.insert(neighbor.clone(), hops + 1);
                queue.push_back(neighbor);
            }
        }
    }

    let mut members: Vec<NeighborhoodMember> = distances
        .into_iter()
        .filter(|(id, _)| id != origin)
        .map(|(id, distance)| NeighborhoodMember { id, distance })
        .collect();
    members.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.id.cmp(&b.id)));

    Ok(Neighborhood {
        origin: origin.clone(),
        depth,
        members,
    })
}

/// Corpus-level counters reported to collaborators.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphStatistics {
    pub note_count: usize,
    /// Authored links, dangling included.
    pub link_count: usize,
    pub resolved_link_count: usize,
    pub dangling_target_count: usize,
    /// Notes with no links in either direction.
    pub isolated_count: usize,
    pub average_out_degree: f64,
}

pub fn graph_statistics(graph: &LinkGraph) -> GraphStatistics {
    let note_count = graph.note_count();
    let isolated_count = graph
        .all_ids()
        .filter(|id| graph.outgoing(id).next().is_none() && graph.incoming(id).next().is_none())
        .count();
    let link_count = graph.link_count();

    GraphStatistics {
        note_count,
        link_count,
        resolved_link_count: graph.resolved_link_count(),
        dangling_target_count: graph.dangling_targets().len(),
        isolated_count,
        average_out_degree: if note_count == 0 {
            0.0
        } else {
            link_count as f64 / note_count as f64
        },
    }
}
