//! Shortest-path search over the undirected view of the link graph
//!
//! A hop may follow a link in either direction. Two interchangeable
//! strategies sit behind [`SearchStrategy`]: a breadth-first baseline that
//! guarantees the minimum hop count, and an A* variant ordered by a
//! neighbor-overlap heuristic that converges faster on well-connected
//! corpora at a small optimality risk.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::LruCache;
use crate::error::EngineError;
use crate::graph::LinkGraph;
use crate::model::{NoteId, PathResult};

/// Which search algorithm answers a path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathStrategy {
    /// Level-order exploration; minimum hop count guaranteed.
    #[default]
    BreadthFirst,
    /// Heuristic-accelerated; near-optimal, faster when the corpus is
    /// well connected.
    AStar,
}

impl PathStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathStrategy::BreadthFirst => "bfs",
            PathStrategy::AStar => "astar",
        }
    }
}

impl FromStr for PathStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(PathStrategy::BreadthFirst),
            "astar" | "a*" => Ok(PathStrategy::AStar),
            other => Err(format!("unknown strategy '{other}' (expected bfs or astar)")),
        }
    }
}

/// A path-search algorithm over the undirected link graph.
pub trait SearchStrategy: Send + Sync {
    /// Node sequence from `from` to `to` inclusive, or `None` when no path
    /// exists within `max_depth` hops. Endpoints are known to exist.
    fn search(
        &self,
        graph: &LinkGraph,
        from: &NoteId,
        to: &NoteId,
        max_depth: usize,
    ) -> Option<Vec<NoteId>>;
}

pub struct BreadthFirst;

impl SearchStrategy for BreadthFirst {
    fn search(
        &self,
        graph: &LinkGraph,
        from: &NoteId,
        to: &NoteId,
        max_depth: usize,
    ) -> Option<Vec<NoteId>> {
        let mut parents: HashMap<NoteId, NoteId> = HashMap::new();
        let mut depth: HashMap<NoteId, usize> = HashMap::new();
        let mut queue = VecDeque::new();

        depth.insert(from.clone(), 0);
        queue.push_back(from.clone());

        while let Some(current) = queue.pop_front() {
            let hops = depth[&current];
            if hops == max_depth {
                continue;
            }
            for neighbor in graph.undirected_neighbors(&current) {
                if depth.contains_key(&neighbor) {
                    continue;
                }
                depth.insert(neighbor.clone(), hops + 1);
                parents.insert(neighbor.clone(), current.clone());
                if neighbor == *to {
                    return Some(reconstruct(&parents, from, to));
                }
                queue.push_back(neighbor);
            }
        }
        None
    }
}

pub struct AStar;

impl SearchStrategy for AStar {
    fn search(
        &self,
        graph: &LinkGraph,
        from: &NoteId,
        to: &NoteId,
        max_depth: usize,
    ) -> Option<Vec<NoteId>> {
        let goal_neighbors = graph.undirected_neighbors(to);
        let mut parents: HashMap<NoteId, NoteId> = HashMap::new();
        let mut best_hops: HashMap<NoteId, usize> = HashMap::new();
        let mut open = BinaryHeap::new();

        best_hops.insert(from.clone(), 0);
        open.push(OpenEntry { priority: 0.0, hops: 0, id: from.clone() });

        while let Some(OpenEntry { hops, id, .. }) = open.pop() {
            if id == *to {
                return Some(reconstruct(&parents, from, to));
            }
            if hops > best_hops.get(&id).copied().unwrap_or(usize::MAX) || hops == max_depth {
                continue;
            }
            for neighbor in graph.undirected_neighbors(&id) {
                let next_hops = hops + 1;
                if next_hops >= best_hops.get(&neighbor).copied().unwrap_or(usize::MAX) {
                    continue;
                }
                best_hops.insert(neighbor.clone(), next_hops);
                parents.insert(neighbor.clone(), id.clone());
                let estimate = 1.0 - jaccard(&graph.undirected_neighbors(&neighbor), &goal_neighbors);
                open.push(OpenEntry {
                    priority: next_hops as f64 + estimate,
                    hops: next_hops,
                    id: neighbor,
                });
            }
        }
        None
    }
}

/// Min-heap entry ordered by priority.
struct OpenEntry {
    priority: f64,
    hops: usize,
    id: NoteId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap pops the lowest priority first.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.hops.cmp(&self.hops))
    }
}

/// Overlap of two neighbor sets in [0, 1]; 0 when either is empty.
fn jaccard(a: &BTreeSet<NoteId>, b: &BTreeSet<NoteId>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn reconstruct(parents: &HashMap<NoteId, NoteId>, from: &NoteId, to: &NoteId) -> Vec<NoteId> {
    let mut path = vec![to.clone()];
    let mut current = to;
    while current != from {
        match parents.get(current) {
            Some(parent) => {
                path.push(parent.clone());
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Mean absolute complexity delta between consecutive notes on the path.
pub fn traversal_cost(graph: &LinkGraph, path: &[NoteId]) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }
    let complexity = |id: &NoteId| graph.note(id).map(|n| n.complexity).unwrap_or_default();
    let total: f64 = path
        .windows(2)
        .map(|pair| (complexity(&pair[1]) - complexity(&pair[0])).abs())
        .sum();
    total / (path.len() - 1) as f64
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathKey {
    from: NoteId,
    to: NoteId,
    max_depth: usize,
    strategy: PathStrategy,
}

/// Path queries with a bounded result cache.
///
/// "Not found within depth" outcomes are cached too; they are as expensive
/// to recompute as hits. The owner clears the cache on any graph mutation.
pub struct PathFinder {
    cache: LruCache<PathKey, Option<PathResult>>,
}

impl PathFinder {
    pub fn new(cache_capacity: usize) -> Self {
        PathFinder {
            cache: LruCache::new(cache_capacity),
        }
    }

    pub fn shortest_path(
        &mut self,
        graph: &LinkGraph,
        from: &NoteId,
        to: &NoteId,
        max_depth: usize,
        strategy: PathStrategy,
    ) -> Result<Option<PathResult>, EngineError> {
        if max_depth == 0 {
            return Err(EngineError::InvalidDepth(0));
        }
        for endpoint in [from, to] {
            if !graph.contains(endpoint) {
                return Err(EngineError::NoteNotFound(endpoint.clone()));
            }
        }
        if from == to {
            return Ok(Some(PathResult {
                path: vec![from.clone()],
                distance: 0,
                cost: 0.0,
            }));
        }

        let key = PathKey {
            from: from.clone(),
            to: to.clone(),
            max_depth,
            strategy,
        };
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let algorithm: &dyn SearchStrategy = match strategy {
            PathStrategy::BreadthFirst => &BreadthFirst,
            PathStrategy::AStar => &AStar,
        };
        let result = algorithm.search(graph, from, to, max_depth).map(|path| PathResult {
            distance: path.len() - 1,
            cost: traversal_cost(graph, &path),
            path,
        });
        self.cache.insert(key, result.clone());
        Ok(result)
    }

    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
