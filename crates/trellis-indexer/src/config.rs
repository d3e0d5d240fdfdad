//! Engine configuration

use serde::{Deserialize, Serialize};
use trellis_core::{PathStrategy, DEFAULT_EXCERPT_CHARS};

/// Tunables for one engine instance. Constructed in code by the embedding
/// layer; serde derives let collaborators ship it over their own config
/// channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Glob patterns selecting note sources, relative to the corpus root.
    pub include: Vec<String>,
    /// Parse worker count; 0 means one per available core (min 2).
    pub pool_size: usize,
    pub analysis_cache_capacity: usize,
    pub path_cache_capacity: usize,
    /// Bound on the excerpt context layer, in characters.
    pub excerpt_chars: usize,
    /// Strategy used when a path query does not name one.
    pub default_strategy: PathStrategy,
    /// Write a snapshot after every refresh that changed the index.
    pub persist_after_refresh: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            include: vec!["*.md".to_string(), "*.markdown".to_string(), "*.txt".to_string()],
            pool_size: 0,
            analysis_cache_capacity: 512,
            path_cache_capacity: 512,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            default_strategy: PathStrategy::BreadthFirst,
            persist_after_refresh: true,
        }
    }
}

impl EngineConfig {
    /// Resolved worker count, defaulting to the available parallelism.
    pub fn effective_pool_size(&self) -> usize {
        if self.pool_size > 0 {
            return self.pool_size;
        }
        std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2)
    }
}
