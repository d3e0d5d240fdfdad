//! CLI command implementations

use std::path::PathBuf;

use trellis_core::{clear_snapshot, EngineError, NoteId, PathStrategy};
use trellis_engine::{EngineConfig, LinkEngine};

pub async fn refresh(root: PathBuf, full: bool) -> anyhow::Result<()> {
    tracing::info!("Indexing corpus: {}", root.display());

    let (engine, mut report) = LinkEngine::open(&root, EngineConfig::default()).await?;
    if full {
        report = engine.full_refresh().await?;
    }

    let stats = engine.graph_statistics().await;
    tracing::info!(
        "Indexed {} notes, {} links ({} dangling targets)",
        stats.note_count,
        stats.link_count,
        stats.dangling_target_count
    );
    for failure in &report.errors {
        tracing::warn!("skipped {}: {}", failure.path.display(), failure.reason);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn analyze(root: PathBuf, note: String) -> anyhow::Result<()> {
    let (engine, _) = LinkEngine::open(&root, EngineConfig::default()).await?;
    let id = NoteId::from_link_target(&note);

    match engine.analyze(&id).await {
        Ok(analysis) => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
        Err(EngineError::NoteNotFound(id)) => {
            eprintln!("note not found: {id}");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn path(
    root: PathBuf,
    from: String,
    to: String,
    max_depth: usize,
    strategy: String,
) -> anyhow::Result<()> {
    let strategy: PathStrategy = strategy.parse().map_err(anyhow::Error::msg)?;
    let (engine, _) = LinkEngine::open(&root, EngineConfig::default()).await?;

    let from = NoteId::from_link_target(&from);
    let to = NoteId::from_link_target(&to);
    match engine.shortest_path(&from, &to, max_depth, Some(strategy)).await? {
        Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        None => println!("no path from {from} to {to} within {max_depth} hops"),
    }
    Ok(())
}

pub async fn neighborhood(root: PathBuf, note: String, depth: usize) -> anyhow::Result<()> {
    let (engine, _) = LinkEngine::open(&root, EngineConfig::default()).await?;
    let id = NoteId::from_link_target(&note);
    let neighborhood = engine.neighborhood(&id, depth).await?;
    println!("{}", serde_json::to_string_pretty(&neighborhood)?);
    Ok(())
}

pub async fn stats(root: PathBuf) -> anyhow::Result<()> {
    let (engine, _) = LinkEngine::open(&root, EngineConfig::default()).await?;
    let stats = engine.graph_statistics().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub fn clear(root: PathBuf) -> anyhow::Result<()> {
    clear_snapshot(&root)?;
    tracing::info!("Persisted index cleared for {}", root.display());
    Ok(())
}
