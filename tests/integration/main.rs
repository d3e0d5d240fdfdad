//! Integration tests for trellis
//!
//! These drive the full stack — scan, parse, graph, analysis, path
//! search, persistence — over real corpora on disk.

use std::path::Path;

use trellis_core::{NoteId, PathStrategy};
use trellis_engine::{EngineConfig, LinkEngine};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn config() -> EngineConfig {
    EngineConfig {
        pool_size: 2,
        ..EngineConfig::default()
    }
}

/// The acceptance scenario: A links to B, B links to C, C has no links.
#[tokio::test]
async fn three_note_corpus_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "A.md", "---\ntitle: Overview\n---\nStart with [[B]].");
    write(dir.path(), "B.md", "---\ncomplexity: 2\n---\nDetails in [[C]].");
    write(dir.path(), "C.md", "A terminal concept.");

    let (engine, report) = LinkEngine::open(dir.path(), config()).await.unwrap();
    assert_eq!(report.added, 3);
    assert_eq!(report.failed, 0);

    // incoming(C) = {B}, incoming(A) = {}
    let c = engine.analyze(&"c".into()).await.unwrap();
    assert_eq!(c.incoming.iter().map(NoteId::as_str).collect::<Vec<_>>(), ["b"]);
    assert_eq!(c.granularity, 1.0, "pure sink");

    let a = engine.analyze(&"a".into()).await.unwrap();
    assert!(a.incoming.is_empty());
    assert!((0.0..=0.5).contains(&a.granularity), "pure source");
    assert_eq!(a.layers.title, "Overview");

    // shortest_path(A, C) = [A, B, C] with distance 2, both strategies.
    for strategy in [PathStrategy::BreadthFirst, PathStrategy::AStar] {
        let path = engine
            .shortest_path(&"a".into(), &"c".into(), 10, Some(strategy))
            .await
            .unwrap()
            .expect("path should exist");
        let ids: Vec<_> = path.path.iter().map(NoteId::as_str).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(path.distance, 2);
    }

    // Distance is symmetric: the traversal is undirected.
    let reverse = engine
        .shortest_path(&"c".into(), &"a".into(), 10, None)
        .await
        .unwrap()
        .expect("path should exist");
    assert_eq!(reverse.distance, 2);
}

#[tokio::test]
async fn deleting_the_waypoint_dangles_the_link_and_breaks_the_path() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "A.md", "[[B]]");
    write(dir.path(), "B.md", "[[C]]");
    write(dir.path(), "C.md", "end");

    let (engine, _) = LinkEngine::open(dir.path(), config()).await.unwrap();
    std::fs::remove_file(dir.path().join("B.md")).unwrap();
    let report = engine.refresh().await.unwrap();
    assert_eq!(report.removed, 1);

    let a = engine.analyze(&"a".into()).await.unwrap();
    assert!(a.outgoing.contains(&"b".into()), "dangling target preserved");

    let path = engine
        .shortest_path(&"a".into(), &"c".into(), 5, None)
        .await
        .unwrap();
    assert!(path.is_none(), "SearchExhausted is a result, not an error");

    // Recreating B restores both the resolution and the route.
    write(dir.path(), "B.md", "back, still [[C]]");
    engine.refresh().await.unwrap();
    let b = engine.analyze(&"b".into()).await.unwrap();
    assert!(b.incoming.contains(&"a".into()), "dangling link resolved on recreation");
    assert!(engine
        .shortest_path(&"a".into(), &"c".into(), 5, None)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn incremental_refresh_equals_full_rescan() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "notes/alpha.md", "[[beta]] [[gamma]]");
    write(dir.path(), "notes/beta.md", "[[notes/gamma]]");
    write(dir.path(), "notes/gamma.md", "quiet");

    let (engine, _) = LinkEngine::open(dir.path(), config()).await.unwrap();
    write(dir.path(), "notes/beta.md", "rewritten to point at [[alpha]]");
    engine.refresh().await.unwrap();
    let incremental = engine.graph_statistics().await;

    let full = engine.full_refresh().await.unwrap();
    assert_eq!(full.added, 3);
    let rescan = engine.graph_statistics().await;

    assert_eq!(incremental, rescan);
}

#[tokio::test]
async fn cold_start_from_snapshot_serves_queries() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "hub.md", "[[left]] [[right]]");
    write(dir.path(), "left.md", "x");
    write(dir.path(), "right.md", "x");

    {
        let (_engine, report) = LinkEngine::open(dir.path(), config()).await.unwrap();
        assert_eq!(report.added, 3);
    }

    let (engine, report) = LinkEngine::open(dir.path(), config()).await.unwrap();
    assert_eq!(report.added + report.modified + report.removed, 0, "nothing re-parsed");

    let hub = engine.analyze(&"hub".into()).await.unwrap();
    assert_eq!(hub.outgoing.len(), 2);
    let left = engine.analyze(&"left".into()).await.unwrap();
    assert!(left.incoming.contains(&"hub".into()));
}

#[tokio::test]
async fn corrupt_snapshot_falls_back_to_full_rescan() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "solo.md", "alone");

    {
        LinkEngine::open(dir.path(), config()).await.unwrap();
    }
    std::fs::write(trellis_core::snapshot_path(dir.path()), b"garbage").unwrap();

    let (engine, report) = LinkEngine::open(dir.path(), config()).await.unwrap();
    assert_eq!(report.added, 1, "rescanned from sources");
    assert!(engine.analyze(&"solo".into()).await.is_ok());
}

#[tokio::test]
async fn nested_directories_and_spaced_names_resolve() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Deep Topic.md", "see [[topics/Sub Topic]]");
    write(dir.path(), "topics/Sub Topic.md", "see [[Deep Topic]]");

    let (engine, _) = LinkEngine::open(dir.path(), config()).await.unwrap();

    let deep = engine.analyze(&"deep_topic".into()).await.unwrap();
    assert!(deep.outgoing.contains(&"topics/sub_topic".into()));
    assert!(deep.incoming.contains(&"topics/sub_topic".into()));

    let path = engine
        .shortest_path(&"deep_topic".into(), &"topics/sub_topic".into(), 3, None)
        .await
        .unwrap()
        .expect("one hop apart");
    assert_eq!(path.distance, 1);
}
