//! End-to-end scenarios over the in-process store.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use kinship_core::{Batch, ContextError, Entity, ExecutionContext, Path, Relation};
use kinship_graph::{GraphError, GraphStore, MemoryStore};
use kinship_pathfind::{demo, PathfindEngine, PathfindError, SearchStatus};

async fn seeded() -> PathfindEngine<MemoryStore> {
    let engine = PathfindEngine::new(MemoryStore::new());
    engine
        .commit(&demo::people(), &ExecutionContext::background())
        .await
        .unwrap();
    engine
}

/// Every hop of `path` is a relation in either direction and no name repeats.
fn assert_simple_path(path: &Path, relations: &[Relation]) {
    let mut seen = HashSet::new();
    assert!(path.nodes.iter().all(|n| seen.insert(n.clone())), "{path}");
    for hop in path.nodes.windows(2) {
        assert!(
            relations.iter().any(|r| r.connects(&hop[0], &hop[1])),
            "no relation between {} and {}",
            hop[0],
            hop[1]
        );
    }
}

#[tokio::test]
async fn test_recommit_converges() {
    let engine = seeded().await;
    let ctx = ExecutionContext::background();
    engine.commit(&demo::people(), &ctx).await.unwrap();

    assert_eq!(engine.store().entity_count().await.unwrap(), 10);
    assert_eq!(engine.store().relation_count().await.unwrap(), 20);
}

#[tokio::test]
async fn test_shortest_path_alice_to_diana() {
    let engine = seeded().await;
    let ctx = ExecutionContext::background();

    let path = engine.shortest_path("Alice", "Diana", &ctx).await.unwrap();
    assert_eq!(path.nodes, vec!["Alice", "Jack", "Diana"]);
    assert_eq!(path.len(), 2);
}

#[tokio::test]
async fn test_longest_path_alice_to_diana() {
    let engine = seeded().await;
    let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));

    let longest = engine.longest_path("Alice", "Diana", &ctx).await.unwrap();
    assert_eq!(longest.status, SearchStatus::Complete);
    assert_eq!(longest.path.len(), 9);
    assert_eq!(longest.path.start(), Some("Alice"));
    assert_eq!(longest.path.end(), Some("Diana"));

    let snapshot = engine.store().snapshot().await.unwrap();
    assert_simple_path(&longest.path, &snapshot.relations);
}

#[tokio::test]
async fn test_friends_of_alice() {
    let engine = seeded().await;
    let ctx = ExecutionContext::background();

    let names: Vec<String> = engine
        .friends_of("Alice", &ctx)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["Bob", "Charlie"]);
}

#[tokio::test]
async fn test_disconnected_person() {
    let engine = seeded().await;
    let ctx = ExecutionContext::background();
    engine
        .commit(&Batch::new().entity(Entity::new("Zed")), &ctx)
        .await
        .unwrap();

    assert!(matches!(
        engine.shortest_path("Alice", "Zed", &ctx).await,
        Err(PathfindError::NoPathFound { .. })
    ));
    assert!(matches!(
        engine.longest_path("Zed", "Alice", &ctx).await,
        Err(PathfindError::NoPathFound { .. })
    ));
}

#[tokio::test]
async fn test_unknown_person() {
    let engine = seeded().await;
    let ctx = ExecutionContext::background();

    assert!(matches!(
        engine.shortest_path("Alice", "Nobody", &ctx).await,
        Err(PathfindError::VertexNotFound { ref name }) if name == "Nobody"
    ));
    assert!(matches!(
        engine.friends_of("Nobody", &ctx).await,
        Err(PathfindError::Graph(GraphError::EntityNotFound { .. }))
    ));
}

#[tokio::test]
async fn test_failed_batch_leaves_graph_unchanged() {
    let engine = seeded().await;
    let ctx = ExecutionContext::background();
    let before = engine.store().snapshot().await.unwrap();

    let batch = Batch::new()
        .entity(Entity::new("Kim").with_attribute("age", 27))
        .relation(Relation::friends("Kim", "Alice"))
        .relation(Relation::friends("Kim", "Nobody"));
    assert!(matches!(
        engine.commit(&batch, &ctx).await,
        Err(PathfindError::Graph(GraphError::EntityNotFound { .. }))
    ));

    assert_eq!(engine.store().snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn test_zero_deadline_longest_returns_promptly() {
    let engine = seeded().await;
    let ctx = ExecutionContext::with_timeout(Duration::ZERO);

    let started = Instant::now();
    let outcome = engine.longest_path("Alice", "Diana", &ctx).await;
    assert!(started.elapsed() < Duration::from_secs(1));

    match outcome {
        Err(PathfindError::Context(ContextError::DeadlineExceeded { .. })) => {}
        Ok(longest) => assert!(longest.is_truncated()),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_canceled_context_stops_queries() {
    let engine = seeded().await;
    let ctx = ExecutionContext::background();
    ctx.cancel();

    assert!(matches!(
        engine.shortest_path("Alice", "Diana", &ctx).await,
        Err(PathfindError::Context(ContextError::Canceled))
    ));
    assert!(matches!(
        engine
            .commit(&Batch::new().entity(Entity::new("Kim")), &ctx)
            .await,
        Err(PathfindError::Context(ContextError::Canceled))
    ));
}

#[tokio::test]
async fn test_demo_walkthrough_on_one_engine() {
    let engine = PathfindEngine::new(MemoryStore::new());
    let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));

    let report = demo::run(&engine, "Alice", "Diana", &ctx).await.unwrap();
    assert_eq!(report.seeded.entities, 10);
    assert_eq!(report.seeded.relations, 20);

    let friends: Vec<&str> = report.friends.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(friends, vec!["Bob", "Charlie"]);

    assert_eq!(report.shortest.nodes, vec!["Alice", "Jack", "Diana"]);
    assert_eq!(report.shortest.length, 2);
    assert_eq!(report.longest.length, 9);
    assert_eq!(report.longest.status, SearchStatus::Complete);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["shortest"]["status"], "complete");
    assert_eq!(json["longest"]["nodes"][0], "Alice");
}

#[tokio::test]
async fn test_demo_walkthrough_unknown_person() {
    let engine = PathfindEngine::new(MemoryStore::new());
    let ctx = ExecutionContext::background();

    assert!(matches!(
        demo::run(&engine, "Nobody", "Diana", &ctx).await,
        Err(PathfindError::Graph(GraphError::EntityNotFound { .. }))
    ));
    // The seed still committed before the query failed.
    assert_eq!(engine.store().entity_count().await.unwrap(), 10);
}

