//! kinship-pathfind: Path discovery over the Kinship people graph.
//!
//! Fetches a snapshot from a [`GraphStore`], builds an in-memory traversal
//! graph, and runs BFS shortest path or bounded longest simple path search
//! under an [`ExecutionContext`].

pub mod algorithms;
pub mod demo;
pub mod error;
pub mod fetch;
pub mod finder;
pub mod graph;
pub mod types;

pub use error::PathfindError;
pub use finder::PathFinder;
pub use types::{LongestPath, PathReport, SearchStatus, TruncationReason};

use kinship_core::{Batch, Entity, ExecutionContext, Path};
use kinship_graph::{BatchReport, GraphMutator, GraphStore};

/// Commits and path queries against one store handle.
pub struct PathfindEngine<S: GraphStore> {
    store: S,
    finder: PathFinder,
}

impl<S: GraphStore> PathfindEngine<S> {
    /// Create a new engine following `FRIENDS` relations.
    pub fn new(store: S) -> Self {
        Self {
            store,
            finder: PathFinder::default(),
        }
    }

    pub fn with_finder(mut self, finder: PathFinder) -> Self {
        self.finder = finder;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    /// Apply a batch atomically.
    pub async fn commit(
        &self,
        batch: &Batch,
        ctx: &ExecutionContext,
    ) -> error::Result<BatchReport> {
        let report = GraphMutator::new(&self.store)
            .commit_batch(batch, ctx)
            .await?;
        Ok(report)
    }

    /// Direct friends of `name` over the configured relation kind.
    pub async fn friends_of(
        &self,
        name: &str,
        ctx: &ExecutionContext,
    ) -> error::Result<Vec<Entity>> {
        let kind = self
            .finder
            .relation_kind
            .as_deref()
            .unwrap_or(kinship_core::types::FRIENDS);
        let friends = ctx.run(self.store.friends_of(name, kind)).await?;
        Ok(friends)
    }

    /// Fewest-edges path between two people.
    pub async fn shortest_path(
        &self,
        start: &str,
        end: &str,
        ctx: &ExecutionContext,
    ) -> error::Result<Path> {
        let snapshot = fetch::fetch_snapshot(&self.store, ctx).await?;
        self.finder.find_shortest_path(&snapshot, start, end, ctx)
    }

    /// Longest simple path between two people, best effort under `ctx`.
    pub async fn longest_path(
        &self,
        start: &str,
        end: &str,
        ctx: &ExecutionContext,
    ) -> error::Result<LongestPath> {
        let snapshot = fetch::fetch_snapshot(&self.store, ctx).await?;
        self.finder.find_longest_path(&snapshot, start, end, ctx)
    }
}
