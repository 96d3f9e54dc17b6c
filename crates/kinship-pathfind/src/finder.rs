//! Path queries over a graph snapshot.
//!
//! `PathFinder` is stateless apart from its settings: every call is a
//! deterministic function of the snapshot, the endpoints, and the context.

use kinship_core::config::PathfindSettings;
use kinship_core::types::FRIENDS;
use kinship_core::{ExecutionContext, GraphSnapshot, Path};

use crate::algorithms;
use crate::error::{PathfindError, Result};
use crate::graph::TraversalGraph;
use crate::types::{LongestPath, SearchStatus};

#[derive(Debug, Clone)]
pub struct PathFinder {
    /// Relation kind to follow; `None` follows every relation.
    pub relation_kind: Option<String>,
    /// Expansions between two context checks.
    pub poll_interval: usize,
}

impl Default for PathFinder {
    fn default() -> Self {
        Self {
            relation_kind: Some(FRIENDS.to_string()),
            poll_interval: 256,
        }
    }
}

impl From<&PathfindSettings> for PathFinder {
    fn from(settings: &PathfindSettings) -> Self {
        Self {
            relation_kind: Some(settings.relation_kind.clone()),
            poll_interval: settings.poll_interval,
        }
    }
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow every relation kind.
    pub fn any_kind(mut self) -> Self {
        self.relation_kind = None;
        self
    }

    /// Values below 1 are treated as 1 by the context poller.
    pub fn with_poll_interval(mut self, poll_interval: usize) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Fewest-edges path between `start` and `end`, traversing relations in
    /// both directions.
    #[tracing::instrument(name = "find_shortest_path", skip(self, snapshot, ctx))]
    pub fn find_shortest_path(
        &self,
        snapshot: &GraphSnapshot,
        start: &str,
        end: &str,
        ctx: &ExecutionContext,
    ) -> Result<Path> {
        let graph = self.traversal_graph(snapshot);
        let (source, target) = resolve(&graph, start, end)?;

        match algorithms::shortest_path(&graph, source, target, ctx, self.poll_interval)? {
            Some(indices) => {
                let path = Path::new(graph.names_of(&indices));
                tracing::debug!(length = path.len(), "Shortest path found");
                Ok(path)
            }
            None => Err(no_path(start, end)),
        }
    }

    /// Longest simple path between `start` and `end`.
    ///
    /// When the context ends mid-search the best path so far is returned with
    /// `SearchStatus::Truncated`. If nothing was found by then, the context
    /// error is returned instead, since disconnection was not established.
    #[tracing::instrument(name = "find_longest_path", skip(self, snapshot, ctx))]
    pub fn find_longest_path(
        &self,
        snapshot: &GraphSnapshot,
        start: &str,
        end: &str,
        ctx: &ExecutionContext,
    ) -> Result<LongestPath> {
        let graph = self.traversal_graph(snapshot);
        let (source, target) = resolve(&graph, start, end)?;

        let search =
            algorithms::longest_simple_path(&graph, source, target, ctx, self.poll_interval);
        tracing::debug!(
            expansions = search.expansions,
            interrupted = search.interrupted.is_some(),
            "Longest path search finished"
        );

        match (search.best, search.interrupted) {
            (Some(indices), None) => Ok(LongestPath {
                path: Path::new(graph.names_of(&indices)),
                status: SearchStatus::Complete,
                expansions: search.expansions,
            }),
            (Some(indices), Some(reason)) => {
                tracing::warn!(%reason, "Longest path search truncated");
                Ok(LongestPath {
                    path: Path::new(graph.names_of(&indices)),
                    status: SearchStatus::Truncated {
                        reason: reason.into(),
                    },
                    expansions: search.expansions,
                })
            }
            (None, Some(reason)) => Err(reason.into()),
            (None, None) => Err(no_path(start, end)),
        }
    }

    fn traversal_graph(&self, snapshot: &GraphSnapshot) -> TraversalGraph {
        TraversalGraph::from_snapshot(snapshot, self.relation_kind.as_deref())
    }
}

fn resolve(graph: &TraversalGraph, start: &str, end: &str) -> Result<(usize, usize)> {
    let lookup = |name: &str| {
        graph
            .index_of(name)
            .ok_or_else(|| PathfindError::VertexNotFound {
                name: name.to_string(),
            })
    };
    Ok((lookup(start)?, lookup(end)?))
}

fn no_path(start: &str, end: &str) -> PathfindError {
    PathfindError::NoPathFound {
        start: start.to_string(),
        end: end.to_string(),
    }
}
