//! Core pathfinding algorithms: BFS shortest path and backtracking DFS for the
//! longest simple path.
//!
//! Both explore neighbors in adjacency order and poll the execution context
//! every `poll_interval` expansions.

use std::collections::VecDeque;

use kinship_core::{ContextError, ExecutionContext};

use crate::graph::TraversalGraph;

/// Fewest-edges path from `source` to `target`.
///
/// First visit wins, so among equally short paths the one reached through the
/// earliest-stored neighbors is returned. The search stops as soon as `target`
/// is dequeued. `Ok(None)` means unreachable.
pub fn shortest_path(
    graph: &TraversalGraph,
    source: usize,
    target: usize,
    ctx: &ExecutionContext,
    poll_interval: usize,
) -> Result<Option<Vec<usize>>, ContextError> {
    ctx.check()?;
    let mut poller = ctx.poller(poll_interval);

    let n = graph.node_count();
    let mut visited = vec![false; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::from([source]);
    visited[source] = true;

    while let Some(node) = queue.pop_front() {
        if node == target {
            return Ok(Some(reconstruct(&prev, source, target)));
        }
        for &next in &graph.adjacency[node] {
            poller.tick()?;
            if !visited[next] {
                visited[next] = true;
                prev[next] = Some(node);
                queue.push_back(next);
            }
        }
    }

    Ok(None)
}

fn reconstruct(prev: &[Option<usize>], source: usize, target: usize) -> Vec<usize> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        match prev[current] {
            Some(parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Outcome of a longest-simple-path search.
#[derive(Debug, Clone)]
pub struct LongestSearch {
    /// Best path found, as node indices.
    pub best: Option<Vec<usize>>,
    /// Set when the context ended before the search space was exhausted.
    pub interrupted: Option<ContextError>,
    /// Branch expansions performed.
    pub expansions: usize,
}

/// Longest simple path from `source` to `target` by exhaustive backtracking.
///
/// A path replaces the current best only when strictly longer, so the
/// first-discovered maximum wins. The search ends early once a path covers
/// the whole connected component, since nothing can be longer.
pub fn longest_simple_path(
    graph: &TraversalGraph,
    source: usize,
    target: usize,
    ctx: &ExecutionContext,
    poll_interval: usize,
) -> LongestSearch {
    let mut search = LongestSearch {
        best: None,
        interrupted: None,
        expansions: 0,
    };

    if let Err(e) = ctx.check() {
        search.interrupted = Some(e);
        return search;
    }
    if source == target {
        search.best = Some(vec![source]);
        return search;
    }

    let (component, component_size) = graph.component_of(source);
    if !component[target] {
        return search;
    }
    let bound = component_size - 1;

    let mut poller = ctx.poller(poll_interval);
    let mut on_path = vec![false; graph.node_count()];
    let mut path = vec![source];
    // cursor[d] = next adjacency position to try from path[d].
    let mut cursor = vec![0usize];
    on_path[source] = true;

    while let Some(&node) = path.last() {
        let depth = path.len() - 1;
        let next_pos = cursor[depth];

        let Some(&next) = graph.adjacency[node].get(next_pos) else {
            on_path[node] = false;
            path.pop();
            cursor.pop();
            continue;
        };
        cursor[depth] += 1;

        if on_path[next] {
            continue;
        }

        search.expansions += 1;
        if let Err(e) = poller.tick() {
            search.interrupted = Some(e);
            break;
        }

        if next == target {
            let edges = path.len();
            let improves = search
                .best
                .as_ref()
                .map_or(true, |best| edges > best.len() - 1);
            if improves {
                let mut found = path.clone();
                found.push(target);
                search.best = Some(found);
                if edges == bound {
                    break;
                }
            }
            // A simple path to `target` ends there.
            continue;
        }

        on_path[next] = true;
        path.push(next);
        cursor.push(0);
    }

    search
}
