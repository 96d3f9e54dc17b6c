//! In-memory traversal graph for path algorithms.
//!
//! Built from a `GraphSnapshot`: entity names get dense indices in snapshot
//! order, and every relation becomes an undirected adjacency entry on both
//! endpoints, in relation insertion order. That order is what makes search
//! results deterministic.

use std::collections::{HashMap, HashSet, VecDeque};

use kinship_core::GraphSnapshot;

pub struct TraversalGraph {
    /// Entity names, indexed by dense index.
    pub names: Vec<String>,
    /// `adjacency[i]` = neighbors of `i` in either direction, first occurrence only.
    pub adjacency: Vec<Vec<usize>>,
    /// Map from entity name → dense index.
    pub node_index: HashMap<String, usize>,
}

impl TraversalGraph {
    /// Build from a snapshot, following only relations of `kind` when given.
    ///
    /// Relations with an endpoint missing from the snapshot and self-loops are
    /// skipped; neither can appear on a simple path.
    pub fn from_snapshot(snapshot: &GraphSnapshot, kind: Option<&str>) -> Self {
        let mut node_index = HashMap::with_capacity(snapshot.entities.len());
        let mut names = Vec::with_capacity(snapshot.entities.len());
        for entity in &snapshot.entities {
            if !node_index.contains_key(&entity.name) {
                node_index.insert(entity.name.clone(), names.len());
                names.push(entity.name.clone());
            }
        }

        let mut adjacency = vec![Vec::new(); names.len()];
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for relation in &snapshot.relations {
            if kind.is_some_and(|k| k != relation.kind) {
                continue;
            }
            let (Some(&a), Some(&b)) = (
                node_index.get(&relation.from),
                node_index.get(&relation.to),
            ) else {
                continue;
            };
            if a == b || !seen.insert((a.min(b), a.max(b))) {
                continue;
            }
            adjacency[a].push(b);
            adjacency[b].push(a);
        }

        Self {
            names,
            adjacency,
            node_index,
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.node_index.get(name).copied()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of undirected edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Membership mask and size of the connected component containing `source`.
    pub fn component_of(&self, source: usize) -> (Vec<bool>, usize) {
        let mut member = vec![false; self.node_count()];
        member[source] = true;
        let mut size = 1;
        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            for &next in &self.adjacency[node] {
                if !member[next] {
                    member[next] = true;
                    size += 1;
                    queue.push_back(next);
                }
            }
        }
        (member, size)
    }

    /// Map a sequence of indices back to entity names.
    pub fn names_of(&self, indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| self.names[i].clone()).collect()
    }
}
