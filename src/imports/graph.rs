//! Import dependency graph and its deterministic processing order.
//!
//! Nodes are import identities; an edge `parent -> child` means the parent
//! document declared the child. The processing order lists every child
//! before its parents, and among nodes that are ready at the same time picks
//! the lexicographically smallest identity first, so a given graph always
//! produces the same order.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

use super::error::ImportFailure;

/// Directed graph of resolved imports.
#[derive(Debug, Default)]
pub struct ImportGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl ImportGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if it doesn't already exist, returning its index.
    pub fn ensure_node(&mut self, identity: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(identity) {
            index
        } else {
            let index = self.graph.add_node(identity.to_string());
            self.node_map.insert(identity.to_string(), index);
            index
        }
    }

    /// Record that `parent` imports `child`.
    pub fn add_import(&mut self, parent: &str, child: &str) {
        let parent_idx = self.ensure_node(parent);
        let child_idx = self.ensure_node(child);
        if !self.graph.contains_edge(parent_idx, child_idx) {
            self.graph.add_edge(parent_idx, child_idx, ());
        }
    }

    /// Children-first order with lexicographic tie-breaking.
    ///
    /// A node becomes ready once all of its children have been emitted.
    /// Nodes left over when nothing is ready form a cycle.
    pub fn processing_order(&self) -> Result<Vec<String>, ImportFailure> {
        let mut pending: HashMap<NodeIndex, usize> = HashMap::new();
        let mut ready: BTreeSet<(&str, NodeIndex)> = BTreeSet::new();

        for index in self.graph.node_indices() {
            let children = self.graph.neighbors_directed(index, Direction::Outgoing).count();
            if children == 0 {
                ready.insert((self.graph[index].as_str(), index));
            } else {
                pending.insert(index, children);
            }
        }

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some((identity, index)) = ready.pop_first() {
            order.push(identity.to_string());
            for parent in self.graph.neighbors_directed(index, Direction::Incoming) {
                if let Some(remaining) = pending.get_mut(&parent) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        pending.remove(&parent);
                        ready.insert((self.graph[parent].as_str(), parent));
                    }
                }
            }
        }

        if !pending.is_empty() {
            let mut chain: Vec<String> =
                pending.keys().map(|index| self.graph[*index].clone()).collect();
            chain.sort();
            return Err(ImportFailure::Cycle {
                chain,
            });
        }

        Ok(order)
    }
}
