//! Hand-authored directed acyclic graphs over named variables.
//!
//! Graphs are built once from a fixed edge list and never mutated by the
//! analysis pipeline. Cycles are rejected at insertion time, so every
//! downstream traversal can rely on a valid topological order existing.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::GcmError;

/// A directed edge of the causal graph.
///
/// Doubles as the pair key of arrow-strength mappings; its display form
/// (`"source -> target"`) is what report payloads use.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Arrow {
    pub source: String,
    pub target: String,
}

impl Arrow {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Directed acyclic graph of named variables with O(1) name lookup.
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    graph: DiGraph<String, ()>,
    node_index: HashMap<String, NodeIndex>,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a node list and an edge list in one step.
    pub fn from_edges<'a, N, E>(nodes: N, edges: E) -> Result<Self, GcmError>
    where
        N: IntoIterator<Item = &'a str>,
        E: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        for (source, target) in edges {
            graph.add_edge(source, target)?;
        }
        Ok(graph)
    }

    /// Add a named node. Names are unique.
    pub fn add_node(&mut self, name: impl Into<String>) -> Result<(), GcmError> {
        let name = name.into();
        if self.node_index.contains_key(&name) {
            return Err(GcmError::DuplicateNode(name));
        }
        let idx = self.graph.add_node(name.clone());
        self.node_index.insert(name, idx);
        Ok(())
    }

    /// Add a directed edge between existing nodes.
    ///
    /// Rejects self-loops and any edge that would create a cycle (DFS
    /// reachability check from `target` back to `source`). Adding an edge
    /// that already exists is a no-op.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<(), GcmError> {
        let source_idx = self.index_of(source)?;
        let target_idx = self.index_of(target)?;
        if source_idx == target_idx || self.has_path(target_idx, source_idx) {
            return Err(GcmError::CyclicEdge {
                source: source.to_string(),
                target: target.to_string(),
            });
        }
        self.graph.update_edge(source_idx, target_idx, ());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node names in insertion order.
    pub fn node_names(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Direct parents of a node, sorted by name for reproducible ordering.
    pub fn parents(&self, name: &str) -> Result<Vec<&str>, GcmError> {
        let idx = self.index_of(name)?;
        let mut parents: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|p| self.graph[p].as_str())
            .collect();
        parents.sort_unstable();
        Ok(parents)
    }

    pub fn is_root(&self, name: &str) -> Result<bool, GcmError> {
        let idx = self.index_of(name)?;
        Ok(self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .is_none())
    }

    /// All edges as arrows, ordered by (source, target).
    pub fn arrows(&self) -> Vec<Arrow> {
        let mut arrows: Vec<Arrow> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(s, t)| Arrow::new(self.graph[s].clone(), self.graph[t].clone()))
            .collect();
        arrows.sort_unstable();
        arrows
    }

    /// Edges pointing into `target`, ordered by source name.
    pub fn arrows_into(&self, target: &str) -> Result<Vec<Arrow>, GcmError> {
        Ok(self
            .parents(target)?
            .into_iter()
            .map(|p| Arrow::new(p, target))
            .collect())
    }

    /// Kahn topological order, stable for a fixed construction sequence.
    pub fn topological_order(&self) -> Vec<&str> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                (
                    idx,
                    self.graph
                        .neighbors_directed(idx, Direction::Incoming)
                        .count(),
                )
            })
            .collect();
        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(idx) = queue.pop_front() {
            order.push(self.graph[idx].as_str());
            for child in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(remaining) = in_degree.get_mut(&child) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }
        debug_assert_eq!(order.len(), self.graph.node_count());
        order
    }

    /// Topological order restricted to the ancestors of `target` plus the
    /// target itself. These are exactly the nodes whose noise terms can
    /// influence the target.
    pub fn ancestral_order(&self, target: &str) -> Result<Vec<&str>, GcmError> {
        let target_idx = self.index_of(target)?;
        let reversed = Reversed(&self.graph);
        let mut closure = vec![false; self.graph.node_count()];
        let mut dfs = Dfs::new(reversed, target_idx);
        while let Some(idx) = dfs.next(reversed) {
            closure[idx.index()] = true;
        }
        Ok(self
            .topological_order()
            .into_iter()
            .filter(|name| {
                self.node_index
                    .get(*name)
                    .is_some_and(|idx| closure[idx.index()])
            })
            .collect())
    }

    fn index_of(&self, name: &str) -> Result<NodeIndex, GcmError> {
        self.node_index
            .get(name)
            .copied()
            .ok_or_else(|| GcmError::UnknownNode(name.to_string()))
    }

    /// DFS reachability: can `to` be reached from `from`?
    fn has_path(&self, from: NodeIndex, to: NodeIndex) -> bool {
        let mut dfs = Dfs::new(&self.graph, from);
        while let Some(idx) = dfs.next(&self.graph) {
            if idx == to {
                return true;
            }
        }
        false
    }
}
