use crate::error::{LineageError, Result};
use crate::types::{EdgeKind, MemberId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::debug;

/// A node weight together with the member it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Node<N> {
    pub id: MemberId,
    pub data: N,
}

/// Edge weights that record which operation produced them
pub trait TypedEdge {
    fn kind(&self) -> EdgeKind;
    fn time(&self) -> Option<f64>;
}

/// Directed multigraph keyed by member id, wrapping a petgraph DiGraph.
///
/// Parallel edges between the same ordered pair are kept. Edges are only
/// inserted when both endpoints already exist.
#[derive(Debug, Clone)]
pub struct LineageGraph<N, E> {
    graph: DiGraph<Node<N>, E>,
    node_map: HashMap<MemberId, NodeIndex>,
}

impl<N, E> Default for LineageGraph<N, E> {
    fn default() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }
}

impl<N, E> LineageGraph<N, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns false and leaves the graph untouched when the
    /// id is already present, so identifiers are never reassigned.
    pub fn add_node(&mut self, id: MemberId, data: N) -> bool {
        if self.node_map.contains_key(&id) {
            return false;
        }
        let index = self.graph.add_node(Node { id, data });
        self.node_map.insert(id, index);
        true
    }

    /// Insert an edge if both endpoints exist. Returns whether it was added.
    pub fn add_edge(&mut self, from: MemberId, to: MemberId, edge: E) -> bool {
        match (self.node_map.get(&from), self.node_map.get(&to)) {
            (Some(&from_idx), Some(&to_idx)) => {
                self.graph.add_edge(from_idx, to_idx, edge);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.node_map.contains_key(&id)
    }

    pub fn node(&self, id: MemberId) -> Option<&N> {
        self.node_map
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
            .map(|node| &node.data)
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (MemberId, &N)> + '_ {
        self.graph
            .node_indices()
            .map(move |index| &self.graph[index])
            .map(|node| (node.id, &node.data))
    }

    /// Edges in insertion order as (source, target, weight)
    pub fn edges(&self) -> impl Iterator<Item = (MemberId, MemberId, &E)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].id,
                self.graph[edge.target()].id,
                edge.weight(),
            )
        })
    }

    /// All parallel edges from one member to another
    pub fn edges_between(&self, from: MemberId, to: MemberId) -> Vec<&E> {
        match (self.node_map.get(&from), self.node_map.get(&to)) {
            (Some(&from_idx), Some(&to_idx)) => self
                .graph
                .edges_connecting(from_idx, to_idx)
                .map(|edge| edge.weight())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every member derived from the given one, directly or transitively
    pub fn descendants(&self, id: MemberId) -> Result<Vec<MemberId>> {
        let found = self.reachable(id, Direction::Outgoing)?;
        debug!("Found {} descendants for member {}", found.len(), id);
        Ok(found)
    }

    /// Every member the given one was derived from
    pub fn ancestors(&self, id: MemberId) -> Result<Vec<MemberId>> {
        let found = self.reachable(id, Direction::Incoming)?;
        debug!("Found {} ancestors for member {}", found.len(), id);
        Ok(found)
    }

    /// BFS in one direction. Parallel edges and cycles are visited once.
    fn reachable(&self, id: MemberId, direction: Direction) -> Result<Vec<MemberId>> {
        let start = *self
            .node_map
            .get(&id)
            .ok_or(LineageError::MemberNotFound(id))?;

        let mut visited = HashSet::new();
        let mut found = Vec::new();
        let mut queue = VecDeque::new();

        queue.push_back(start);
        visited.insert(start);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.graph.neighbors_directed(current, direction) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                    found.push(self.graph[neighbor].id);
                }
            }
        }

        Ok(found)
    }

    /// Members with no incoming edges
    pub fn root_nodes(&self) -> Vec<MemberId> {
        self.nodes_without(Direction::Incoming)
    }

    /// Members with no outgoing edges
    pub fn leaf_nodes(&self) -> Vec<MemberId> {
        self.nodes_without(Direction::Outgoing)
    }

    fn nodes_without(&self, direction: Direction) -> Vec<MemberId> {
        self.graph
            .node_indices()
            .filter(|&index| {
                self.graph
                    .neighbors_directed(index, direction)
                    .next()
                    .is_none()
            })
            .map(|index| self.graph[index].id)
            .collect()
    }
}

impl<N, E: TypedEdge> LineageGraph<N, E> {
    pub fn edges_by_kind(&self) -> BTreeMap<EdgeKind, usize> {
        let mut counts: BTreeMap<EdgeKind, usize> =
            EdgeKind::ALL.iter().map(|&kind| (kind, 0)).collect();
        for edge in self.graph.edge_weights() {
            *counts.entry(edge.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Get graph statistics
    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            root_nodes: self.root_nodes().len(),
            leaf_nodes: self.leaf_nodes().len(),
            edges_by_kind: self.edges_by_kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub root_nodes: usize,
    pub leaf_nodes: usize,
    pub edges_by_kind: BTreeMap<EdgeKind, usize>,
}
