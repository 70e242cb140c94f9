//! Graph input and the adjacency snapshot used by the walker

use std::collections::HashMap;

use petgraph::graph::{Graph, IndexType, NodeIndex};
use petgraph::EdgeType;

/// Integer node identifier. Embedding extraction assumes ids run 0..N.
pub type NodeId = usize;

/// Anything that can be walked: a stable node order plus per-node neighbours.
pub trait WalkGraph {
    /// Node ids in the order walks are generated and stored.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Neighbours reachable in one step from `node`, in a stable order.
    fn neighbor_ids(&self, node: NodeId) -> Vec<NodeId>;

    fn node_count(&self) -> usize {
        self.node_ids().len()
    }
}

/// Undirected graphs report both endpoints, directed graphs report outgoing edges only.
impl<N, E, Ty, Ix> WalkGraph for Graph<N, E, Ty, Ix>
where
    Ty: EdgeType,
    Ix: IndexType,
{
    fn node_ids(&self) -> Vec<NodeId> {
        self.node_indices().map(|idx| idx.index()).collect()
    }

    fn neighbor_ids(&self, node: NodeId) -> Vec<NodeId> {
        if node >= self.node_count() {
            return Vec::new();
        }
        self.neighbors(NodeIndex::new(node))
            .map(|idx| idx.index())
            .collect()
    }

    fn node_count(&self) -> usize {
        Graph::node_count(self)
    }
}

/// Plain adjacency table: entry `i` lists the neighbours of node `i`.
impl WalkGraph for Vec<Vec<NodeId>> {
    fn node_ids(&self) -> Vec<NodeId> {
        (0..self.len()).collect()
    }

    fn neighbor_ids(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node).cloned().unwrap_or_default()
    }

    fn node_count(&self) -> usize {
        self.len()
    }
}

/// Neighbour lists extracted once from a graph.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    order: Vec<NodeId>,
    neighbors: HashMap<NodeId, Vec<NodeId>>,
}

impl Adjacency {
    pub fn from_graph<G: WalkGraph + ?Sized>(graph: &G) -> Self {
        let order = graph.node_ids();
        let neighbors = order
            .iter()
            .map(|&node| (node, graph.neighbor_ids(node)))
            .collect();
        Self { order, neighbors }
    }

    /// Nodes in the graph's iteration order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    /// Neighbours of `node`; empty for dead ends and unknown ids.
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.neighbors.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
