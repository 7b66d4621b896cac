//! Weighted coordinate graph used by the shortest-path solver.
//!
//! Nodes are addressed by [`NodeId`] at the API surface and by dense indices
//! internally; edges are directed, so a symmetric connection is two edges.

pub mod dijkstra;
pub mod frontier;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssignError;
use crate::geo::{haversine_km, road_distance_estimate};
use crate::models::candidate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Origin,
    Resource(Uuid),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Origin => f.write_str("origin"),
            NodeId::Resource(id) => write!(f, "resource:{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Origin,
    Resource,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub workload: u32,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub coordinate: Coordinate,
    pub kind: NodeKind,
    pub attributes: NodeAttributes,
}

impl GraphNode {
    pub fn origin(coordinate: Coordinate) -> Self {
        Self {
            id: NodeId::Origin,
            coordinate,
            kind: NodeKind::Origin,
            attributes: NodeAttributes::default(),
        }
    }

    pub fn resource(id: Uuid, coordinate: Coordinate, attributes: NodeAttributes) -> Self {
        Self {
            id: NodeId::Resource(id),
            coordinate,
            kind: NodeKind::Resource,
            attributes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight_km: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CoordinateGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<Vec<Edge>>,
}

impl CoordinateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every node, then connects each unordered pair with two directed
    /// edges weighted by the estimated road distance.
    pub fn build_fully_connected(
        nodes: impl IntoIterator<Item = GraphNode>,
    ) -> Result<Self, AssignError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node.id, node.coordinate, node.kind, node.attributes)?;
        }

        let count = graph.nodes.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let weight = road_distance_estimate(haversine_km(
                    &graph.nodes[i].coordinate,
                    &graph.nodes[j].coordinate,
                ));
                graph.push_edge(i, j, weight)?;
                graph.push_edge(j, i, weight)?;
            }
        }

        Ok(graph)
    }

    pub fn add_node(
        &mut self,
        id: NodeId,
        coordinate: Coordinate,
        kind: NodeKind,
        attributes: NodeAttributes,
    ) -> Result<usize, AssignError> {
        if self.index.contains_key(&id) {
            return Err(AssignError::DuplicateNode(id));
        }

        let idx = self.nodes.len();
        self.nodes.push(GraphNode {
            id,
            coordinate,
            kind,
            attributes,
        });
        self.adjacency.push(Vec::new());
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Directed; add the reverse edge explicitly for a symmetric connection.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight_km: f64) -> Result<(), AssignError> {
        let from_idx = self.require_index(&from)?;
        let to_idx = self.require_index(&to)?;
        self.push_edge(from_idx, to_idx, weight_km)
    }

    fn push_edge(&mut self, from: usize, to: usize, weight_km: f64) -> Result<(), AssignError> {
        if !weight_km.is_finite() || weight_km < 0.0 {
            return Err(AssignError::InvalidEdgeWeight {
                from,
                to,
                weight: weight_km,
            });
        }

        let edges = self
            .adjacency
            .get_mut(from)
            .ok_or_else(|| AssignError::Internal(format!("edge source index {from} out of range")))?;
        edges.push(Edge {
            from,
            to,
            weight_km,
        });
        Ok(())
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn require_index(&self, id: &NodeId) -> Result<usize, AssignError> {
        self.index_of(id).ok_or(AssignError::UnknownNode(*id))
    }

    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    pub fn node_at(&self, idx: usize) -> Option<&GraphNode> {
        self.nodes.get(idx)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn neighbors(&self, idx: usize) -> &[Edge] {
        self.adjacency.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }
}
