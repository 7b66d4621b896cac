use std::collections::HashMap;

use crate::error::AssignError;
use crate::graph::frontier::Frontier;
use crate::graph::{CoordinateGraph, NodeId};

/// Single-source shortest-path tree over a [`CoordinateGraph`].
///
/// Unreachable nodes keep a distance of `f64::INFINITY` and no predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    source: usize,
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    distances: Vec<f64>,
    predecessors: Vec<Option<usize>>,
    visited: Vec<bool>,
}

impl ShortestPaths {
    fn unsettled(graph: &CoordinateGraph, source: usize) -> Self {
        let n = graph.node_count();
        let ids: Vec<NodeId> = graph.nodes().iter().map(|node| node.id).collect();
        let index = ids.iter().enumerate().map(|(idx, id)| (*id, idx)).collect();

        let mut distances = vec![f64::INFINITY; n];
        distances[source] = 0.0;

        Self {
            source,
            ids,
            index,
            distances,
            predecessors: vec![None; n],
            visited: vec![false; n],
        }
    }

    pub fn source(&self) -> NodeId {
        self.ids[self.source]
    }

    /// `None` for ids that are not in the graph.
    pub fn distance_to(&self, id: &NodeId) -> Option<f64> {
        self.index.get(id).map(|idx| self.distances[*idx])
    }

    pub fn is_visited(&self, id: &NodeId) -> bool {
        self.index.get(id).is_some_and(|idx| self.visited[*idx])
    }

    pub fn predecessor_of(&self, id: &NodeId) -> Option<NodeId> {
        self.index
            .get(id)
            .and_then(|idx| self.predecessors[*idx])
            .map(|pred| self.ids[pred])
    }

    /// Node sequence from the source to `id`, both ends included.
    pub fn path_to(&self, id: &NodeId) -> Option<Vec<NodeId>> {
        let target = *self.index.get(id)?;
        if !self.distances[target].is_finite() {
            return None;
        }

        let mut path = vec![self.ids[target]];
        let mut current = target;
        while let Some(prev) = self.predecessors[current] {
            path.push(self.ids[prev]);
            current = prev;
        }
        path.reverse();
        Some(path)
    }

    pub fn distances(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.ids.iter().copied().zip(self.distances.iter().copied())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|v| **v).count()
    }
}

/// Dijkstra from `source` to every node.
///
/// Exact for non-negative weights, which [`CoordinateGraph`] enforces on insert.
/// On a fully-connected graph the result can still undercut the direct edge by
/// a few ulp: when resources lie almost in line with the source, two rounded
/// hops may sum below the rounded direct weight and the solver takes them.
pub fn shortest_paths(graph: &CoordinateGraph, source: &NodeId) -> Result<ShortestPaths, AssignError> {
    let source_idx = graph.require_index(source)?;
    let mut paths = ShortestPaths::unsettled(graph, source_idx);

    let mut frontier = Frontier::new();
    frontier.push(source_idx, 0.0);

    while let Some(entry) = frontier.pop() {
        let u = entry.node;
        if paths.visited[u] {
            continue;
        }
        paths.visited[u] = true;

        let base = paths.distances[u];
        for edge in graph.neighbors(u) {
            if paths.visited[edge.to] {
                continue;
            }

            let candidate = base + edge.weight_km;
            if candidate < paths.distances[edge.to] {
                paths.distances[edge.to] = candidate;
                paths.predecessors[edge.to] = Some(u);
                frontier.push(edge.to, candidate);
            }
        }
    }

    check_non_negative(&paths)?;
    Ok(paths)
}

fn check_non_negative(paths: &ShortestPaths) -> Result<(), AssignError> {
    for (node, distance) in paths.distances() {
        debug_assert!(distance >= 0.0, "negative distance for {node}");
        if distance < 0.0 || distance.is_nan() {
            return Err(AssignError::NegativeDistance { node, distance });
        }
    }
    Ok(())
}
