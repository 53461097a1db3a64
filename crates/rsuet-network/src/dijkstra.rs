//! Shortest-path engine: early-terminating Dijkstra over generalised cost.
//!
//! `shortest_paths_from` stops as soon as every destination with demand from
//! the given origin has been settled, rather than draining the whole heap —
//! on a network where only a handful of nodes are destinations this is the
//! difference between touching the whole graph and touching a small
//! neighbourhood of it. Correctness depends on edge `gen_cost` being
//! non-negative, which the BPR function always satisfies.

use std::collections::HashSet;

use rsuet_core::{EdgeIdx, NodeIdx};

use crate::graph::Graph;
use crate::heap::IndexedHeap;

/// Reusable scratch buffers for repeated Dijkstra calls against the same
/// graph. Call [`Self::new`] once per graph size and reuse it across every
/// origin in a column-generation pass, instead of reallocating `dist`/`prev`
/// per call.
pub struct DijkstraWorkspace {
    dist: Vec<f64>,
    prev_edge: Vec<EdgeIdx>,
    visited: Vec<bool>,
    heap: IndexedHeap,
}

/// The outcome of one `shortest_paths_from` call: per-node distance and
/// predecessor edge, valid only until the next call reuses the workspace.
pub struct ShortestPathTree<'a> {
    graph: &'a Graph,
    dist: &'a [f64],
    prev_edge: &'a [EdgeIdx],
}

impl DijkstraWorkspace {
    pub fn new(node_count: usize) -> Self {
        Self {
            dist: vec![f64::INFINITY; node_count],
            prev_edge: vec![EdgeIdx::INVALID; node_count],
            visited: vec![false; node_count],
            heap: IndexedHeap::new(node_count),
        }
    }

    /// Run Dijkstra from `origin`, stopping once every node in
    /// `destinations` has been settled.
    pub fn shortest_paths_from<'a>(
        &'a mut self,
        graph: &'a Graph,
        origin: NodeIdx,
        destinations: impl IntoIterator<Item = NodeIdx>,
    ) -> ShortestPathTree<'a> {
        self.dist.iter_mut().for_each(|d| *d = f64::INFINITY);
        self.prev_edge.iter_mut().for_each(|p| *p = EdgeIdx::INVALID);
        self.visited.iter_mut().for_each(|v| *v = false);

        let mut pending: HashSet<NodeIdx> = destinations.into_iter().filter(|&d| d != origin).collect();

        self.dist[origin.index()] = 0.0;
        self.visited[origin.index()] = true;
        pending.remove(&origin);

        self.heap.clear();
        self.heap.insert(origin, 0.0);

        while !pending.is_empty() {
            let Some((u, du)) = self.heap.extract_min() else {
                break;
            };
            self.visited[u.index()] = true;
            pending.remove(&u);

            for edge_idx in graph.out_edges(u) {
                let edge = graph.edge(edge_idx);
                let v = edge.head;
                if self.visited[v.index()] {
                    continue;
                }
                let alt = du + edge.gen_cost;
                if alt < self.dist[v.index()] {
                    self.dist[v.index()] = alt;
                    self.prev_edge[v.index()] = edge_idx;
                    if self.heap.contains(v) {
                        self.heap.decrease_key(v, alt);
                    } else {
                        self.heap.insert(v, alt);
                    }
                }
            }
        }

        ShortestPathTree { graph, dist: &self.dist, prev_edge: &self.prev_edge }
    }
}

impl<'a> ShortestPathTree<'a> {
    pub fn distance_to(&self, node: NodeIdx) -> f64 {
        self.dist[node.index()]
    }

    pub fn is_reachable(&self, node: NodeIdx) -> bool {
        self.dist[node.index()].is_finite()
    }

    /// Reconstruct the edge sequence from the tree's origin to `destination`,
    /// in tail-to-head order. Empty if `destination` is unreachable.
    pub fn path_to(&self, destination: NodeIdx) -> Vec<EdgeIdx> {
        if !self.is_reachable(destination) {
            return Vec::new();
        }
        let mut edges = Vec::new();
        let mut cur = destination;
        loop {
            let e = self.prev_edge[cur.index()];
            if !e.is_valid() {
                break;
            }
            edges.push(e);
            cur = self.graph.edge(e).tail;
        }
        edges.reverse();
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use rsuet_core::Point;

    fn line_graph() -> Graph {
        // 0 -> 1 -> 2, plus a direct 0 -> 2 that is more expensive.
        let mut b = GraphBuilder::new();
        let n0 = b.add_node(Point::ORIGIN);
        let n1 = b.add_node(Point::ORIGIN);
        let n2 = b.add_node(Point::ORIGIN);
        b.add_edge(n0, n1, 100.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n1, n2, 100.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n0, n2, 100.0, 1.0, 5.0, 0.15, 4.0);
        let mut g = b.build();
        for e in 0..g.edge_count() {
            let idx = EdgeIdx(e as u32);
            g.edge_mut(idx).gen_cost = g.edge(idx).free_flow_time;
        }
        g
    }

    #[test]
    fn finds_cheapest_path_over_direct_edge() {
        let g = line_graph();
        let mut ws = DijkstraWorkspace::new(g.node_count());
        let tree = ws.shortest_paths_from(&g, NodeIdx(0), [NodeIdx(2)]);
        assert_eq!(tree.distance_to(NodeIdx(2)), 2.0);
        assert_eq!(tree.path_to(NodeIdx(2)), vec![EdgeIdx(0), EdgeIdx(1)]);
    }

    #[test]
    fn unreachable_destination_has_empty_path() {
        let mut b = GraphBuilder::new();
        let n0 = b.add_node(Point::ORIGIN);
        let n1 = b.add_node(Point::ORIGIN);
        b.add_edge(n0, n0, 1.0, 1.0, 1.0, 0.15, 4.0); // self-loop only
        let g = b.build();
        let mut ws = DijkstraWorkspace::new(g.node_count());
        let tree = ws.shortest_paths_from(&g, n0, [n1]);
        assert!(!tree.is_reachable(n1));
        assert!(tree.path_to(n1).is_empty());
    }
}
