//! Directed graph store and origin-destination table.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** format: given
//! a [`NodeIdx`] `n`, its outgoing edges occupy the slice
//!
//! ```text
//! out_start[n] .. out_start[n + 1]
//! ```
//!
//! of the edge arrays, sorted by tail node. Iteration over a node's outgoing
//! edges is therefore a contiguous scan — the inner loop of Dijkstra never
//! chases a pointer. A `(tail, head) -> EdgeIdx` hash lookup rides alongside
//! the CSR arrays for the O(1) `edge()` contract.
//!
//! ODs are stored sorted by `(origin, destination)` so that iterating the
//! table in natural order already groups every OD by origin, which is what
//! [`crate::dijkstra::shortest_paths_from`] needs to amortise one Dijkstra
//! run per origin with demand.

use std::collections::HashMap;

use rsuet_core::{EdgeIdx, NodeIdx, OdIdx, Point, RsuetError, RsuetResult};

/// BPR volume-delay parameters plus the mutable flow/cost state of one
/// directed edge.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub tail: NodeIdx,
    pub head: NodeIdx,

    pub capacity: f64,
    pub free_flow_time: f64,
    pub length: f64,
    pub b: f64,
    pub power: f64,

    /// Assigned flow. Updated by `Graph::load_network`.
    pub flow: f64,
    /// BPR travel time at `flow`. Updated by `Graph::update_edge_costs`.
    pub time: f64,
    /// Generalised cost used by Dijkstra and choice-set probabilities.
    pub gen_cost: f64,
}

impl Edge {
    fn new(tail: NodeIdx, head: NodeIdx, capacity: f64, length: f64, free_flow_time: f64, b: f64, power: f64) -> Self {
        Self {
            tail,
            head,
            capacity,
            free_flow_time,
            length,
            b,
            power,
            flow: 0.0,
            time: free_flow_time,
            gen_cost: 0.0,
        }
    }

    /// BPR travel time at the edge's current `flow`.
    pub fn bpr_time(&self) -> f64 {
        self.free_flow_time * (1.0 + self.b * (self.flow / self.capacity).powf(self.power))
    }
}

/// Any model that turns travel time and length into a generalised cost.
///
/// Implemented by the random utility models in `rsuet-choice`. Kept as a
/// trait here (rather than pulling `rsuet-choice` in as a dependency) so the
/// graph store has no upward dependency on the choice-set layer.
pub trait EdgeCostModel {
    fn beta_time(&self) -> f64;
    fn beta_length(&self) -> f64;
}

/// A single origin-destination demand entry.
///
/// Owns only what the graph layer is responsible for: the demand itself and
/// the two scalar caches the spec requires to be O(1) after a cost refresh.
/// The restricted and universal choice sets live in `rsuet-choice`, keyed by
/// this OD's [`OdIdx`] — see `DESIGN.md` for why path ownership is split
/// across crates instead of nested inside `Od` as the spec's object diagram
/// draws it.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Od {
    pub origin: NodeIdx,
    pub destination: NodeIdx,
    pub demand: f64,
    pub minimum_cost: f64,
    pub minimum_transformed_cost: f64,
    pub path_added_during_column_generation: bool,
}

impl Od {
    fn new(origin: NodeIdx, destination: NodeIdx, demand: f64) -> Self {
        Self {
            origin,
            destination,
            demand,
            minimum_cost: f64::INFINITY,
            minimum_transformed_cost: f64::INFINITY,
            path_added_during_column_generation: false,
        }
    }
}

/// Directed graph plus OD table.
///
/// Construct via [`GraphBuilder`]; do not assemble the arrays by hand.
pub struct Graph {
    pub node_pos: Vec<Point>,
    has_demand_from: Vec<bool>,
    has_demand_to: Vec<bool>,

    out_start: Vec<u32>,
    edges: Vec<Edge>,
    edge_lookup: HashMap<(NodeIdx, NodeIdx), EdgeIdx>,

    ods: Vec<Od>,
    od_lookup: HashMap<(NodeIdx, NodeIdx), OdIdx>,
    /// `(start, end)` index ranges into `ods` for each origin that has demand,
    /// in ascending origin order. This is the deterministic, origin-grouped
    /// iteration order the spec requires.
    origin_groups: Vec<(NodeIdx, std::ops::Range<usize>)>,
}

impl Graph {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn od_count(&self) -> usize {
        self.ods.len()
    }

    pub fn has_demand_from(&self, node: NodeIdx) -> bool {
        self.has_demand_from[node.index()]
    }

    pub fn has_demand_to(&self, node: NodeIdx) -> bool {
        self.has_demand_to[node.index()]
    }

    // ── Edge access ───────────────────────────────────────────────────────

    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx.index()]
    }

    pub fn edge_mut(&mut self, idx: EdgeIdx) -> &mut Edge {
        &mut self.edges[idx.index()]
    }

    /// O(1) lookup of the edge between `tail` and `head`.
    pub fn edge_between(&self, tail: NodeIdx, head: NodeIdx) -> RsuetResult<EdgeIdx> {
        self.edge_lookup
            .get(&(tail, head))
            .copied()
            .ok_or(RsuetError::NoSuchEdge(tail, head))
    }

    /// Outgoing edges of `node`, as a contiguous slice of `EdgeIdx`.
    #[inline]
    pub fn out_edges(&self, node: NodeIdx) -> impl Iterator<Item = EdgeIdx> + '_ {
        let start = self.out_start[node.index()] as usize;
        let end = self.out_start[node.index() + 1] as usize;
        (start..end).map(EdgeIdx::from_index)
    }

    /// Raw CSR bounds `(start, end)` of `node`'s outgoing `EdgeIdx` range.
    /// Lets callers walk outgoing edges by index without allocating an
    /// iterator adaptor or collecting into a `Vec` — used by the universal
    /// choice-set DFS, which keeps one frame per stack depth.
    #[inline]
    pub fn out_edge_bounds(&self, node: NodeIdx) -> (u32, u32) {
        (self.out_start[node.index()], self.out_start[node.index() + 1])
    }

    /// Outgoing neighbour node ids of `node`.
    pub fn neighbours(&self, node: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.out_edges(node).map(move |e| self.edges[e.index()].head)
    }

    // ── OD access ─────────────────────────────────────────────────────────

    pub fn od(&self, idx: OdIdx) -> &Od {
        &self.ods[idx.index()]
    }

    pub fn od_mut(&mut self, idx: OdIdx) -> &mut Od {
        &mut self.ods[idx.index()]
    }

    /// O(1) lookup; `None` means zero demand between `o` and `d`.
    pub fn od_between(&self, o: NodeIdx, d: NodeIdx) -> Option<OdIdx> {
        self.od_lookup.get(&(o, d)).copied()
    }

    /// Deterministic, origin-grouped iteration over every OD with positive
    /// demand. Each yielded slice shares one origin; origins ascend in
    /// index order.
    pub fn ods_by_origin(&self) -> impl Iterator<Item = (NodeIdx, &[Od])> + '_ {
        self.origin_groups
            .iter()
            .map(move |(origin, range)| (*origin, &self.ods[range.clone()]))
    }

    pub fn od_indices_for_origin(&self, origin: NodeIdx) -> Option<std::ops::Range<u32>> {
        self.origin_groups
            .iter()
            .find(|(o, _)| *o == origin)
            .map(|(_, r)| r.start as u32..r.end as u32)
    }

    // ── Flow / cost maintenance ──────────────────────────────────────────

    /// Reset every edge's `flow` to zero. Callers then add each path's flow
    /// back in (see `rsuet-choice`'s choice-set manager), since paths are
    /// owned outside this crate.
    pub fn clear_flows(&mut self) {
        for edge in &mut self.edges {
            edge.flow = 0.0;
        }
    }

    /// Add `amount` to the flow of every edge in `path`.
    pub fn add_flow_to_path(&mut self, path: &[EdgeIdx], amount: f64) {
        for &e in path {
            self.edges[e.index()].flow += amount;
        }
    }

    /// Recompute `time` and `gen_cost` for every edge from its current flow.
    pub fn update_edge_costs(&mut self, model: &impl EdgeCostModel) {
        let beta_time = model.beta_time();
        let beta_length = model.beta_length();
        for edge in &mut self.edges {
            edge.time = edge.bpr_time();
            edge.gen_cost = beta_time * edge.time + beta_length * edge.length;
        }
    }
}

/// Incremental builder for [`Graph`].
pub struct GraphBuilder {
    nodes: Vec<Point>,
    raw_edges: Vec<Edge>,
    raw_ods: Vec<Od>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new(), raw_ods: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize, ods: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            raw_ods: Vec::with_capacity(ods),
        }
    }

    /// Add a node and return its [`NodeIdx`] (sequential from 0).
    pub fn add_node(&mut self, pos: Point) -> NodeIdx {
        let id = NodeIdx::from_index(self.nodes.len());
        self.nodes.push(pos);
        id
    }

    /// Ensure node indices `0..=max(tail, head)` exist, filling gaps with
    /// `Point::ORIGIN`. TNTP files number nodes 1..N with no separate
    /// declaration step, so the loader discovers node count from edge
    /// references.
    pub fn ensure_node(&mut self, idx: NodeIdx) {
        if idx.index() >= self.nodes.len() {
            self.nodes.resize(idx.index() + 1, Point::ORIGIN);
        }
    }

    pub fn add_edge(
        &mut self,
        tail: NodeIdx,
        head: NodeIdx,
        capacity: f64,
        length: f64,
        free_flow_time: f64,
        b: f64,
        power: f64,
    ) {
        self.ensure_node(tail);
        self.ensure_node(head);
        self.raw_edges.push(Edge::new(tail, head, capacity, length, free_flow_time, b, power));
    }

    /// Add an OD pair with the given `demand`.
    ///
    /// `demand == 0.0` is a silent no-op: a TNTP trips file routinely lists
    /// zero-demand pairs and the spec treats those as "no OD needed" rather
    /// than an error. `demand < 0.0` has no such reading and is rejected at
    /// construction.
    pub fn add_od(&mut self, origin: NodeIdx, destination: NodeIdx, demand: f64) -> RsuetResult<()> {
        if demand < 0.0 {
            return Err(RsuetError::InvalidInput(format!("OD demand must be >= 0, got {demand}")));
        }
        if demand == 0.0 {
            return Ok(());
        }
        self.ensure_node(origin);
        self.ensure_node(destination);
        self.raw_ods.push(Od::new(origin, destination, demand));
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Consume the builder and produce a [`Graph`].
    pub fn build(self) -> Graph {
        let node_count = self.nodes.len();

        let mut raw_edges = self.raw_edges;
        raw_edges.sort_by_key(|e| e.tail.index());

        let mut out_start = vec![0u32; node_count + 1];
        for e in &raw_edges {
            out_start[e.tail.index() + 1] += 1;
        }
        for i in 1..=node_count {
            out_start[i] += out_start[i - 1];
        }

        let mut edge_lookup = HashMap::with_capacity(raw_edges.len());
        for (i, e) in raw_edges.iter().enumerate() {
            edge_lookup.insert((e.tail, e.head), EdgeIdx::from_index(i));
        }

        let mut raw_ods = self.raw_ods;
        raw_ods.sort_by(|a, b| (a.origin.index(), a.destination.index()).cmp(&(b.origin.index(), b.destination.index())));

        let mut od_lookup = HashMap::with_capacity(raw_ods.len());
        let mut has_demand_from = vec![false; node_count];
        let mut has_demand_to = vec![false; node_count];
        for (i, od) in raw_ods.iter().enumerate() {
            od_lookup.insert((od.origin, od.destination), OdIdx::from_index(i));
            has_demand_from[od.origin.index()] = true;
            has_demand_to[od.destination.index()] = true;
        }

        let mut origin_groups: Vec<(NodeIdx, std::ops::Range<usize>)> = Vec::new();
        let mut i = 0;
        while i < raw_ods.len() {
            let origin = raw_ods[i].origin;
            let start = i;
            while i < raw_ods.len() && raw_ods[i].origin == origin {
                i += 1;
            }
            origin_groups.push((origin, start..i));
        }

        Graph {
            node_pos: self.nodes,
            has_demand_from,
            has_demand_to,
            out_start,
            edges: raw_edges,
            edge_lookup,
            ods: raw_ods,
            od_lookup,
            origin_groups,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
