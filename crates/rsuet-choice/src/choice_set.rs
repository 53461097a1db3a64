//! Per-OD choice sets: membership, cost refresh, path-size factors, and
//! threshold pruning with flow redistribution.

use rsuet_core::{EdgeIdx, NodeIdx, OdIdx};
use rsuet_network::Graph;

use crate::path::Path;
use crate::rum::{RandomUtilityModel, ReferenceCost};

/// Owns every OD's restricted choice set.
///
/// Paths reference their edges by [`EdgeIdx`] and their OD by [`OdIdx`];
/// the manager never borrows the [`Graph`] across calls, so the driver is
/// free to interleave graph mutation (flow, cost refresh) with choice-set
/// mutation (add, prune) in whatever order the outer loop needs.
pub struct ChoiceSetManager {
    restricted: Vec<Vec<Path>>,
}

impl ChoiceSetManager {
    pub fn new(od_count: usize) -> Self {
        Self { restricted: vec![Vec::new(); od_count] }
    }

    pub fn paths(&self, od: OdIdx) -> &[Path] {
        &self.restricted[od.index()]
    }

    pub fn paths_mut(&mut self, od: OdIdx) -> &mut Vec<Path> {
        &mut self.restricted[od.index()]
    }

    /// Every OD's path vector, indexed in `OdIdx` order. Lets the driver's
    /// inner loop iterate (or `rayon::par_iter_mut`) over all restricted
    /// choice sets at once without borrowing the manager per OD.
    pub fn restricted_mut(&mut self) -> &mut [Vec<Path>] {
        &mut self.restricted
    }

    /// Append `edges` as a new path of `od` unless an existing member has
    /// the identical edge sequence. Returns `true` iff a path was added.
    pub fn add_path(&mut self, od: OdIdx, edges: Vec<EdgeIdx>) -> bool {
        let set = &mut self.restricted[od.index()];
        if set.iter().any(|p| p.same_route(&edges)) {
            return false;
        }
        set.push(Path::new(od, edges));
        true
    }

    /// Refresh `gen_cost`/`length` on every path from the graph's current
    /// edge state, then refresh `graph.od(od).minimum_cost`.
    pub fn update_path_costs(&mut self, graph: &mut Graph) {
        for od_idx in 0..self.restricted.len() {
            let set = &mut self.restricted[od_idx];
            let mut min_cost = f64::INFINITY;
            for path in set.iter_mut() {
                path.refresh_costs(graph);
                if path.gen_cost < min_cost {
                    min_cost = path.gen_cost;
                }
            }
            if !set.is_empty() {
                graph.od_mut(OdIdx(od_idx as u32)).minimum_cost = min_cost;
            }
        }
    }

    /// Recompute path-size (overlap) factors for `od` under `rum`. A no-op
    /// for variants that don't use path-size correction.
    ///
    /// `PS_k = Σ_{a∈k} (genCost_a / genCost_k) / Σ_{j∈R'} δ_{a,j}·(L_min/L_j)^γ`
    /// — each edge's contribution is weighted by its own share of `k`'s cost,
    /// not split evenly across `k`'s edges, so `graph` is needed to look up
    /// `edge.gen_cost` per edge.
    pub fn update_path_size_factors(&mut self, graph: &Graph, od: OdIdx, rum: &RandomUtilityModel, minimum_cost: f64) {
        if !rum.needs_path_size() {
            return;
        }
        let gamma = rum.path_size_exponent();
        let set = &mut self.restricted[od.index()];
        let n = set.len();
        if n == 0 {
            return;
        }

        // Overlap weights (L_min / L_j)^gamma, one per path, computed once.
        let weight: Vec<f64> = set.iter().map(|p| (minimum_cost / p.gen_cost).powf(gamma)).collect();

        for k in 0..n {
            if set[k].gen_cost == 0.0 || set[k].edges.is_empty() {
                set[k].ps = 1.0;
                continue;
            }
            let mut ps = 0.0;
            for &edge in &set[k].edges {
                let denom: f64 = (0..n).filter(|&j| set[j].edges.contains(&edge)).map(|j| weight[j]).sum();
                if denom > 0.0 {
                    let len_a = graph.edge(edge).gen_cost;
                    ps += (len_a / set[k].gen_cost) / denom;
                }
            }
            set[k].ps = ps;
        }
    }

    /// Remove paths whose `gen_cost` exceeds `phi(minimum_cost)`, redistributing
    /// their flow across the kept set proportional to `rum`'s enumerator.
    /// If every path would be removed, the cheapest removed path is restored
    /// and receives the OD's full demand so `sum(flow) == demand` still holds.
    pub fn prune_above_threshold(
        &mut self,
        od: OdIdx,
        phi: &ReferenceCost,
        rum: &RandomUtilityModel,
        minimum_cost: f64,
        demand: f64,
    ) {
        let set = &mut self.restricted[od.index()];
        if set.is_empty() {
            return;
        }
        let threshold = phi.evaluate(minimum_cost);

        let (mut kept, mut removed): (Vec<Path>, Vec<Path>) =
            set.drain(..).partition(|p| p.gen_cost <= threshold);

        if removed.is_empty() {
            *set = kept;
            return;
        }

        if kept.is_empty() {
            let mut cheapest = removed.remove(0);
            for candidate in removed {
                if candidate.gen_cost < cheapest.gen_cost {
                    cheapest = candidate;
                }
            }
            cheapest.flow = demand;
            *set = vec![cheapest];
            return;
        }

        let removed_flow: f64 = removed.iter().map(|p| p.flow).sum();
        let enumerators: Vec<f64> = kept.iter().map(|p| rum.enumerator(p, minimum_cost)).collect();
        let sum_e: f64 = enumerators.iter().sum();

        if sum_e > 0.0 {
            for (path, e) in kept.iter_mut().zip(&enumerators) {
                path.flow += removed_flow * e / sum_e;
            }
        } else {
            let share = removed_flow / kept.len() as f64;
            for path in kept.iter_mut() {
                path.flow += share;
            }
        }

        *set = kept;
    }
}

// ── Universal choice set (diagnostic only) ─────────────────────────────────

/// Depth-first enumeration of every acyclic path from `origin` to
/// `destination` whose running cost never exceeds `cost_limit`.
///
/// Iterative by construction: a recursive version would clone (or
/// copy-on-write) the visited vector at every call depth, which turns a
/// network-sized enumeration into a network-sized-squared one. Instead a
/// single `visited` bitset is threaded through an explicit frame stack,
/// flipped `true` when a node is pushed and back to `false` when its frame
/// is popped — the same toggle a recursive call's stack frame would give
/// you for free, without the per-frame allocation.
///
/// Exponential in the worst case; intended for diagnostics on small
/// networks, not for use inside the solver's hot path.
pub fn generate_universal_choice_set(
    graph: &Graph,
    origin: NodeIdx,
    destination: NodeIdx,
    cost_limit: f64,
) -> Vec<Vec<EdgeIdx>> {
    struct Frame {
        node: NodeIdx,
        next_edge: u32,
        end_edge: u32,
    }

    let mut results = Vec::new();
    let mut visited = vec![false; graph.node_count()];
    let mut path_edges: Vec<EdgeIdx> = Vec::new();
    let mut path_cost: Vec<f64> = Vec::new();

    let (start, end) = graph.out_edge_bounds(origin);
    let mut stack = vec![Frame { node: origin, next_edge: start, end_edge: end }];
    visited[origin.index()] = true;

    while let Some(frame) = stack.last_mut() {
        if frame.next_edge >= frame.end_edge {
            let node = frame.node;
            stack.pop();
            visited[node.index()] = false;
            if !path_edges.is_empty() {
                path_edges.pop();
                path_cost.pop();
            }
            continue;
        }

        let edge_idx = EdgeIdx(frame.next_edge);
        frame.next_edge += 1;

        let edge = graph.edge(edge_idx);
        let next = edge.head;
        if visited[next.index()] {
            continue;
        }
        let running_cost = path_cost.last().copied().unwrap_or(0.0) + edge.gen_cost;
        if running_cost > cost_limit {
            continue;
        }

        path_edges.push(edge_idx);
        path_cost.push(running_cost);

        if next == destination {
            results.push(path_edges.clone());
            path_edges.pop();
            path_cost.pop();
            continue;
        }

        visited[next.index()] = true;
        let (s, e) = graph.out_edge_bounds(next);
        stack.push(Frame { node: next, next_edge: s, end_edge: e });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsuet_core::Point;
    use rsuet_network::GraphBuilder;

    fn diamond() -> Graph {
        // 0 -> 1 -> 3 and 0 -> 2 -> 3, both cost 2; a longer 0->1->2->3 exists too.
        let mut b = GraphBuilder::new();
        let n0 = b.add_node(Point::ORIGIN);
        let n1 = b.add_node(Point::ORIGIN);
        let n2 = b.add_node(Point::ORIGIN);
        let n3 = b.add_node(Point::ORIGIN);
        b.add_edge(n0, n1, 10.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n1, n3, 10.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n0, n2, 10.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n2, n3, 10.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n1, n2, 10.0, 1.0, 0.1, 0.15, 4.0);
        b.add_od(n0, n3, 10.0).unwrap();
        let mut g = b.build();
        for i in 0..g.edge_count() {
            let idx = EdgeIdx(i as u32);
            g.edge_mut(idx).gen_cost = g.edge(idx).free_flow_time;
        }
        g
    }

    #[test]
    fn add_path_deduplicates_by_edge_sequence() {
        let mut mgr = ChoiceSetManager::new(1);
        assert!(mgr.add_path(OdIdx(0), vec![EdgeIdx(0), EdgeIdx(1)]));
        assert!(!mgr.add_path(OdIdx(0), vec![EdgeIdx(0), EdgeIdx(1)]));
        assert!(mgr.add_path(OdIdx(0), vec![EdgeIdx(2), EdgeIdx(3)]));
        assert_eq!(mgr.paths(OdIdx(0)).len(), 2);
    }

    #[test]
    fn pruning_redistributes_flow_to_kept_paths() {
        let mut g = diamond();
        let mut mgr = ChoiceSetManager::new(1);
        mgr.add_path(OdIdx(0), vec![EdgeIdx(0), EdgeIdx(1)]); // 0-1-3, cost 2
        mgr.add_path(OdIdx(0), vec![EdgeIdx(0), EdgeIdx(4), EdgeIdx(3)]); // 0-1-2-3, cost 2.1
        mgr.update_path_costs(&mut g);
        {
            let set = mgr.paths_mut(OdIdx(0));
            set[0].flow = 6.0;
            set[1].flow = 4.0;
        }
        let rum = RandomUtilityModel::Mnl { theta: 1.0, beta_time: 1.0, beta_length: 0.0 };
        // threshold = 1.0 * minimum_cost (2.0) = 2.0, so the 2.1-cost path is pruned.
        mgr.prune_above_threshold(OdIdx(0), &ReferenceCost::TauMin { kappa: 1.0 }, &rum, 2.0, 10.0);
        let set = mgr.paths(OdIdx(0));
        assert_eq!(set.len(), 1);
        assert!((set[0].flow - 10.0).abs() < 1e-9);
    }

    #[test]
    fn path_size_factor_weights_by_edge_cost_share() {
        let mut g = diamond();
        let mut mgr = ChoiceSetManager::new(1);
        // Two disjoint routes of equal cost: no edge overlap, so PS should
        // come out to 1.0 for both regardless of edge-cost weighting.
        mgr.add_path(OdIdx(0), vec![EdgeIdx(0), EdgeIdx(1)]); // 0-1-3, cost 2
        mgr.add_path(OdIdx(0), vec![EdgeIdx(2), EdgeIdx(3)]); // 0-2-3, cost 2
        mgr.update_path_costs(&mut g);
        let rum = RandomUtilityModel::Psl { theta: 1.0, beta_time: 1.0, beta_length: 0.0, gamma: 1.0 };
        mgr.update_path_size_factors(&g, OdIdx(0), &rum, 2.0);
        let set = mgr.paths(OdIdx(0));
        assert!((set[0].ps - 1.0).abs() < 1e-9);
        assert!((set[1].ps - 1.0).abs() < 1e-9);
    }

    #[test]
    fn path_size_factor_is_below_one_under_overlap() {
        let mut g = diamond();
        let mut mgr = ChoiceSetManager::new(1);
        // Two overlapping routes sharing edge 0 (0->1): 0-1-3 and 0-1-2-3.
        mgr.add_path(OdIdx(0), vec![EdgeIdx(0), EdgeIdx(1)]); // cost 2
        mgr.add_path(OdIdx(0), vec![EdgeIdx(0), EdgeIdx(4), EdgeIdx(3)]); // cost 2.1
        mgr.update_path_costs(&mut g);
        let rum = RandomUtilityModel::Psl { theta: 1.0, beta_time: 1.0, beta_length: 0.0, gamma: 1.0 };
        mgr.update_path_size_factors(&g, OdIdx(0), &rum, 2.0);
        let set = mgr.paths(OdIdx(0));
        assert!(set[0].ps < 1.0);
        assert!(set[1].ps < 1.0);
    }

    #[test]
    fn universal_choice_set_finds_both_diamond_routes() {
        let g = diamond();
        let n0 = NodeIdx(0);
        let n3 = NodeIdx(3);
        let paths = generate_universal_choice_set(&g, n0, n3, 10.0);
        assert!(paths.len() >= 2);
        assert!(paths.iter().all(|p| !p.is_empty()));
    }
}
