//! The RSUET driver: column generation, threshold pruning, and the MSA
//! inner loop, orchestrated by an explicit outer state machine.

use rsuet_choice::{ChoiceSetManager, RandomUtilityModel, ReferenceCost};
use rsuet_core::{EdgeIdx, NodeIdx, OdIdx, RsuetError};
use rsuet_network::{DijkstraWorkspace, Graph};

use crate::observer::ConvergenceObserver;
use crate::record::{ConvergenceRecord, SolveOutcome, SolveStatus};
use crate::{SolverError, SolverResult};

/// States of the outer driver loop, named exactly as the algorithm is
/// described: `Init -> ColGen -> Prune -> Inner -> Check`, looping back to
/// `ColGen` until `Check` decides `Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DriverState {
    Init,
    ColGen,
    Prune,
    Inner,
    Check,
    Done,
}

/// Owns the network, the restricted choice sets, and the RUM; drives the
/// outer/inner RSUET loop. Build via [`RsuetSolverBuilder`][crate::RsuetSolverBuilder].
pub struct RsuetSolver {
    pub graph: Graph,
    pub choice_sets: ChoiceSetManager,
    pub rum: RandomUtilityModel,
    pub phi: ReferenceCost,
    pub omega: ReferenceCost,
    pub local_cost_ratio: ReferenceCost,
    pub epsilon: f64,
    pub outer_max: u32,
    pub inner_max: u32,
}

impl RsuetSolver {
    /// Run the full RSUET assignment to convergence or `outer_max`.
    pub fn run<O: ConvergenceObserver>(&mut self, observer: &mut O) -> SolverResult<SolveOutcome> {
        let mut state = DriverState::Init;
        let mut outer_iter = 0u32;
        let mut history: Vec<ConvergenceRecord> = Vec::new();
        let mut ws = DijkstraWorkspace::new(self.graph.node_count());

        loop {
            state = match state {
                DriverState::Init => {
                    self.initial_assignment(&mut ws)?;
                    DriverState::ColGen
                }

                DriverState::ColGen => {
                    observer.on_outer_start(outer_iter);
                    self.column_generation(&mut ws)?;
                    self.choice_sets.update_path_costs(&mut self.graph);
                    DriverState::Prune
                }

                DriverState::Prune => {
                    self.prune();
                    DriverState::Inner
                }

                DriverState::Inner => {
                    let inner_iter = self.run_inner_loop(outer_iter, observer)?;
                    let (max_size, avg_size) = self.choice_set_size_stats();
                    let record = ConvergenceRecord {
                        outer_iter,
                        inner_iter,
                        rel_gap_used: self.compute_gap(true),
                        max_choice_set_size: max_size,
                        avg_choice_set_size: avg_size,
                    };
                    history.push(record);
                    observer.on_outer_end(history.last().unwrap());
                    DriverState::Check
                }

                DriverState::Check => {
                    let gap = history.last().unwrap().rel_gap_used;
                    if gap < self.epsilon {
                        DriverState::Done
                    } else if outer_iter + 1 >= self.outer_max {
                        observer.on_solve_end(&history);
                        return Ok(SolveOutcome { status: SolveStatus::NonConvergence, history });
                    } else {
                        outer_iter += 1;
                        DriverState::ColGen
                    }
                }

                DriverState::Done => {
                    observer.on_solve_end(&history);
                    return Ok(SolveOutcome { status: SolveStatus::Converged, history });
                }
            };
        }
    }

    // ── 4.5.1 Initialisation ─────────────────────────────────────────────

    fn initial_assignment(&mut self, ws: &mut DijkstraWorkspace) -> SolverResult<()> {
        self.graph.clear_flows();
        self.graph.update_edge_costs(&self.rum);

        let origins: Vec<(NodeIdx, std::ops::Range<u32>)> = self
            .graph
            .ods_by_origin()
            .map(|(origin, ods)| {
                let start = self.graph.od_indices_for_origin(origin).unwrap().start;
                (origin, start..start + ods.len() as u32)
            })
            .collect();

        for (origin, range) in origins {
            let destinations: Vec<NodeIdx> =
                range.clone().map(|i| self.graph.od(OdIdx(i)).destination).collect();

            // `tree` borrows `self.graph` and `ws`; collect everything we
            // need out of it before touching either mutably below.
            let resolved: Vec<(OdIdx, Option<Vec<EdgeIdx>>)> = {
                let tree = ws.shortest_paths_from(&self.graph, origin, destinations.iter().copied());
                range
                    .clone()
                    .map(|od_index| {
                        let od_idx = OdIdx(od_index);
                        let destination = self.graph.od(od_idx).destination;
                        let edges = tree.is_reachable(destination).then(|| tree.path_to(destination));
                        (od_idx, edges)
                    })
                    .collect()
            };

            for (od_idx, edges) in resolved {
                let Some(path_edges) = edges else {
                    return Err(SolverError::Core(RsuetError::DisconnectedDemand { od: od_idx, origin }));
                };
                let demand = self.graph.od(od_idx).demand;
                self.choice_sets.add_path(od_idx, path_edges.clone());
                self.choice_sets.paths_mut(od_idx)[0]
                    .set_flow(demand)
                    .map_err(SolverError::Core)?;
                self.graph.add_flow_to_path(&path_edges, demand);
            }
        }

        self.graph.update_edge_costs(&self.rum);
        self.choice_sets.update_path_costs(&mut self.graph);
        Ok(())
    }

    // ── 4.5.2 step 1: column generation ──────────────────────────────────

    fn column_generation(&mut self, ws: &mut DijkstraWorkspace) -> SolverResult<()> {
        let origins: Vec<(NodeIdx, std::ops::Range<u32>)> = self
            .graph
            .ods_by_origin()
            .map(|(origin, _)| (origin, self.graph.od_indices_for_origin(origin).unwrap()))
            .collect();

        for (origin, range) in origins {
            let destinations: Vec<NodeIdx> =
                range.clone().map(|i| self.graph.od(OdIdx(i)).destination).collect();

            let resolved: Vec<(OdIdx, Option<Vec<EdgeIdx>>)> = {
                let tree = ws.shortest_paths_from(&self.graph, origin, destinations.iter().copied());
                range
                    .clone()
                    .map(|od_index| {
                        let od_idx = OdIdx(od_index);
                        let destination = self.graph.od(od_idx).destination;
                        let edges = tree.is_reachable(destination).then(|| tree.path_to(destination));
                        (od_idx, edges)
                    })
                    .collect()
            };

            for (od_idx, edges) in resolved {
                let Some(path_edges) = edges else {
                    return Err(SolverError::Core(RsuetError::DisconnectedDemand { od: od_idx, origin }));
                };
                if self.choice_sets.add_path(od_idx, path_edges) {
                    self.graph.od_mut(od_idx).path_added_during_column_generation = true;
                }
            }
        }
        Ok(())
    }

    // ── 4.5.2 step 2: threshold pruning ───────────────────────────────────

    fn prune(&mut self) {
        for od_index in 0..self.graph.od_count() {
            let od_idx = OdIdx(od_index as u32);
            let od = *self.graph.od(od_idx);
            self.choice_sets.prune_above_threshold(od_idx, &self.phi, &self.rum, od.minimum_cost, od.demand);
        }
        self.choice_sets.update_path_costs(&mut self.graph);
    }

    // ── 4.5.3 inner loop ──────────────────────────────────────────────────

    fn run_inner_loop<O: ConvergenceObserver>(&mut self, outer_iter: u32, observer: &mut O) -> SolverResult<u32> {
        for m in 0..self.inner_max {
            let gap = self.inner_iteration(m)?;
            observer.on_inner_iteration(outer_iter, m, gap);
            if gap < self.epsilon {
                return Ok(m);
            }
        }
        Ok(self.inner_max.saturating_sub(1))
    }

    fn inner_iteration(&mut self, m: u32) -> SolverResult<f64> {
        self.graph.update_edge_costs(&self.rum);
        self.choice_sets.update_path_costs(&mut self.graph);

        if self.rum.needs_path_size() {
            for od_index in 0..self.graph.od_count() {
                let od_idx = OdIdx(od_index as u32);
                let min_cost = self.graph.od(od_idx).minimum_cost;
                self.choice_sets.update_path_size_factors(&self.graph, od_idx, &self.rum, min_cost);
            }
        }

        let gamma_m = 1.0 / (m as f64 + 1.0);
        let ods: Vec<rsuet_network::Od> =
            (0..self.graph.od_count()).map(|i| *self.graph.od(OdIdx(i as u32))).collect();
        let rum = &self.rum;
        let local_cost_ratio = &self.local_cost_ratio;

        #[cfg(not(feature = "parallel"))]
        let results: Vec<SolverResult<()>> = self
            .choice_sets
            .restricted_mut()
            .iter_mut()
            .zip(&ods)
            .map(|(paths, od)| update_od_flows(paths, od, rum, local_cost_ratio, gamma_m))
            .collect();

        #[cfg(feature = "parallel")]
        let results: Vec<SolverResult<()>> = {
            use rayon::prelude::*;
            self.choice_sets
                .restricted_mut()
                .par_iter_mut()
                .zip(ods.par_iter())
                .map(|(paths, od)| update_od_flows(paths, od, rum, local_cost_ratio, gamma_m))
                .collect()
        };

        for r in results {
            r?;
        }

        self.load_network();
        Ok(self.compute_gap(false))
    }

    /// `Graph::clear_flows` + re-add every path's flow. Called "loadNetwork"
    /// in the spec; the restricted choice sets own the paths, so this lives
    /// on the driver rather than on `Graph` itself.
    fn load_network(&mut self) {
        self.graph.clear_flows();
        for od_index in 0..self.graph.od_count() {
            let paths = self.choice_sets.paths(OdIdx(od_index as u32));
            for path in paths {
                self.graph.add_flow_to_path(&path.edges, path.flow);
            }
        }
    }

    // ── 4.5.4 gap measures ─────────────────────────────────────────────────

    /// `relGapUsed`. When `use_omega_truncation` is set (the outer
    /// convergence test), the enumerator ignores the configured RUM variant
    /// and instead uses a plain exponential gated by `omega(od)` — the
    /// spec's "unrestricted logit" master problem.
    fn compute_gap(&self, use_omega_truncation: bool) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for od_index in 0..self.graph.od_count() {
            let od_idx = OdIdx(od_index as u32);
            let od = self.graph.od(od_idx);
            let min_cost = od.minimum_cost;
            let paths = self.choice_sets.paths(od_idx);

            let mut transformed = Vec::with_capacity(paths.len());
            let mut min_transformed = f64::INFINITY;

            for path in paths {
                let e = if use_omega_truncation {
                    let cutoff = self.omega.evaluate(min_cost);
                    if path.gen_cost <= cutoff {
                        (-self.rum.theta() * path.gen_cost).exp()
                    } else {
                        0.0
                    }
                } else {
                    self.rum.enumerator(path, min_cost)
                };

                let transformed_cost = if path.flow == 0.0 || e == 0.0 { 0.0 } else { path.flow / e };
                if path.flow > 0.0 && e > 0.0 && transformed_cost < min_transformed {
                    min_transformed = transformed_cost;
                }
                transformed.push((path.flow, e, transformed_cost));
            }

            if !min_transformed.is_finite() {
                continue;
            }
            for (flow, e, transformed_cost) in transformed {
                if flow > 0.0 && e > 0.0 {
                    numerator += flow * (transformed_cost - min_transformed);
                    denominator += flow * transformed_cost;
                }
            }
        }

        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    }

    fn choice_set_size_stats(&self) -> (usize, f64) {
        let od_count = self.graph.od_count();
        if od_count == 0 {
            return (0, 0.0);
        }
        let mut max_size = 0;
        let mut total = 0usize;
        for od_index in 0..od_count {
            let size = self.choice_sets.paths(OdIdx(od_index as u32)).len();
            max_size = max_size.max(size);
            total += size;
        }
        (max_size, total as f64 / od_count as f64)
    }
}

/// One OD's slice of the MSA inner-iteration update: enumerators,
/// probabilities, auxiliary flow, and the flow blend. Free function (rather
/// than a method) so it closes over nothing but its arguments and can run
/// under `rayon::par_iter_mut` without borrowing `RsuetSolver`.
fn update_od_flows(
    paths: &mut [rsuet_choice::Path],
    od: &rsuet_network::Od,
    rum: &RandomUtilityModel,
    local_cost_ratio: &ReferenceCost,
    gamma_m: f64,
) -> SolverResult<()> {
    let local_cutoff = local_cost_ratio.evaluate(od.minimum_cost);

    let enumerators: Vec<f64> = paths
        .iter()
        .map(|p| if p.gen_cost > local_cutoff { 0.0 } else { rum.enumerator(p, od.minimum_cost) })
        .collect();
    let sum_e: f64 = enumerators.iter().sum();
    let n = paths.len();

    for (path, &e) in paths.iter_mut().zip(&enumerators) {
        let prob = if sum_e > 0.0 { e / sum_e } else { 1.0 / n as f64 };
        path.p = prob;
        path.aux_flow = od.demand * prob;
        let new_flow = (1.0 - gamma_m) * path.flow + gamma_m * path.aux_flow;
        path.set_flow(new_flow).map_err(SolverError::Core)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rsuet_choice::RandomUtilityModel;
    use rsuet_core::{Point, RsuetError};
    use rsuet_network::GraphBuilder;

    use crate::builder::RsuetSolverBuilder;
    use crate::observer::NoopObserver;
    use crate::record::SolveStatus;
    use crate::SolverError;

    // Two equal-cost routes 0-1-3 and 0-2-3, demand 10 from 0 to 3.
    fn two_route_diamond() -> rsuet_network::Graph {
        let mut b = GraphBuilder::new();
        let n0 = b.add_node(Point::ORIGIN);
        let n1 = b.add_node(Point::ORIGIN);
        let n2 = b.add_node(Point::ORIGIN);
        let n3 = b.add_node(Point::ORIGIN);
        b.add_edge(n0, n1, 10.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n1, n3, 10.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n0, n2, 10.0, 1.0, 1.0, 0.15, 4.0);
        b.add_edge(n2, n3, 10.0, 1.0, 1.0, 0.15, 4.0);
        b.add_od(n0, n3, 10.0).unwrap();
        b.build()
    }

    #[test]
    fn two_parallel_routes_split_demand_evenly() {
        let graph = two_route_diamond();
        let rum = RandomUtilityModel::Mnl { theta: 0.5, beta_time: 1.0, beta_length: 0.0 };
        let mut solver = RsuetSolverBuilder::new(graph, rum).epsilon(1e-6).build().unwrap();

        let outcome = solver.run(&mut NoopObserver).unwrap();
        assert_eq!(outcome.status, SolveStatus::Converged);

        let paths = solver.choice_sets.paths(rsuet_core::OdIdx(0));
        assert_eq!(paths.len(), 2);
        let total_flow: f64 = paths.iter().map(|p| p.flow).sum();
        assert!((total_flow - 10.0).abs() < 1e-6, "flow must conserve demand, got {total_flow}");
        // Routes are cost-symmetric, so equilibrium splits demand evenly.
        assert!((paths[0].flow - paths[1].flow).abs() < 1e-3);
    }

    #[test]
    fn disconnected_demand_is_a_fatal_error() {
        let mut b = GraphBuilder::new();
        let n0 = b.add_node(Point::ORIGIN);
        let n1 = b.add_node(Point::ORIGIN);
        b.add_od(n0, n1, 5.0).unwrap();
        let graph = b.build();

        let rum = RandomUtilityModel::Mnl { theta: 1.0, beta_time: 1.0, beta_length: 0.0 };
        let mut solver = RsuetSolverBuilder::new(graph, rum).build().unwrap();

        let err = solver.run(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, SolverError::Core(RsuetError::DisconnectedDemand { .. })));
    }

    #[test]
    fn outer_max_of_one_still_returns_a_record() {
        let graph = two_route_diamond();
        let rum = RandomUtilityModel::Mnl { theta: 0.5, beta_time: 1.0, beta_length: 0.0 };
        let mut solver =
            RsuetSolverBuilder::new(graph, rum).outer_max(1).inner_max(5).build().unwrap();

        let outcome = solver.run(&mut NoopObserver).unwrap();
        assert_eq!(outcome.history.len(), 1);
    }
}
