//! A path: an ordered, acyclic edge chain on one OD, plus the scalar state
//! the solver's inner loop carries on it between iterations.

use rsuet_core::{EdgeIdx, OdIdx, RsuetError, RsuetResult};
use rsuet_network::Graph;

/// One path in an OD's choice set.
///
/// Edges are the only owned identity; `od` is a back-reference by index
/// rather than a pointer, so a `Path` can be cloned and moved freely without
/// touching the graph it was built from.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub od: OdIdx,
    pub edges: Vec<EdgeIdx>,

    pub gen_cost: f64,
    pub length: f64,

    pub flow: f64,
    pub aux_flow: f64,
    pub p: f64,
    /// Path-size (overlap) factor. `1.0` until a PSL random utility model
    /// recomputes it; a path with no overlap with any sibling has `PS = 1`.
    pub ps: f64,
    pub transformed_cost: f64,

    pub marked_for_removal: bool,
}

impl Path {
    pub fn new(od: OdIdx, edges: Vec<EdgeIdx>) -> Self {
        Self {
            od,
            edges,
            gen_cost: 0.0,
            length: 0.0,
            flow: 0.0,
            aux_flow: 0.0,
            p: 0.0,
            ps: 1.0,
            transformed_cost: 0.0,
            marked_for_removal: false,
        }
    }

    /// Two paths on the same OD are equal iff their edge sequences match.
    pub fn same_route(&self, edges: &[EdgeIdx]) -> bool {
        self.edges == edges
    }

    /// Recompute `gen_cost` and `length` by summing over the graph's current
    /// edge state. Must be called after every `Graph::update_edge_costs`.
    pub fn refresh_costs(&mut self, graph: &Graph) {
        self.gen_cost = self.edges.iter().map(|&e| graph.edge(e).gen_cost).sum();
        self.length = self.edges.iter().map(|&e| graph.edge(e).length).sum();
    }

    /// `transformed_cost = flow / enumerator`, defined as `0` when `flow` is
    /// zero — matches the spec's convention so that zero-flow paths never
    /// contribute to the gap measures.
    pub fn set_transformed_cost(&mut self, enumerator: f64) {
        self.transformed_cost = if self.flow == 0.0 { 0.0 } else { self.flow / enumerator };
    }

    /// Set `flow`, rejecting NaN/Inf. MSA flow updates must never silently
    /// carry a numeric failure into the next iteration's cost refresh.
    pub fn set_flow(&mut self, flow: f64) -> RsuetResult<()> {
        if !flow.is_finite() {
            return Err(RsuetError::NumericFailure(format!(
                "non-finite flow {flow} on OD {}",
                self.od
            )));
        }
        self.flow = flow;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_route_compares_edge_sequence() {
        let p = Path::new(OdIdx(0), vec![EdgeIdx(1), EdgeIdx(2)]);
        assert!(p.same_route(&[EdgeIdx(1), EdgeIdx(2)]));
        assert!(!p.same_route(&[EdgeIdx(2), EdgeIdx(1)]));
    }

    #[test]
    fn zero_flow_has_zero_transformed_cost() {
        let mut p = Path::new(OdIdx(0), vec![EdgeIdx(0)]);
        p.flow = 0.0;
        p.set_transformed_cost(0.5);
        assert_eq!(p.transformed_cost, 0.0);
    }
}
