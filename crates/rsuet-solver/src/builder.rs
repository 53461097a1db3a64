//! Fluent builder for constructing an [`RsuetSolver`].

use rsuet_choice::{ChoiceSetManager, RandomUtilityModel, ReferenceCost};
use rsuet_network::Graph;

use crate::{RsuetSolver, SolverError, SolverResult};

/// Fluent builder for [`RsuetSolver`].
///
/// # Required inputs
///
/// - [`Graph`] — the loaded network and OD table
/// - [`RandomUtilityModel`] — the RUM the inner loop samples from
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                                  |
/// |----------------------|-------------------------------------------|
/// | `.phi(r)`            | `ReferenceCost::TauMin { kappa: 1.3 }`     |
/// | `.omega(r)`          | `ReferenceCost::TauMin { kappa: 1.3 }`     |
/// | `.local_cost_ratio(r)` | no additional inner cut (`kappa = INFINITY`) |
/// | `.epsilon(e)`        | `1e-4`                                     |
/// | `.outer_max(n)`      | `100`                                      |
/// | `.inner_max(n)`      | `1000`                                     |
pub struct RsuetSolverBuilder {
    graph: Graph,
    rum: RandomUtilityModel,
    phi: ReferenceCost,
    omega: ReferenceCost,
    local_cost_ratio: ReferenceCost,
    epsilon: f64,
    outer_max: u32,
    inner_max: u32,
}

impl RsuetSolverBuilder {
    pub fn new(graph: Graph, rum: RandomUtilityModel) -> Self {
        Self {
            graph,
            rum,
            phi: ReferenceCost::TauMin { kappa: 1.3 },
            omega: ReferenceCost::TauMin { kappa: 1.3 },
            local_cost_ratio: ReferenceCost::TauMin { kappa: f64::INFINITY },
            epsilon: 1e-4,
            outer_max: 100,
            inner_max: 1000,
        }
    }

    /// Outer-loop pruning threshold (`maximumCostRatio`).
    pub fn phi(mut self, phi: ReferenceCost) -> Self {
        self.phi = phi;
        self
    }

    /// Upper reference cost used by truncating RUM variants and by the
    /// outer convergence test's unrestricted-logit gap.
    pub fn omega(mut self, omega: ReferenceCost) -> Self {
        self.omega = omega;
        self
    }

    /// Tighter inner-loop path admission cut (`localMaximumCostRatio`).
    /// Paths whose `gen_cost` exceeds this get zero probability for one
    /// inner iteration without being removed from the choice set.
    pub fn local_cost_ratio(mut self, local_cost_ratio: ReferenceCost) -> Self {
        self.local_cost_ratio = local_cost_ratio;
        self
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn outer_max(mut self, outer_max: u32) -> Self {
        self.outer_max = outer_max;
        self
    }

    pub fn inner_max(mut self, inner_max: u32) -> Self {
        self.inner_max = inner_max;
        self
    }

    /// Validate inputs and return a ready-to-run [`RsuetSolver`].
    pub fn build(self) -> SolverResult<RsuetSolver> {
        if self.rum.theta() <= 0.0 {
            return Err(SolverError::Config(format!("theta must be > 0, got {}", self.rum.theta())));
        }
        if self.epsilon <= 0.0 {
            return Err(SolverError::Config(format!("epsilon must be > 0, got {}", self.epsilon)));
        }
        if self.outer_max == 0 {
            return Err(SolverError::Config("outer_max must be >= 1".into()));
        }
        if self.inner_max == 0 {
            return Err(SolverError::Config("inner_max must be >= 1".into()));
        }
        if let ReferenceCost::TauMin { kappa } = self.phi {
            if kappa < 1.0 {
                return Err(SolverError::Config(format!("phi's maximumCostRatio must be >= 1, got {kappa}")));
            }
        }

        let choice_sets = ChoiceSetManager::new(self.graph.od_count());

        Ok(RsuetSolver {
            graph: self.graph,
            choice_sets,
            rum: self.rum,
            phi: self.phi,
            omega: self.omega,
            local_cost_ratio: self.local_cost_ratio,
            epsilon: self.epsilon,
            outer_max: self.outer_max,
            inner_max: self.inner_max,
        })
    }
}
