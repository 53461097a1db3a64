//! Random utility models and reference-cost functions.
//!
//! Both are small, closed sets of variants — three RUM kinds, two
//! reference-cost shapes — so they are modelled as enums with a method
//! table rather than trait objects. An enum match is one indirection
//! cheaper than a vtable call on the hottest loop in the solver (every
//! path, every inner iteration), and closed enumeration means exhaustive
//! matches catch a missing variant at compile time instead of at a
//! `Box<dyn>` call site.

use rsuet_network::EdgeCostModel;

use crate::path::Path;

/// Turns a minimum cost into an upper reference cost (`phi` or `omega` in
/// the driver). Both shapes reduce to "a bit more than the cheapest path".
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferenceCost {
    /// `kappa * minimum_cost`. The common case; `kappa = 1.3` by default.
    TauMin { kappa: f64 },
    /// `minimum_cost + delta`, for networks where cost is near zero and a
    /// multiplicative margin would be too tight.
    MinPlusDelta { delta: f64 },
}

impl ReferenceCost {
    pub fn evaluate(&self, minimum_cost: f64) -> f64 {
        match self {
            ReferenceCost::TauMin { kappa } => kappa * minimum_cost,
            ReferenceCost::MinPlusDelta { delta } => minimum_cost + delta,
        }
    }
}

impl Default for ReferenceCost {
    /// `kappa = 1.3`, the spec's default threshold multiplier.
    fn default() -> Self {
        ReferenceCost::TauMin { kappa: 1.3 }
    }
}

/// A random utility model: the rule that turns a path's generalised cost
/// into a (relative) choice probability.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RandomUtilityModel {
    /// Multinomial logit: `exp(-theta * genCost)`.
    Mnl { theta: f64, beta_time: f64, beta_length: f64 },
    /// Truncated MNL: `exp(-theta * genCost)` below `omega(od)`, else zero.
    Tmnl { theta: f64, beta_time: f64, beta_length: f64, omega: ReferenceCost },
    /// Path-size logit: `PS * exp(-theta * genCost)`.
    Psl { theta: f64, beta_time: f64, beta_length: f64, gamma: f64 },
}

impl RandomUtilityModel {
    pub fn theta(&self) -> f64 {
        match self {
            RandomUtilityModel::Mnl { theta, .. }
            | RandomUtilityModel::Tmnl { theta, .. }
            | RandomUtilityModel::Psl { theta, .. } => *theta,
        }
    }

    pub fn beta_time(&self) -> f64 {
        match self {
            RandomUtilityModel::Mnl { beta_time, .. }
            | RandomUtilityModel::Tmnl { beta_time, .. }
            | RandomUtilityModel::Psl { beta_time, .. } => *beta_time,
        }
    }

    pub fn beta_length(&self) -> f64 {
        match self {
            RandomUtilityModel::Mnl { beta_length, .. }
            | RandomUtilityModel::Tmnl { beta_length, .. }
            | RandomUtilityModel::Psl { beta_length, .. } => *beta_length,
        }
    }

    /// `-genCost`, i.e. `-(betaTime*time + betaLength*length)` along the
    /// path; deterministic utility under any variant since only `genCost`
    /// (not the overlap correction) enters it.
    pub fn deterministic_utility(&self, path: &Path) -> f64 {
        -path.gen_cost
    }

    /// `true` iff this variant needs `Path::ps` kept up to date.
    pub fn needs_path_size(&self) -> bool {
        matches!(self, RandomUtilityModel::Psl { .. })
    }

    /// Overlap exponent `gamma` used by the path-size formula; `0` for
    /// variants that don't use path-size correction (their PS stays `1`).
    pub fn path_size_exponent(&self) -> f64 {
        match self {
            RandomUtilityModel::Psl { gamma, .. } => *gamma,
            _ => 0.0,
        }
    }

    /// The non-negative enumerator of the choice probability, `e_k` in the
    /// spec's notation. `minimum_cost` is the OD's current shortest-path
    /// cost, needed only by the truncated variant to evaluate `omega(od)`.
    pub fn enumerator(&self, path: &Path, minimum_cost: f64) -> f64 {
        match self {
            RandomUtilityModel::Mnl { theta, .. } => (-theta * path.gen_cost).exp(),
            RandomUtilityModel::Tmnl { theta, omega, .. } => {
                if path.gen_cost <= omega.evaluate(minimum_cost) {
                    (-theta * path.gen_cost).exp()
                } else {
                    0.0
                }
            }
            RandomUtilityModel::Psl { theta, .. } => path.ps * (-theta * path.gen_cost).exp(),
        }
    }
}

impl EdgeCostModel for RandomUtilityModel {
    fn beta_time(&self) -> f64 {
        self.beta_time()
    }

    fn beta_length(&self) -> f64 {
        self.beta_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsuet_core::OdIdx;

    fn path_with_cost(cost: f64) -> Path {
        let mut p = Path::new(OdIdx(0), vec![]);
        p.gen_cost = cost;
        p
    }

    #[test]
    fn mnl_enumerator_decreases_with_cost() {
        let rum = RandomUtilityModel::Mnl { theta: 1.0, beta_time: 1.0, beta_length: 0.0 };
        let cheap = rum.enumerator(&path_with_cost(1.0), 1.0);
        let expensive = rum.enumerator(&path_with_cost(5.0), 1.0);
        assert!(cheap > expensive);
    }

    #[test]
    fn tmnl_truncates_above_omega() {
        let rum = RandomUtilityModel::Tmnl {
            theta: 1.0,
            beta_time: 1.0,
            beta_length: 0.0,
            omega: ReferenceCost::TauMin { kappa: 1.3 },
        };
        // minimum_cost = 1.0 -> omega cutoff = 1.3
        assert!(rum.enumerator(&path_with_cost(1.2), 1.0) > 0.0);
        assert_eq!(rum.enumerator(&path_with_cost(1.4), 1.0), 0.0);
    }

    #[test]
    fn psl_scales_by_path_size() {
        let rum = RandomUtilityModel::Psl { theta: 1.0, beta_time: 1.0, beta_length: 0.0, gamma: 1.0 };
        let mut p = path_with_cost(2.0);
        p.ps = 0.5;
        let with_ps = rum.enumerator(&p, 1.0);
        p.ps = 1.0;
        let without = rum.enumerator(&p, 1.0);
        assert!((with_ps - without * 0.5).abs() < 1e-12);
    }
}
