//! Crossover strategies for fixed-length gene sequences.
//!
//! Every operator produces exactly one child of the parents' (equal) length.
//! The first parent is called `lhs` ("self" in the individual API) and the
//! second `rhs`.
//!
//! [`Crossover`] is the plain policy tag stored in configuration. Before use
//! it is resolved against the gene type into a [`CrossoverPlan`], which is
//! where averaging policies pick up the gene's [`NumericOps`]. A non-numeric
//! gene paired with an averaging policy fails at that point, not per call.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use super::types::{Gene, NumericOps};
use crate::error::GaError;

/// Crossover policy.
///
/// # Examples
///
/// ```
/// use u_evolve::ga::Crossover;
///
/// let policy: Crossover = "two_point".parse().unwrap();
/// assert_eq!(policy, Crossover::TwoPoint);
/// assert!(Crossover::UniformAverage.requires_numeric());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    /// Each position comes from either parent with probability 0.5.
    #[default]
    Uniform,
    /// Positions before a random cut come from `lhs`, the rest from `rhs`.
    OnePoint,
    /// Positions between two distinct random cuts come from `rhs`.
    TwoPoint,
    /// Per position: the parents' mean with probability 0.5, else `lhs`.
    /// Numeric genes only.
    UniformAverage,
    /// As [`UniformAverage`](Crossover::UniformAverage) with the mean
    /// weighted by parent fitness. Numeric genes only.
    UniformWeightedAverage,
}

impl Crossover {
    /// All policies, in tag order.
    pub const ALL: [Crossover; 5] = [
        Crossover::Uniform,
        Crossover::OnePoint,
        Crossover::TwoPoint,
        Crossover::UniformAverage,
        Crossover::UniformWeightedAverage,
    ];

    /// Whether the policy needs a numeric gene type.
    pub fn requires_numeric(self) -> bool {
        matches!(
            self,
            Crossover::UniformAverage | Crossover::UniformWeightedAverage
        )
    }

    /// Snake-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Crossover::Uniform => "uniform",
            Crossover::OnePoint => "one_point",
            Crossover::TwoPoint => "two_point",
            Crossover::UniformAverage => "uniform_average",
            Crossover::UniformWeightedAverage => "uniform_weighted_average",
        }
    }

    /// Resolves the policy for gene type `G`.
    ///
    /// # Errors
    /// Returns [`GaError::NonNumericGene`] when an averaging policy is used
    /// with a gene type that has no [`NumericOps`].
    pub fn resolve<G: Gene>(self) -> Result<CrossoverPlan<G>, GaError> {
        let numeric = || {
            G::numeric_ops().ok_or(GaError::NonNumericGene {
                policy: self.name(),
                gene_type: std::any::type_name::<G>(),
            })
        };
        Ok(match self {
            Crossover::Uniform => CrossoverPlan::Uniform,
            Crossover::OnePoint => CrossoverPlan::OnePoint,
            Crossover::TwoPoint => CrossoverPlan::TwoPoint,
            Crossover::UniformAverage => CrossoverPlan::UniformAverage(numeric()?),
            Crossover::UniformWeightedAverage => {
                CrossoverPlan::UniformWeightedAverage(numeric()?)
            }
        })
    }
}

impl fmt::Display for Crossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Crossover {
    type Err = GaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Crossover::ALL
            .into_iter()
            .find(|c| c.name() == normalized || c.name().replace('_', "") == normalized)
            .ok_or_else(|| GaError::UnknownCrossover(s.to_string()))
    }
}

impl TryFrom<u8> for Crossover {
    type Error = GaError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Crossover::ALL
            .get(usize::from(tag))
            .copied()
            .ok_or_else(|| GaError::UnknownCrossover(tag.to_string()))
    }
}

/// A crossover policy resolved against a gene type.
#[derive(Debug, Clone)]
pub enum CrossoverPlan<G> {
    /// See [`Crossover::Uniform`].
    Uniform,
    /// See [`Crossover::OnePoint`].
    OnePoint,
    /// See [`Crossover::TwoPoint`].
    TwoPoint,
    /// See [`Crossover::UniformAverage`].
    UniformAverage(NumericOps<G>),
    /// See [`Crossover::UniformWeightedAverage`].
    UniformWeightedAverage(NumericOps<G>),
}

impl<G: Gene> CrossoverPlan<G> {
    /// The policy tag this plan was resolved from.
    pub fn policy(&self) -> Crossover {
        match self {
            CrossoverPlan::Uniform => Crossover::Uniform,
            CrossoverPlan::OnePoint => Crossover::OnePoint,
            CrossoverPlan::TwoPoint => Crossover::TwoPoint,
            CrossoverPlan::UniformAverage(_) => Crossover::UniformAverage,
            CrossoverPlan::UniformWeightedAverage(_) => Crossover::UniformWeightedAverage,
        }
    }

    /// Produces one child from two parents of equal length.
    ///
    /// Fitness values are only read by the weighted-average policy.
    ///
    /// # Panics
    /// Panics if the parents differ in length.
    #[instrument(level = "trace", skip_all, fields(policy = %self.policy(), len = lhs.len()))]
    pub fn apply<R: Rng>(
        &self,
        lhs: &[G],
        lhs_fitness: f64,
        rhs: &[G],
        rhs_fitness: f64,
        rng: &mut R,
    ) -> Vec<G> {
        assert_eq!(lhs.len(), rhs.len(), "parents must have equal length");
        match self {
            CrossoverPlan::Uniform => uniform(lhs, rhs, rng),
            CrossoverPlan::OnePoint => one_point(lhs, rhs, rng),
            CrossoverPlan::TwoPoint => two_point(lhs, rhs, rng),
            CrossoverPlan::UniformAverage(ops) => uniform_average(lhs, rhs, *ops, rng),
            CrossoverPlan::UniformWeightedAverage(ops) => {
                uniform_weighted_average(lhs, lhs_fitness, rhs, rhs_fitness, *ops, rng)
            }
        }
    }
}

/// Uniform crossover: each position independently from `lhs` or `rhs`.
pub fn uniform<G: Clone, R: Rng>(lhs: &[G], rhs: &[G], rng: &mut R) -> Vec<G> {
    lhs.iter()
        .zip(rhs)
        .map(|(l, r)| if rng.random_bool(0.5) { l.clone() } else { r.clone() })
        .collect()
}

/// One-point crossover with a cut drawn uniformly from `0..len`.
pub fn one_point<G: Clone, R: Rng>(lhs: &[G], rhs: &[G], rng: &mut R) -> Vec<G> {
    if lhs.is_empty() {
        return Vec::new();
    }
    let cut = rng.random_range(0..lhs.len());
    one_point_at(lhs, rhs, cut)
}

/// One-point crossover at a fixed cut: `lhs[..cut]` followed by `rhs[cut..]`.
pub fn one_point_at<G: Clone>(lhs: &[G], rhs: &[G], cut: usize) -> Vec<G> {
    let cut = cut.min(lhs.len());
    let mut child = Vec::with_capacity(lhs.len());
    child.extend_from_slice(&lhs[..cut]);
    child.extend_from_slice(&rhs[cut..]);
    child
}

/// Two-point crossover with two distinct cuts drawn uniformly from `0..len`.
///
/// Sequences shorter than two genes cannot hold two distinct cuts and are
/// cloned from `lhs`.
pub fn two_point<G: Clone, R: Rng>(lhs: &[G], rhs: &[G], rng: &mut R) -> Vec<G> {
    let n = lhs.len();
    if n < 2 {
        return lhs.to_vec();
    }
    let first = rng.random_range(0..n);
    let mut second = rng.random_range(0..n);
    while second == first {
        second = rng.random_range(0..n);
    }
    two_point_at(lhs, rhs, first, second)
}

/// Two-point crossover at fixed cuts.
///
/// With `inner = min(a, b)` and `outer = max(a, b)`, positions in
/// `inner..outer` come from `rhs` and every other position from `lhs`.
pub fn two_point_at<G: Clone>(lhs: &[G], rhs: &[G], a: usize, b: usize) -> Vec<G> {
    let (inner, outer) = if a <= b { (a, b) } else { (b, a) };
    lhs.iter()
        .zip(rhs)
        .enumerate()
        .map(|(i, (l, r))| {
            if (inner..outer).contains(&i) {
                r.clone()
            } else {
                l.clone()
            }
        })
        .collect()
}

/// Uniform average crossover over numeric genes.
pub fn uniform_average<G: Clone, R: Rng>(
    lhs: &[G],
    rhs: &[G],
    ops: NumericOps<G>,
    rng: &mut R,
) -> Vec<G> {
    lhs.iter()
        .zip(rhs)
        .map(|(l, r)| {
            let mean = ((ops.to_f64)(l) + (ops.to_f64)(r)) / 2.0;
            if rng.random_bool(0.5) {
                l.clone()
            } else {
                (ops.from_f64)(mean)
            }
        })
        .collect()
}

/// Fitness-weighted uniform average crossover over numeric genes.
///
/// See [`weighted_mean`] for the zero-weight fallback.
pub fn uniform_weighted_average<G: Clone, R: Rng>(
    lhs: &[G],
    lhs_fitness: f64,
    rhs: &[G],
    rhs_fitness: f64,
    ops: NumericOps<G>,
    rng: &mut R,
) -> Vec<G> {
    lhs.iter()
        .zip(rhs)
        .map(|(l, r)| {
            let mean = weighted_mean((ops.to_f64)(l), lhs_fitness, (ops.to_f64)(r), rhs_fitness);
            if rng.random_bool(0.5) {
                l.clone()
            } else {
                (ops.from_f64)(mean)
            }
        })
        .collect()
}

/// `(a * wa + b * wb) / (wa + wb)`.
///
/// When the weights sum to zero, or the result is not finite, the plain
/// mean `(a + b) / 2` is returned instead.
pub fn weighted_mean(a: f64, wa: f64, b: f64, wb: f64) -> f64 {
    let total = wa + wb;
    let weighted = (a * wa + b * wb) / total;
    if total == 0.0 || !weighted.is_finite() {
        trace!(wa, wb, "degenerate weights, using unweighted mean");
        (a + b) / 2.0
    } else {
        weighted
    }
}
