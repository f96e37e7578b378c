//! Selection strategies for the GA.
//!
//! Selection picks one parent per call from a population that has already
//! been evaluated and ranked, i.e. sorted by fitness in **descending** order
//! (index 0 is the fittest). Higher fitness is better.
//!
//! None of the strategies reorder the population; rank selection derives
//! rank weights from the existing order instead of re-sorting.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::individual::Individual;
use crate::error::GaError;

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_evolve::ga::Selection;
///
/// let sel = Selection::tournament();
/// assert_eq!(sel, Selection::Tournament { size: 4, pressure: 0.6 });
///
/// let sel: Selection = "rank".parse().unwrap();
/// assert_eq!(sel, Selection::Rank);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Requires a positive fitness sum. When the sum is zero, negative or
    /// not finite, the draw is reused as a uniform pick.
    ///
    /// # Complexity
    /// O(n) per selection
    #[default]
    Proportional,

    /// Linear rank selection.
    ///
    /// The least fit individual has weight 1, the fittest weight `n`.
    ///
    /// # Complexity
    /// O(n) per selection
    Rank,

    /// Tournament selection with probabilistic acceptance.
    ///
    /// `size` candidates are drawn with replacement and ordered by fitness.
    /// Starting from the best, each candidate except the weakest is accepted
    /// with probability `pressure`; the weakest is the final fallback.
    ///
    /// # Complexity
    /// O(k log k) per selection
    Tournament {
        /// Number of candidates per tournament (at least 1).
        size: usize,
        /// Acceptance probability per candidate (0.0–1.0).
        pressure: f64,
    },

    /// Uniform random selection, ignoring fitness.
    Random,
}

impl Selection {
    /// Default number of tournament candidates.
    pub const TOURNAMENT_SIZE: usize = 4;

    /// Default tournament acceptance probability.
    pub const TOURNAMENT_PRESSURE: f64 = 0.6;

    /// Tournament selection with the default size and pressure.
    pub fn tournament() -> Self {
        Selection::Tournament {
            size: Self::TOURNAMENT_SIZE,
            pressure: Self::TOURNAMENT_PRESSURE,
        }
    }

    /// Snake-case name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Selection::Proportional => "proportional",
            Selection::Rank => "rank",
            Selection::Tournament { .. } => "tournament",
            Selection::Random => "random",
        }
    }

    /// Checks the tournament parameters.
    ///
    /// # Errors
    /// Returns [`GaError::InvalidConfig`] for a zero tournament size or a
    /// pressure outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), GaError> {
        if let Selection::Tournament { size, pressure } = *self {
            if size == 0 {
                return Err(GaError::InvalidConfig(
                    "tournament size must be at least 1".into(),
                ));
            }
            if !(0.0..=1.0).contains(&pressure) {
                return Err(GaError::InvalidConfig(format!(
                    "tournament pressure must be in [0, 1], got {pressure}"
                )));
            }
        }
        Ok(())
    }

    /// Selects a parent index from a ranked population.
    ///
    /// `fitness_sum` is the sum of all fitness values from the latest
    /// evaluation; only proportional selection reads it.
    ///
    /// # Panics
    /// Panics if `ranked` is empty.
    pub fn select<G, R: Rng>(&self, ranked: &[Individual<G>], fitness_sum: f64, rng: &mut R) -> usize {
        assert!(!ranked.is_empty(), "cannot select from empty population");

        match *self {
            Selection::Proportional => proportional(ranked, fitness_sum, rng),
            Selection::Rank => rank(ranked.len(), rng),
            Selection::Tournament { size, pressure } => tournament(ranked, size, pressure, rng),
            Selection::Random => rng.random_range(0..ranked.len()),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Tournament { size, pressure } => {
                write!(f, "tournament(size={size}, pressure={pressure})")
            }
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Selection {
    type Err = GaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proportional" | "roulette" => Ok(Selection::Proportional),
            "rank" => Ok(Selection::Rank),
            "tournament" => Ok(Selection::tournament()),
            "random" => Ok(Selection::Random),
            _ => Err(GaError::UnknownSelection(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Selection {
    type Error = GaError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Selection::Proportional),
            1 => Ok(Selection::Rank),
            2 => Ok(Selection::tournament()),
            3 => Ok(Selection::Random),
            _ => Err(GaError::UnknownSelection(tag.to_string())),
        }
    }
}

/// Roulette wheel over the ranked order.
fn proportional<G, R: Rng>(ranked: &[Individual<G>], fitness_sum: f64, rng: &mut R) -> usize {
    let n = ranked.len();
    let draw: f64 = rng.random();

    if !(fitness_sum.is_finite() && fitness_sum > 0.0) {
        trace!(fitness_sum, "degenerate fitness sum, selecting uniformly");
        return ((draw * n as f64) as usize).min(n - 1);
    }

    let mut remaining = draw * fitness_sum;
    for (i, individual) in ranked.iter().enumerate() {
        if remaining < individual.fitness() {
            return i;
        }
        remaining -= individual.fitness();
    }

    n - 1 // floating-point fallback
}

/// Linear rank wheel; ascending rank `j` sits at descending index `n - 1 - j`.
fn rank<R: Rng>(n: usize, rng: &mut R) -> usize {
    let total = n * (n + 1) / 2;
    let target = rng.random_range(0..total);

    let mut wheel = 0;
    for j in 0..n {
        wheel += j + 1;
        if target < wheel {
            return n - 1 - j;
        }
    }

    0
}

fn tournament<G, R: Rng>(ranked: &[Individual<G>], size: usize, pressure: f64, rng: &mut R) -> usize {
    let n = ranked.len();
    let mut candidates: Vec<usize> = (0..size.max(1)).map(|_| rng.random_range(0..n)).collect();

    // Weakest first.
    candidates.sort_by(|&a, &b| ranked[a].fitness().total_cmp(&ranked[b].fitness()));

    for &candidate in candidates[1..].iter().rev() {
        if rng.random::<f64>() < pressure {
            return candidate;
        }
    }
    candidates[0]
}
