//! GA configuration.
//!
//! [`GaConfig`] holds all parameters of an engine instance. It is validated
//! once when the engine is built and never changes afterwards.

use serde::{Deserialize, Serialize};

use super::crossover::Crossover;
use super::selection::Selection;
use crate::error::GaError;

/// Configuration for the genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_evolve::ga::{Crossover, GaConfig, Selection};
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 200);
/// assert_eq!(config.selection, Selection::Proportional);
/// assert_eq!(config.crossover, Crossover::Uniform);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::ga::{Crossover, GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(50)
///     .with_gene_length(32)
///     .with_selection(Selection::tournament())
///     .with_crossover(Crossover::TwoPoint)
///     .with_elitism(0.1)
///     .with_mutation_rate(0.02);
/// assert_eq!(config.elite_count(), 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Number of genes per individual.
    pub gene_length: usize,

    /// Elitism: values below 1.0 are a fraction of the population size,
    /// values of 1.0 and above an absolute count.
    ///
    /// The fraction is multiplied by the population size and then truncated,
    /// so `0.1` with 50 individuals keeps 5 elites. See
    /// [`elite_count`](GaConfig::elite_count).
    pub elitism: f64,

    /// Selection strategy for choosing parents.
    pub selection: Selection,

    /// Crossover policy for sexual reproduction.
    pub crossover: Crossover,

    /// Probability of sexual reproduction per offspring (0.0–1.0).
    ///
    /// Otherwise the first parent is cloned.
    pub crossover_rate: f64,

    /// Per-gene probability of replacement by a fresh random gene (0.0–1.0).
    pub mutation_rate: f64,

    /// Maximum number of generations for [`run`](super::GeneticAlgorithm::run).
    pub max_generations: usize,

    /// Generations without improvement before `run` stops.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,

    /// `run` stops once the best fitness reaches this value.
    pub target_fitness: Option<f64>,

    /// Whether to evaluate fitness in parallel (requires the `parallel`
    /// feature; ignored otherwise).
    pub parallel: bool,

    /// Random seed used by [`GeneticAlgorithm::seeded`](super::GeneticAlgorithm::seeded).
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            gene_length: 0,
            elitism: 1.0,
            selection: Selection::default(),
            crossover: Crossover::default(),
            crossover_rate: 1.0,
            mutation_rate: 0.01,
            max_generations: 1000,
            stagnation_limit: 0,
            target_fitness: None,
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of genes per individual.
    pub fn with_gene_length(mut self, n: usize) -> Self {
        self.gene_length = n;
        self
    }

    /// Sets the elitism value (fraction below 1.0, count from 1.0).
    pub fn with_elitism(mut self, elitism: f64) -> Self {
        self.elitism = elitism;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Sets the crossover policy.
    pub fn with_crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = crossover;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the fitness at which `run` stops.
    pub fn with_target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = Some(target);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites carried over unchanged each generation.
    ///
    /// Fractions are applied as `floor(elitism * population_size)`; counts
    /// are truncated. The result never exceeds the population size.
    pub fn elite_count(&self) -> usize {
        let elitism = self.elitism.max(0.0);
        let count = if elitism < 1.0 {
            (elitism * self.population_size as f64).floor() as usize
        } else {
            elitism as usize
        };
        count.min(self.population_size)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`GaError::InvalidConfig`] describing the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<(), GaError> {
        if !self.elitism.is_finite() || self.elitism < 0.0 {
            return Err(GaError::InvalidConfig(format!(
                "elitism must be a non-negative number, got {}",
                self.elitism
            )));
        }
        check_rate("crossover_rate", self.crossover_rate)?;
        check_rate("mutation_rate", self.mutation_rate)?;
        self.selection.validate()?;
        if self.crossover == Crossover::TwoPoint && self.gene_length < 2 {
            return Err(GaError::InvalidConfig(format!(
                "two_point crossover needs at least 2 genes, got {}",
                self.gene_length
            )));
        }
        if let Some(target) = self.target_fitness {
            if target.is_nan() {
                return Err(GaError::InvalidConfig("target_fitness must not be NaN".into()));
            }
        }
        Ok(())
    }
}

fn check_rate(name: &str, rate: f64) -> Result<(), GaError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(GaError::InvalidConfig(format!(
            "{name} must be in [0, 1], got {rate}"
        )))
    }
}
