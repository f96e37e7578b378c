//! Generation transitions and the evolutionary loop.
//!
//! [`GeneticAlgorithm`] owns the population buffers, the configuration, the
//! problem and the single random source. Each call to
//! [`new_generation`](GeneticAlgorithm::new_generation) runs one transition:
//! evaluation → ranking → elitism → selection → crossover → mutation → swap.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use super::config::GaConfig;
use super::crossover::CrossoverPlan;
use super::individual::Individual;
use super::persistence::{self, SaveData};
use super::population::Population;
use super::selection::Selection;
use super::types::GeneProblem;
use crate::error::GaError;
use crate::random::rng_from_seed;

/// Result of [`GeneticAlgorithm::run`].
#[derive(Debug, Clone)]
pub struct GaResult<G> {
    /// Genes of the best individual seen during the run.
    pub best_genes: Vec<G>,

    /// Fitness of `best_genes`.
    pub best_fitness: f64,

    /// Number of generation transitions executed.
    pub generations: usize,

    /// Whether the run stopped on the stagnation limit.
    pub stagnated: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Whether the run stopped on the target fitness.
    pub reached_target: bool,

    /// Best fitness of each evaluated generation, in order.
    pub fitness_history: Vec<f64>,
}

/// A genetic algorithm engine over one population.
///
/// # Usage
///
/// ```
/// use rand::{Rng, RngCore};
/// use u_evolve::ga::{FnProblem, GaConfig, GeneticAlgorithm};
///
/// let problem = FnProblem::new(
///     |_i, rng: &mut dyn RngCore| rng.random_bool(0.5),
///     |_index, genes: &[bool]| genes.iter().filter(|&&b| b).count() as f64,
/// );
/// let config = GaConfig::default()
///     .with_population_size(30)
///     .with_gene_length(16)
///     .with_seed(42);
///
/// let mut ga = GeneticAlgorithm::seeded(problem, config).unwrap();
/// ga.next_generation();
/// assert_eq!(ga.generation(), 2);
/// assert_eq!(ga.population().len(), 30);
/// ```
pub struct GeneticAlgorithm<P: GeneProblem, R> {
    problem: P,
    config: GaConfig,
    rng: R,
    crossover: CrossoverPlan<P::Gene>,
    elite_count: usize,
    population: Population<P::Gene>,
    staging: Vec<Individual<P::Gene>>,
}

impl<P: GeneProblem> GeneticAlgorithm<P, StdRng> {
    /// Builds an engine whose random source is seeded from `config.seed`.
    ///
    /// # Errors
    /// See [`new`](GeneticAlgorithm::new).
    pub fn seeded(problem: P, config: GaConfig) -> Result<Self, GaError> {
        let rng = rng_from_seed(config.seed);
        Self::new(problem, config, rng)
    }
}

impl<P: GeneProblem, R: Rng> GeneticAlgorithm<P, R> {
    /// Validates the configuration and creates a random initial population.
    ///
    /// # Errors
    /// Returns [`GaError::InvalidConfig`] for out-of-range parameters and
    /// [`GaError::NonNumericGene`] when an averaging crossover is paired
    /// with a non-numeric gene type.
    pub fn new(problem: P, config: GaConfig, mut rng: R) -> Result<Self, GaError> {
        config.validate()?;
        let crossover = config.crossover.resolve::<P::Gene>()?;
        let elite_count = config.elite_count();
        let population =
            Population::random(config.population_size, config.gene_length, &problem, &mut rng);

        info!(
            population_size = config.population_size,
            gene_length = config.gene_length,
            elite_count,
            selection = %config.selection,
            crossover = %config.crossover,
            "genetic algorithm initialized"
        );

        Ok(Self {
            staging: Vec::with_capacity(config.population_size),
            problem,
            config,
            rng,
            crossover,
            elite_count,
            population,
        })
    }

    /// The current population.
    pub fn population(&self) -> &Population<P::Gene> {
        &self.population
    }

    /// Generation counter, starting at 1.
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    /// Best fitness of the most recently evaluated generation.
    pub fn best_fitness(&self) -> f64 {
        self.population.best_fitness()
    }

    /// Best genes of the most recently evaluated generation.
    pub fn best_genes(&self) -> &[P::Gene] {
        self.population.best_genes()
    }

    /// Fitness sum of the most recently evaluated generation.
    pub fn fitness_sum(&self) -> f64 {
        self.population.fitness_sum()
    }

    /// The engine configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Number of elites carried over per generation.
    pub fn elite_count(&self) -> usize {
        self.elite_count
    }

    /// The problem instance.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Advances one generation without changing the population size.
    pub fn next_generation(&mut self) {
        self.new_generation(0, false);
    }

    /// Advances one generation.
    ///
    /// The next population has `len + num_new` individuals; if that is not
    /// positive the call does nothing. Positions beyond the current size are
    /// filled with offspring when `grow_via_crossover` is set, otherwise with
    /// random individuals. A negative `num_new` drops the least fit.
    #[instrument(level = "debug", skip(self), fields(generation = self.population.generation()))]
    pub fn new_generation(&mut self, num_new: isize, grow_via_crossover: bool) {
        let current = self.population.len();
        let Some(final_len) = current.checked_add_signed(num_new).filter(|&n| n > 0) else {
            debug!(current, num_new, "resulting population is empty, skipping");
            return;
        };

        if current > 0 {
            self.population.evaluate(&self.problem, self.config.parallel);
            self.population.rank();

            let sum = self.population.fitness_sum();
            if self.config.selection == Selection::Proportional && !(sum.is_finite() && sum > 0.0) {
                warn!(fitness_sum = sum, "proportional selection falling back to uniform picks");
            }
        }

        let elites = self.elite_count.min(current).min(final_len);
        self.staging.clear();
        self.staging.reserve(final_len);

        for i in 0..final_len {
            let child = if i < elites {
                self.population.individuals()[i].clone()
            } else if current > 0 && (i < current || grow_via_crossover) {
                self.breed()
            } else {
                Individual::random(self.config.gene_length, &self.problem, &mut self.rng)
            };
            self.staging.push(child);
        }

        self.population.swap_individuals(&mut self.staging);
        self.staging.clear();
        self.population.advance_generation();

        let generation = self.population.generation();
        let best = self.population.best_fitness();
        debug!(
            generation,
            best_fitness = best,
            fitness_sum = self.population.fitness_sum(),
            population = final_len,
            "generation complete"
        );
        self.problem.on_generation(generation, best);
    }

    /// Produces one offspring from the ranked population.
    fn breed(&mut self) -> Individual<P::Gene> {
        let ranked = self.population.individuals();
        let sum = self.population.fitness_sum();
        let first = self.config.selection.select(ranked, sum, &mut self.rng);
        let second = self.config.selection.select(ranked, sum, &mut self.rng);

        let mut child = if self.rng.random::<f64>() < self.config.crossover_rate {
            ranked[first].crossover(&ranked[second], &self.crossover, &mut self.rng)
        } else {
            ranked[first].clone_child()
        };
        child.mutate(self.config.mutation_rate, &self.problem, &mut self.rng);
        child
    }

    /// Runs until `max_generations`, the target fitness or the stagnation
    /// limit is reached.
    pub fn run(&mut self) -> GaResult<P::Gene> {
        self.run_with_cancel(None)
    }

    /// Runs with an optional cancellation flag.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// before the next transition and returns the best solution so far.
    pub fn run_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> GaResult<P::Gene> {
        let mut result = GaResult {
            best_genes: self.best_genes().to_vec(),
            best_fitness: self.best_fitness(),
            generations: 0,
            stagnated: false,
            cancelled: false,
            reached_target: false,
            fitness_history: Vec::with_capacity(self.config.max_generations),
        };
        if self.population.is_empty() {
            return result;
        }

        let mut best_so_far = f64::NEG_INFINITY;
        let mut stagnation_counter = 0usize;

        for _ in 0..self.config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    result.cancelled = true;
                    break;
                }
            }

            self.next_generation();
            result.generations += 1;

            let best = self.best_fitness();
            result.fitness_history.push(best);
            if best > best_so_far {
                best_so_far = best;
                result.best_fitness = best;
                result.best_genes.clear();
                result.best_genes.extend_from_slice(self.best_genes());
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }

            if self.config.target_fitness.is_some_and(|target| best >= target) {
                result.reached_target = true;
                break;
            }
            if self.config.stagnation_limit > 0 && stagnation_counter >= self.config.stagnation_limit {
                result.stagnated = true;
                break;
            }
        }

        info!(
            generations = result.generations,
            best_fitness = result.best_fitness,
            reached_target = result.reached_target,
            stagnated = result.stagnated,
            cancelled = result.cancelled,
            "run finished"
        );
        result
    }

    /// Copies the current generation number and gene sequences.
    pub fn snapshot(&self) -> SaveData<P::Gene> {
        SaveData::from_population(&self.population)
    }

    /// Replaces the population and generation counter with saved state.
    ///
    /// The population takes the saved size; restored individuals have zero
    /// fitness until the next transition evaluates them.
    ///
    /// Statistics of the replaced population are cleared.
    ///
    /// # Errors
    /// Returns [`GaError::Corrupt`] if a saved sequence does not have the
    /// configured gene length or the generation is zero or out of range.
    pub fn restore(&mut self, data: SaveData<P::Gene>) -> Result<(), GaError> {
        let gene_length = self.config.gene_length;
        if let Some((i, genes)) = data
            .genes
            .iter()
            .enumerate()
            .find(|(_, genes)| genes.len() != gene_length)
        {
            return Err(GaError::Corrupt(format!(
                "individual {i} has {} genes, expected {gene_length}",
                genes.len()
            )));
        }
        let generation = usize::try_from(data.generation)
            .ok()
            .filter(|&g| g >= 1)
            .ok_or_else(|| GaError::Corrupt(format!("generation {} out of range", data.generation)))?;

        let individuals = data.genes.into_iter().map(Individual::new).collect();
        self.population.reset(individuals, generation);
        Ok(())
    }

    /// Saves the current generation to `path`.
    ///
    /// # Errors
    /// Returns [`GaError::Io`] if the file cannot be written.
    pub fn save_generation(&self, path: impl AsRef<Path>) -> Result<(), GaError> {
        persistence::save_to_path(&self.snapshot(), path.as_ref())
    }

    /// Loads a generation from `path`.
    ///
    /// Returns `Ok(false)`, leaving the engine untouched, when no file
    /// exists at `path`.
    ///
    /// # Errors
    /// Returns [`GaError::Corrupt`] for malformed content and
    /// [`GaError::Io`] for other read failures.
    pub fn load_generation(&mut self, path: impl AsRef<Path>) -> Result<bool, GaError> {
        match persistence::load_from_path(path.as_ref())? {
            Some(data) => {
                self.restore(data)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::crossover::Crossover;
    use crate::ga::types::FnProblem;
    use crate::random::create_rng;
    use proptest::prelude::*;
    use rand::RngCore;
    use std::sync::atomic::AtomicUsize;

    // ---- OneMax: maximize the number of 1 bits ----

    struct OneMax;

    impl GeneProblem for OneMax {
        type Gene = u8;

        fn random_gene<R: Rng>(&self, _gene_index: usize, rng: &mut R) -> u8 {
            rng.random_range(0..=1)
        }

        fn fitness(&self, _index: usize, genes: &[u8]) -> f64 {
            genes.iter().map(|&g| f64::from(g)).sum()
        }
    }

    fn onemax_config(population: usize, genes: usize) -> GaConfig {
        GaConfig::default()
            .with_population_size(population)
            .with_gene_length(genes)
    }

    fn all_policy_pairs() -> Vec<(Selection, Crossover)> {
        let selections = [
            Selection::Proportional,
            Selection::Rank,
            Selection::tournament(),
            Selection::Random,
        ];
        selections
            .iter()
            .flat_map(|&s| Crossover::ALL.iter().map(move |&c| (s, c)))
            .collect()
    }

    #[test]
    fn test_scenario_single_elite_survives() {
        let config = onemax_config(4, 3)
            .with_selection(Selection::Proportional)
            .with_crossover(Crossover::Uniform)
            .with_elitism(1.0)
            .with_mutation_rate(0.0);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(2024)).unwrap();

        let initial: Vec<Vec<u8>> = ga.population().iter().map(|i| i.genes().to_vec()).collect();
        let mut best = 0;
        for (i, genes) in initial.iter().enumerate() {
            if OneMax.fitness(i, genes) > OneMax.fitness(best, &initial[best]) {
                best = i;
            }
        }

        ga.next_generation();

        assert_eq!(ga.generation(), 2);
        assert_eq!(ga.population().len(), 4);
        assert_eq!(ga.population().individuals()[0].genes(), initial[best].as_slice());
        assert_eq!(ga.best_genes(), initial[best].as_slice());
        assert!((ga.best_fitness() - OneMax.fitness(best, &initial[best])).abs() < 1e-12);
    }

    #[test]
    fn test_size_preserved_for_all_policies() {
        for (selection, crossover) in all_policy_pairs() {
            let config = onemax_config(12, 6)
                .with_selection(selection)
                .with_crossover(crossover)
                .with_elitism(2.0)
                .with_mutation_rate(0.05);
            let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(1)).unwrap();
            for _ in 0..5 {
                ga.next_generation();
                assert_eq!(ga.population().len(), 12, "{selection} / {crossover}");
                assert!(ga.population().iter().all(|ind| ind.len() == 6));
            }
            assert_eq!(ga.generation(), 6);
        }
    }

    #[test]
    fn test_elites_carried_over_unchanged() {
        for selection in [
            Selection::Proportional,
            Selection::Rank,
            Selection::tournament(),
            Selection::Random,
        ] {
            let config = onemax_config(20, 16)
                .with_selection(selection)
                .with_elitism(0.2)
                .with_mutation_rate(0.5);
            let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(8)).unwrap();
            assert_eq!(ga.elite_count(), 4);

            for _ in 0..5 {
                ga.next_generation();
                // The next transition ranks the current individuals by
                // their new evaluation; its top four must survive as-is.
                let mut top = ga.population().individuals().to_vec();
                for (i, ind) in top.iter_mut().enumerate() {
                    ind.evaluate_fitness(i, &OneMax);
                }
                top.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
                let top: Vec<Vec<u8>> = top.iter().take(4).map(|i| i.genes().to_vec()).collect();

                ga.next_generation();
                let next: Vec<Vec<u8>> = ga.population().iter().map(|i| i.genes().to_vec()).collect();
                assert_eq!(&next[..4], top.as_slice(), "{selection}");
            }
        }
    }

    #[test]
    fn test_elitism_keeps_best_fitness_monotone() {
        let config = onemax_config(30, 24).with_elitism(2.0).with_mutation_rate(0.05);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(42)).unwrap();
        let mut last = f64::NEG_INFINITY;
        for _ in 0..40 {
            ga.next_generation();
            assert!(ga.best_fitness() >= last, "{} < {last}", ga.best_fitness());
            last = ga.best_fitness();
        }
    }

    #[test]
    fn test_identical_seeds_identical_trajectories() {
        for (selection, crossover) in all_policy_pairs() {
            let config = onemax_config(16, 10)
                .with_selection(selection)
                .with_crossover(crossover)
                .with_crossover_rate(0.7)
                .with_mutation_rate(0.1)
                .with_elitism(0.1);
            let mut a = GeneticAlgorithm::new(OneMax, config.clone(), create_rng(77)).unwrap();
            let mut b = GeneticAlgorithm::new(OneMax, config, create_rng(77)).unwrap();
            for _ in 0..8 {
                a.next_generation();
                b.next_generation();
                assert_eq!(a.best_fitness().to_bits(), b.best_fitness().to_bits());
                assert_eq!(a.best_genes(), b.best_genes());
                let ga: Vec<&[u8]> = a.population().iter().map(Individual::genes).collect();
                let gb: Vec<&[u8]> = b.population().iter().map(Individual::genes).collect();
                assert_eq!(ga, gb, "{selection} / {crossover}");
            }
        }
    }

    #[test]
    fn test_parallel_flag_keeps_determinism() {
        let config = onemax_config(24, 12).with_mutation_rate(0.1);
        let mut a = GeneticAlgorithm::new(OneMax, config.clone(), create_rng(5)).unwrap();
        let mut b =
            GeneticAlgorithm::new(OneMax, config.with_parallel(true), create_rng(5)).unwrap();
        for _ in 0..10 {
            a.next_generation();
            b.next_generation();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_grow_with_random_individuals() {
        let mut ga = GeneticAlgorithm::new(OneMax, onemax_config(10, 5), create_rng(3)).unwrap();
        ga.new_generation(5, false);
        assert_eq!(ga.population().len(), 15);
        assert!(ga.population().iter().all(|ind| ind.len() == 5));
    }

    #[test]
    fn test_grow_via_crossover() {
        let config = onemax_config(10, 5).with_mutation_rate(0.0).with_crossover_rate(0.0);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(3)).unwrap();
        let parents: Vec<Vec<u8>> = ga.population().iter().map(|i| i.genes().to_vec()).collect();
        ga.new_generation(6, true);
        assert_eq!(ga.population().len(), 16);
        // Without crossover or mutation every offspring clones a parent.
        for ind in ga.population().iter() {
            assert!(parents.iter().any(|p| p.as_slice() == ind.genes()));
        }
    }

    #[test]
    fn test_shrink_drops_least_fit() {
        let config = onemax_config(10, 8).with_elitism(10.0);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(4)).unwrap();
        let mut initial: Vec<f64> = ga
            .population()
            .iter()
            .map(|i| OneMax.fitness(0, i.genes()))
            .collect();
        initial.sort_by(|a, b| b.total_cmp(a));

        ga.new_generation(-4, false);
        assert_eq!(ga.population().len(), 6);
        let kept: Vec<f64> = ga
            .population()
            .iter()
            .map(|i| OneMax.fitness(0, i.genes()))
            .collect();
        assert_eq!(kept, initial[..6].to_vec());
    }

    #[test]
    fn test_empty_result_is_noop() {
        let mut ga = GeneticAlgorithm::new(OneMax, onemax_config(4, 3), create_rng(1)).unwrap();
        ga.new_generation(-4, false);
        assert_eq!(ga.generation(), 1);
        assert_eq!(ga.population().len(), 4);

        let mut empty = GeneticAlgorithm::new(OneMax, onemax_config(0, 3), create_rng(1)).unwrap();
        empty.next_generation();
        assert_eq!(empty.generation(), 1);
        assert!(empty.population().is_empty());
    }

    #[test]
    fn test_empty_population_grows_randomly() {
        let mut ga = GeneticAlgorithm::new(OneMax, onemax_config(0, 3), create_rng(1)).unwrap();
        ga.new_generation(3, true);
        assert_eq!(ga.population().len(), 3);
        assert_eq!(ga.generation(), 2);
    }

    #[test]
    fn test_non_numeric_gene_with_average_fails_fast() {
        let problem = FnProblem::new(
            |_i, rng: &mut dyn RngCore| if rng.next_u32() % 2 == 0 { 'a' } else { 'b' },
            |_index, genes: &[char]| genes.iter().filter(|&&c| c == 'a').count() as f64,
        );
        let config = onemax_config(4, 4).with_crossover(Crossover::UniformAverage);
        let err = GeneticAlgorithm::new(problem, config, create_rng(1))
            .err()
            .expect("averaging crossover over char genes must be rejected");
        assert!(matches!(err, GaError::NonNumericGene { .. }), "{err}");
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = onemax_config(4, 4).with_mutation_rate(1.5);
        assert!(matches!(
            GeneticAlgorithm::new(OneMax, config, create_rng(1)),
            Err(GaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_onemax_convergence() {
        let config = onemax_config(60, 20)
            .with_selection(Selection::tournament())
            .with_elitism(2.0)
            .with_mutation_rate(0.02)
            .with_max_generations(300)
            .with_target_fitness(20.0)
            .with_seed(42);
        let mut ga = GeneticAlgorithm::seeded(OneMax, config).unwrap();
        let result = ga.run();
        assert!(
            result.best_fitness >= 17.0,
            "expected fitness >= 17 for 20-bit OneMax, got {}",
            result.best_fitness
        );
        assert_eq!(result.fitness_history.len(), result.generations);
    }

    #[test]
    fn test_run_stops_at_target() {
        let config = onemax_config(20, 4)
            .with_max_generations(500)
            .with_target_fitness(4.0);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(9)).unwrap();
        let result = ga.run();
        assert!(result.reached_target);
        assert!((result.best_fitness - 4.0).abs() < 1e-12);
        assert_eq!(result.best_genes, vec![1, 1, 1, 1]);
        assert!(result.generations < 500);
    }

    #[test]
    fn test_run_stagnation() {
        let config = onemax_config(20, 3)
            .with_elitism(1.0)
            .with_max_generations(1000)
            .with_stagnation_limit(10);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(42)).unwrap();
        let result = ga.run();
        assert!(result.stagnated, "expected stagnation");
        assert!(result.generations < 1000);
    }

    #[test]
    fn test_run_history_length() {
        let config = onemax_config(10, 8).with_max_generations(30);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(1)).unwrap();
        let result = ga.run();
        assert_eq!(result.generations, 30);
        assert_eq!(result.fitness_history.len(), 30);
        assert_eq!(ga.generation(), 31);
    }

    #[test]
    fn test_cancellation() {
        let config = onemax_config(10, 8).with_max_generations(100);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(1)).unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let result = ga.run_with_cancel(Some(cancel));
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(ga.generation(), 1);
    }

    #[test]
    fn test_on_generation_callback() {
        struct Counting {
            calls: AtomicUsize,
        }

        impl GeneProblem for Counting {
            type Gene = u8;

            fn random_gene<R: Rng>(&self, _gene_index: usize, rng: &mut R) -> u8 {
                rng.random_range(0..=1)
            }

            fn fitness(&self, _index: usize, genes: &[u8]) -> f64 {
                genes.iter().map(|&g| f64::from(g)).sum()
            }

            fn on_generation(&self, generation: usize, _best_fitness: f64) {
                let previous = self.calls.fetch_add(1, Ordering::Relaxed);
                assert_eq!(generation, previous + 2);
            }
        }

        let problem = Counting {
            calls: AtomicUsize::new(0),
        };
        let mut ga = GeneticAlgorithm::new(problem, onemax_config(6, 4), create_rng(1)).unwrap();
        for _ in 0..5 {
            ga.next_generation();
        }
        assert_eq!(ga.problem().calls.load(Ordering::Relaxed), 5);
    }

    // ---- Persistence through the engine ----

    #[test]
    fn test_snapshot_restore_round_trip() {
        let config = onemax_config(8, 6).with_mutation_rate(0.2);
        let mut ga = GeneticAlgorithm::new(OneMax, config.clone(), create_rng(10)).unwrap();
        for _ in 0..3 {
            ga.next_generation();
        }
        let saved = ga.snapshot();

        let mut other = GeneticAlgorithm::new(OneMax, config, create_rng(99)).unwrap();
        other.restore(saved.clone()).unwrap();
        assert_eq!(other.generation(), 4);
        assert_eq!(other.snapshot(), saved);
    }

    #[test]
    fn test_restore_replaces_population_size() {
        let config = onemax_config(8, 3);
        let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(1)).unwrap();
        ga.restore(SaveData {
            generation: 12,
            genes: vec![vec![1, 1, 1], vec![0, 0, 0]],
        })
        .unwrap();
        assert_eq!(ga.population().len(), 2);
        assert_eq!(ga.generation(), 12);

        ga.restore(SaveData {
            generation: 13,
            genes: vec![vec![0, 1, 0]; 11],
        })
        .unwrap();
        assert_eq!(ga.population().len(), 11);
    }

    #[test]
    fn test_restore_clears_previous_statistics() {
        let mut ga = GeneticAlgorithm::new(OneMax, onemax_config(6, 4), create_rng(1)).unwrap();
        ga.next_generation();
        assert!(!ga.best_genes().is_empty());

        ga.restore(SaveData {
            generation: 3,
            genes: vec![vec![0, 0, 0, 0]],
        })
        .unwrap();
        assert_eq!(ga.generation(), 3);
        assert!(ga.best_genes().is_empty());
        assert!(ga.best_fitness().abs() < f64::EPSILON);
        assert!(ga.fitness_sum().abs() < f64::EPSILON);
    }

    #[test]
    fn test_restore_rejects_generation_zero() {
        let mut ga = GeneticAlgorithm::new(OneMax, onemax_config(4, 4), create_rng(1)).unwrap();
        ga.next_generation();
        let before = ga.snapshot();
        let err = ga
            .restore(SaveData {
                generation: 0,
                genes: vec![vec![0, 0, 0, 0]],
            })
            .unwrap_err();
        assert!(matches!(err, GaError::Corrupt(_)), "{err}");
        assert_eq!(ga.snapshot(), before);
        assert_eq!(ga.generation(), 2);
    }

    #[test]
    fn test_undefined_fitness_does_not_break_transitions() {
        struct PartlyUndefined;

        impl GeneProblem for PartlyUndefined {
            type Gene = u8;

            fn random_gene<R: Rng>(&self, _gene_index: usize, rng: &mut R) -> u8 {
                rng.random_range(0..=1)
            }

            fn fitness(&self, index: usize, genes: &[u8]) -> f64 {
                if index % 7 == 3 {
                    f64::NAN
                } else {
                    genes.iter().map(|&g| f64::from(g)).sum()
                }
            }
        }

        for selection in [
            Selection::Proportional,
            Selection::Rank,
            Selection::tournament(),
            Selection::Random,
        ] {
            let config = onemax_config(200, 8).with_selection(selection).with_elitism(2.0);
            let mut ga = GeneticAlgorithm::new(PartlyUndefined, config, create_rng(13)).unwrap();
            for _ in 0..5 {
                ga.next_generation();
                assert_eq!(ga.population().len(), 200);
                assert!(ga.best_fitness().is_finite(), "{selection}: {}", ga.best_fitness());
                assert_eq!(ga.best_genes().len(), 8);
            }
        }
    }

    #[test]
    fn test_restore_rejects_wrong_gene_length() {
        let mut ga = GeneticAlgorithm::new(OneMax, onemax_config(4, 3), create_rng(1)).unwrap();
        let before = ga.snapshot();
        let err = ga
            .restore(SaveData {
                generation: 2,
                genes: vec![vec![1, 1, 1], vec![1, 1]],
            })
            .unwrap_err();
        assert!(matches!(err, GaError::Corrupt(_)), "{err}");
        assert_eq!(ga.snapshot(), before);
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onemax.gen");

        let config = onemax_config(10, 12).with_mutation_rate(0.1);
        let mut ga = GeneticAlgorithm::new(OneMax, config.clone(), create_rng(21)).unwrap();
        for _ in 0..4 {
            ga.next_generation();
        }
        ga.save_generation(&path).unwrap();

        let mut restored = GeneticAlgorithm::new(OneMax, config, create_rng(0)).unwrap();
        assert!(restored.load_generation(&path).unwrap());
        assert_eq!(restored.generation(), ga.generation());
        assert_eq!(restored.snapshot(), ga.snapshot());
    }

    #[test]
    fn test_load_missing_file_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut ga = GeneticAlgorithm::new(OneMax, onemax_config(4, 3), create_rng(1)).unwrap();
        let before = ga.snapshot();
        assert!(!ga.load_generation(dir.path().join("nothing")).unwrap());
        assert_eq!(ga.snapshot(), before);
    }

    #[test]
    fn test_load_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage");
        std::fs::write(&path, b"not a save file").unwrap();
        let mut ga = GeneticAlgorithm::new(OneMax, onemax_config(4, 3), create_rng(1)).unwrap();
        assert!(matches!(
            ga.load_generation(&path),
            Err(GaError::Corrupt(_))
        ));
    }

    // ---- Continuous genes: maximize -(sum of squares) ----

    struct Sphere;

    impl GeneProblem for Sphere {
        type Gene = f64;

        fn random_gene<R: Rng>(&self, _gene_index: usize, rng: &mut R) -> f64 {
            rng.random_range(-5.0..5.0)
        }

        fn fitness(&self, _index: usize, genes: &[f64]) -> f64 {
            // Strictly positive so weighted averaging has meaningful weights.
            1.0 / (1.0 + genes.iter().map(|x| x * x).sum::<f64>())
        }
    }

    #[test]
    fn test_sphere_weighted_average_improves() {
        let config = GaConfig::default()
            .with_population_size(60)
            .with_gene_length(4)
            .with_crossover(Crossover::UniformWeightedAverage)
            .with_selection(Selection::tournament())
            .with_elitism(2.0)
            .with_mutation_rate(0.05)
            .with_max_generations(150);
        let mut ga = GeneticAlgorithm::new(Sphere, config, create_rng(42)).unwrap();
        let result = ga.run();
        let first = result.fitness_history[0];
        assert!(
            result.best_fitness > first,
            "expected improvement over {first}, got {}",
            result.best_fitness
        );
        assert!(result.best_fitness > 0.3, "got {}", result.best_fitness);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_size_and_length_invariants(
            seed in any::<u64>(),
            size in 1usize..24,
            genes in 2usize..12,
            elitism in 0.0f64..5.0,
            sel in 0u8..4,
            cx in 0u8..5,
            grow in -3isize..4,
        ) {
            let config = onemax_config(size, genes)
                .with_elitism(elitism)
                .with_selection(Selection::try_from(sel).unwrap())
                .with_crossover(Crossover::try_from(cx).unwrap())
                .with_mutation_rate(0.1);
            let mut ga = GeneticAlgorithm::new(OneMax, config, create_rng(seed)).unwrap();
            ga.next_generation();
            prop_assert_eq!(ga.population().len(), size);

            let expected = size as isize + grow;
            ga.new_generation(grow, seed % 2 == 0);
            let expected = if expected > 0 { expected as usize } else { size };
            prop_assert_eq!(ga.population().len(), expected);
            prop_assert!(ga.population().iter().all(|ind| ind.len() == genes));
        }
    }
}
