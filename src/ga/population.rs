//! Population container and per-generation statistics.

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::individual::Individual;
use super::types::{Gene, GeneProblem};

/// An ordered collection of individuals plus the statistics of the most
/// recent evaluation.
///
/// After [`rank`](Population::rank) the individuals are sorted by fitness in
/// descending order, so index 0 is the fittest.
#[derive(Debug, Clone)]
pub struct Population<G> {
    individuals: Vec<Individual<G>>,
    generation: usize,
    best_fitness: f64,
    best_genes: Vec<G>,
    fitness_sum: f64,
}

impl<G> Population<G> {
    /// Wraps individuals as generation 1 with no statistics yet.
    pub fn new(individuals: Vec<Individual<G>>) -> Self {
        Self {
            individuals,
            generation: 1,
            best_fitness: 0.0,
            best_genes: Vec::new(),
            fitness_sum: 0.0,
        }
    }

    /// The individuals, in current order.
    pub fn individuals(&self) -> &[Individual<G>] {
        &self.individuals
    }

    /// Iterates over the individuals.
    pub fn iter(&self) -> std::slice::Iter<'_, Individual<G>> {
        self.individuals.iter()
    }

    /// Returns the individual at `index`.
    pub fn get(&self, index: usize) -> Option<&Individual<G>> {
        self.individuals.get(index)
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population has no individuals.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Generation counter, starting at 1.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best fitness of the most recently evaluated generation.
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Copy of the best gene sequence of the most recently evaluated
    /// generation. Empty until the first evaluation.
    pub fn best_genes(&self) -> &[G] {
        &self.best_genes
    }

    /// Sum of all fitness values from the most recent evaluation.
    pub fn fitness_sum(&self) -> f64 {
        self.fitness_sum
    }

    /// Sorts by fitness, descending. The sort is stable, so ties keep their
    /// evaluation order.
    pub(crate) fn rank(&mut self) {
        self.individuals
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
    }

    /// Exchanges the individual buffer with `other`.
    pub(crate) fn swap_individuals(&mut self, other: &mut Vec<Individual<G>>) {
        std::mem::swap(&mut self.individuals, other);
    }

    pub(crate) fn advance_generation(&mut self) {
        self.generation += 1;
    }

    /// Replaces all individuals and the generation counter, and clears the
    /// statistics of the replaced population.
    pub(crate) fn reset(&mut self, individuals: Vec<Individual<G>>, generation: usize) {
        self.individuals = individuals;
        self.generation = generation;
        self.best_fitness = 0.0;
        self.best_genes.clear();
        self.fitness_sum = 0.0;
    }
}

impl<G: Gene> Population<G> {
    /// Creates `size` random individuals of `gene_length` genes each.
    pub fn random<P, R>(size: usize, gene_length: usize, problem: &P, rng: &mut R) -> Self
    where
        P: GeneProblem<Gene = G>,
        R: Rng,
    {
        Self::new(
            (0..size)
                .map(|_| Individual::random(gene_length, problem, rng))
                .collect(),
        )
    }

    /// Evaluates every individual by its current index, then records the
    /// fitness sum and a copy of the fittest individual's genes.
    ///
    /// The first individual wins ties for best. With `parallel` set and the
    /// `parallel` feature enabled, fitness calls run on the rayon pool;
    /// evaluation draws no randomness, so the result is identical.
    pub(crate) fn evaluate<P>(&mut self, problem: &P, parallel: bool)
    where
        P: GeneProblem<Gene = G>,
    {
        if self.individuals.is_empty() {
            return;
        }

        #[cfg(feature = "parallel")]
        {
            if parallel {
                self.individuals
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(i, ind)| {
                        ind.evaluate_fitness(i, problem);
                    });
            } else {
                evaluate_sequential(&mut self.individuals, problem);
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            let _ = parallel;
            evaluate_sequential(&mut self.individuals, problem);
        }

        let mut best = 0;
        let mut sum = 0.0;
        for (i, ind) in self.individuals.iter().enumerate() {
            sum += ind.fitness();
            if ind.fitness() > self.individuals[best].fitness() {
                best = i;
            }
        }

        self.fitness_sum = sum;
        self.best_fitness = self.individuals[best].fitness();
        self.best_genes.clear();
        self.best_genes
            .extend_from_slice(self.individuals[best].genes());
    }
}

fn evaluate_sequential<G: Gene, P: GeneProblem<Gene = G>>(individuals: &mut [Individual<G>], problem: &P) {
    for (i, ind) in individuals.iter_mut().enumerate() {
        ind.evaluate_fitness(i, problem);
    }
}
