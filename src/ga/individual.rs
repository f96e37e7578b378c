//! A single candidate solution: a fixed-length gene sequence and its fitness.

use rand::Rng;

use super::crossover::CrossoverPlan;
use super::types::{Gene, GeneProblem};

/// A candidate solution in the population.
///
/// The gene sequence has a fixed length chosen at construction and is never
/// resized. Fitness starts at `0.0` and is only written by
/// [`evaluate_fitness`](Individual::evaluate_fitness).
///
/// Individuals hold no handles to the random source or the problem; the
/// engine passes both into every operation that needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual<G> {
    genes: Vec<G>,
    fitness: f64,
}

impl<G> Individual<G> {
    /// Wraps an existing gene sequence with zero fitness.
    pub fn new(genes: Vec<G>) -> Self {
        Self {
            genes,
            fitness: 0.0,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_fitness(genes: Vec<G>, fitness: f64) -> Self {
        Self { genes, fitness }
    }

    /// The gene sequence.
    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    /// Fitness from the last evaluation.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the gene sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Consumes the individual, returning its genes.
    pub fn into_genes(self) -> Vec<G> {
        self.genes
    }
}

impl<G: Gene> Individual<G> {
    /// Creates an individual of `len` freshly drawn genes.
    pub fn random<P, R>(len: usize, problem: &P, rng: &mut R) -> Self
    where
        P: GeneProblem<Gene = G>,
        R: Rng,
    {
        Self::new((0..len).map(|i| problem.random_gene(i, rng)).collect())
    }

    /// Scores this individual as the one at `index` and caches the result.
    ///
    /// A NaN score is stored as `f64::NEG_INFINITY` so the individual ranks
    /// last and is never reported as best.
    pub fn evaluate_fitness<P>(&mut self, index: usize, problem: &P) -> f64
    where
        P: GeneProblem<Gene = G>,
    {
        let fitness = problem.fitness(index, &self.genes);
        self.fitness = if fitness.is_nan() {
            f64::NEG_INFINITY
        } else {
            fitness
        };
        self.fitness
    }

    /// Sexual reproduction: combines `self` with `other` under `plan`.
    ///
    /// The child has zero fitness.
    pub fn crossover<R: Rng>(&self, other: &Self, plan: &CrossoverPlan<G>, rng: &mut R) -> Self {
        Self::new(plan.apply(&self.genes, self.fitness, &other.genes, other.fitness, rng))
    }

    /// Asexual reproduction: an exact copy of the genes with zero fitness.
    pub fn clone_child(&self) -> Self {
        Self::new(self.genes.clone())
    }

    /// Replaces each gene with a freshly drawn one with probability `rate`.
    pub fn mutate<P, R>(&mut self, rate: f64, problem: &P, rng: &mut R)
    where
        P: GeneProblem<Gene = G>,
        R: Rng,
    {
        for (i, gene) in self.genes.iter_mut().enumerate() {
            if rng.random::<f64>() < rate {
                *gene = problem.random_gene(i, rng);
            }
        }
    }
}
