//! Core trait definitions for the GA engine.
//!
//! [`Gene`] describes what the engine may do with a single gene value and
//! [`GeneProblem`] is the contract between the generic engine and a concrete
//! problem: how to draw a random gene and how to score an individual.

use std::fmt::Debug;
use std::marker::PhantomData;

use rand::{Rng, RngCore};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Numeric view of a gene type.
///
/// Averaging crossovers work in `f64` space and convert back through
/// `from_f64`. Integer genes round to the nearest value and saturate at the
/// type bounds.
pub struct NumericOps<G> {
    /// Converts a gene to `f64`.
    pub to_f64: fn(&G) -> f64,
    /// Converts an `f64` back into a gene.
    pub from_f64: fn(f64) -> G,
}

impl<G> Clone for NumericOps<G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for NumericOps<G> {}

impl<G> Debug for NumericOps<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumericOps").finish_non_exhaustive()
    }
}

/// A single gene value.
///
/// Every policy except the averaging crossovers only needs equality and
/// cloning. Numeric gene types additionally return [`NumericOps`] from
/// [`numeric_ops`](Gene::numeric_ops); the engine checks this once at
/// construction.
///
/// Built-in implementations exist for `bool`, `char`, `String`, all
/// primitive integers, `f32` and `f64`.
pub trait Gene: Clone + PartialEq + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Returns numeric conversions, or `None` for non-numeric alphabets.
    fn numeric_ops() -> Option<NumericOps<Self>> {
        None
    }
}

macro_rules! plain_gene {
    ($($t:ty),* $(,)?) => {
        $(impl Gene for $t {})*
    };
}

macro_rules! float_gene {
    ($($t:ty),* $(,)?) => {
        $(impl Gene for $t {
            fn numeric_ops() -> Option<NumericOps<Self>> {
                Some(NumericOps {
                    to_f64: |g| f64::from(*g),
                    from_f64: |v| v as $t,
                })
            }
        })*
    };
}

macro_rules! int_gene {
    ($($t:ty),* $(,)?) => {
        $(impl Gene for $t {
            fn numeric_ops() -> Option<NumericOps<Self>> {
                Some(NumericOps {
                    to_f64: |g| *g as f64,
                    from_f64: |v| v.round() as $t,
                })
            }
        })*
    };
}

plain_gene!(bool, char, String);
float_gene!(f32, f64);
int_gene!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Defines a GA problem instance.
///
/// This is the trait users implement to plug a gene alphabet and a fitness
/// measure into the generic engine.
///
/// # Thread Safety
///
/// `GeneProblem` must be `Send + Sync` because the engine may evaluate
/// fitness in parallel when the `parallel` feature is enabled.
pub trait GeneProblem: Send + Sync {
    /// The gene type of this problem.
    type Gene: Gene;

    /// Draws a random value for the gene at `gene_index`.
    ///
    /// Used for initialization, for growing the population, and by mutation.
    fn random_gene<R: Rng>(&self, gene_index: usize, rng: &mut R) -> Self::Gene;

    /// Scores the individual at `index` in the current (pre-sort) population.
    ///
    /// Higher is better. Must not depend on randomness.
    fn fitness(&self, index: usize, genes: &[Self::Gene]) -> f64;

    /// Called after every generation transition with the new generation
    /// number and the best fitness of the generation just evaluated.
    ///
    /// The default implementation is a no-op.
    fn on_generation(&self, _generation: usize, _best_fitness: f64) {}
}

/// A [`GeneProblem`] built from a gene-generator closure and a fitness closure.
///
/// ```
/// use rand::Rng;
/// use u_evolve::ga::FnProblem;
///
/// let onemax = FnProblem::new(
///     |_i, rng: &mut dyn rand::RngCore| rng.random_bool(0.5),
///     |_index, genes: &[bool]| genes.iter().filter(|&&b| b).count() as f64,
/// );
/// # let _ = onemax;
/// ```
pub struct FnProblem<G, GF, FF> {
    gene_fn: GF,
    fitness_fn: FF,
    _gene: PhantomData<fn() -> G>,
}

impl<G, GF, FF> FnProblem<G, GF, FF>
where
    G: Gene,
    GF: Fn(usize, &mut dyn RngCore) -> G + Send + Sync,
    FF: Fn(usize, &[G]) -> f64 + Send + Sync,
{
    /// Wraps the two closures.
    pub fn new(gene_fn: GF, fitness_fn: FF) -> Self {
        Self {
            gene_fn,
            fitness_fn,
            _gene: PhantomData,
        }
    }
}

impl<G, GF, FF> GeneProblem for FnProblem<G, GF, FF>
where
    G: Gene,
    GF: Fn(usize, &mut dyn RngCore) -> G + Send + Sync,
    FF: Fn(usize, &[G]) -> f64 + Send + Sync,
{
    type Gene = G;

    fn random_gene<R: Rng>(&self, gene_index: usize, rng: &mut R) -> G {
        (self.gene_fn)(gene_index, rng)
    }

    fn fitness(&self, index: usize, genes: &[G]) -> f64 {
        (self.fitness_fn)(index, genes)
    }
}
