//! Generic genetic algorithm engine.
//!
//! Evolves a population of fixed-length gene sequences toward higher
//! fitness using a user-supplied gene generator and fitness function:
//!
//! - **Selection**: fitness-proportional, rank, tournament or uniform random
//! - **Crossover**: uniform, one-point, two-point and (weighted) averaging
//!   for numeric genes
//! - **Elitism**: a fraction or count of the fittest survive unchanged
//! - **Persistence**: a generation can be saved to and restored from disk
//!
//! All randomness flows through one seedable source owned by the engine,
//! so identical seeds reproduce identical runs.
//!
//! # Quick Start
//!
//! ```
//! use rand::{Rng, RngCore};
//! use u_evolve::ga::{FnProblem, GaConfig, GeneticAlgorithm, Selection};
//!
//! // OneMax: maximize the number of `true` genes.
//! let problem = FnProblem::new(
//!     |_i, rng: &mut dyn RngCore| rng.random_bool(0.5),
//!     |_index, genes: &[bool]| genes.iter().filter(|&&g| g).count() as f64,
//! );
//! let config = GaConfig::default()
//!     .with_population_size(50)
//!     .with_gene_length(20)
//!     .with_selection(Selection::tournament())
//!     .with_max_generations(200)
//!     .with_target_fitness(20.0)
//!     .with_seed(7);
//!
//! let mut ga = GeneticAlgorithm::seeded(problem, config).unwrap();
//! let result = ga.run();
//! assert!(result.best_fitness >= 15.0);
//! ```
//!
//! # Features
//!
//! - `parallel`: evaluates fitness on the rayon thread pool when
//!   [`GaConfig::parallel`](ga::GaConfig::parallel) is set.

pub mod error;
pub mod ga;
pub mod random;

pub use error::GaError;
