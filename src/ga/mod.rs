//! Genetic algorithm engine.
//!
//! A generic GA over fixed-length gene sequences. Users describe their
//! problem by implementing [`GeneProblem`] (or wrapping two closures in
//! [`FnProblem`]): how to draw a random gene and how to score a sequence.
//! Fitness is maximized.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Population size, elitism, policies and rates
//! - [`GeneticAlgorithm`]: Owns the population and runs transitions
//! - [`GaResult`]: Outcome of a full run
//! - [`Selection`] / [`Crossover`]: Reproduction policies
//! - [`SaveData`]: A persisted generation
//!
//! # Submodules
//!
//! - [`crossover`]: The crossover operators as free functions
//! - [`persistence`]: Binary save format and file helpers
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Miller & Goldberg (1995), *Genetic Algorithms, Tournament Selection, and the Effects of Noise*

mod config;
pub mod crossover;
mod individual;
pub mod persistence;
mod population;
mod runner;
mod selection;
mod types;

pub use config::GaConfig;
pub use crossover::{Crossover, CrossoverPlan};
pub use individual::Individual;
pub use persistence::SaveData;
pub use population::Population;
pub use runner::{GaResult, GeneticAlgorithm};
pub use selection::Selection;
pub use types::{FnProblem, Gene, GeneProblem, NumericOps};
