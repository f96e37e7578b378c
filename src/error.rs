//! Error types shared by the GA engine.

use std::io;

/// Errors surfaced by configuration, construction and persistence.
///
/// Degenerate numeric states (a zero fitness sum during proportional
/// selection, a zero combined fitness during weighted averaging) are not
/// errors: they take the documented fallbacks of their operators.
#[derive(Debug, thiserror::Error)]
pub enum GaError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A selection policy name or tag was not recognised.
    #[error("unknown selection policy: {0}")]
    UnknownSelection(String),

    /// A crossover policy name or tag was not recognised.
    #[error("unknown crossover policy: {0}")]
    UnknownCrossover(String),

    /// An averaging crossover was paired with a gene type that has no numeric view.
    #[error("crossover policy {policy} requires numeric genes, got {gene_type}")]
    NonNumericGene {
        policy: &'static str,
        gene_type: &'static str,
    },

    /// Reading or writing a save file failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A saved generation could not be decoded.
    #[error("corrupt save data: {0}")]
    Corrupt(String),
}

impl From<bincode::Error> for GaError {
    fn from(err: bincode::Error) -> Self {
        GaError::Corrupt(err.to_string())
    }
}
