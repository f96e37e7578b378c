//! Save and restore of a generation.
//!
//! A save holds the generation number and one gene sequence per individual,
//! in population order. Fitness values are not stored; they are recomputed
//! by the next transition.
//!
//! # Format
//!
//! ```text
//! b"UEVO" | version: u8 | bincode(SaveData)
//! ```
//!
//! Anything that does not match (wrong magic, unknown version, truncated or
//! trailing payload) is rejected with [`GaError::Corrupt`].

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::population::Population;
use super::types::Gene;
use crate::error::GaError;

/// Magic bytes for file format identification.
const MAGIC: &[u8; 4] = b"UEVO";

/// Current format version.
const VERSION: u8 = 1;

/// A saved generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData<G> {
    /// Generation number at save time.
    pub generation: u64,
    /// One gene sequence per individual, in population order.
    pub genes: Vec<Vec<G>>,
}

impl<G: Gene> SaveData<G> {
    /// Copies the gene sequences and generation number of `population`.
    pub fn from_population(population: &Population<G>) -> Self {
        Self {
            generation: population.generation() as u64,
            genes: population.iter().map(|ind| ind.genes().to_vec()).collect(),
        }
    }

    /// Number of saved individuals.
    pub fn population_size(&self) -> usize {
        self.genes.len()
    }
}

/// Encodes a save into bytes.
///
/// # Errors
/// Returns [`GaError::Corrupt`] if serialization fails.
pub fn encode<G: Gene>(data: &SaveData<G>) -> Result<Vec<u8>, GaError> {
    let payload = bincode::serialize(data)?;
    let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(VERSION);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decodes bytes produced by [`encode`].
///
/// # Errors
/// Returns [`GaError::Corrupt`] if the header or payload is malformed.
pub fn decode<G: Gene>(bytes: &[u8]) -> Result<SaveData<G>, GaError> {
    let header = MAGIC.len() + 1;
    if bytes.len() < header {
        return Err(GaError::Corrupt(format!(
            "expected at least {header} bytes, got {}",
            bytes.len()
        )));
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(GaError::Corrupt("invalid file magic".into()));
    }
    let version = bytes[MAGIC.len()];
    if version != VERSION {
        return Err(GaError::Corrupt(format!("unsupported version: {version}")));
    }

    let payload = &bytes[header..];
    let data: SaveData<G> = bincode::deserialize(payload)?;
    let consumed = bincode::serialized_size(&data)?;
    if consumed != payload.len() as u64 {
        return Err(GaError::Corrupt(format!(
            "{} trailing bytes after payload",
            payload.len() as u64 - consumed.min(payload.len() as u64)
        )));
    }
    Ok(data)
}

/// Writes a save to `path`, replacing any existing file.
///
/// # Errors
/// Returns [`GaError::Io`] if the file cannot be written.
#[instrument(level = "debug", skip(data, path), fields(path = %path.display(), individuals = data.genes.len()))]
pub fn save_to_path<G: Gene>(data: &SaveData<G>, path: &Path) -> Result<(), GaError> {
    let bytes = encode(data)?;
    fs::write(path, &bytes)?;
    debug!(bytes = bytes.len(), "generation saved");
    Ok(())
}

/// Reads a save from `path`.
///
/// Returns `Ok(None)` when no file exists at `path`.
///
/// # Errors
/// Returns [`GaError::Io`] for other read failures and
/// [`GaError::Corrupt`] for malformed content.
#[instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_from_path<G: Gene>(path: &Path) -> Result<Option<SaveData<G>>, GaError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("no saved generation");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let data = decode(&bytes)?;
    debug!(
        generation = data.generation,
        individuals = data.genes.len(),
        "generation loaded"
    );
    Ok(Some(data))
}
