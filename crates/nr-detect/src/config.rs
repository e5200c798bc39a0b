use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use nr_core::FilterMode;

use crate::curves::ErrorCurves;
use crate::types::HeightRange;
use crate::DetectError;

/// Knobs for a detection run.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "lo": 480, "hi": 720, "modes": ["BILINEAR", "LANCZOS3"], "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Lowest candidate height (inclusive).
    pub lo: usize,
    /// Highest candidate height (exclusive).
    pub hi: usize,
    /// Images per sampling chunk; one image is drawn from each chunk.
    pub chunk_size: usize,
    pub modes: Vec<FilterMode>,
    /// Fixed seed for sample selection; drawn from OS entropy when unset.
    pub seed: Option<u64>,
    /// Worker count for the height sweep; the global rayon pool when unset.
    pub threads: Option<usize>,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            lo: 700,
            hi: 1000,
            chunk_size: 8,
            modes: FilterMode::DETECTION_DEFAULT.to_vec(),
            seed: None,
            threads: None,
        }
    }
}

impl DetectConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, DetectError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            DetectError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            DetectError::Config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    pub fn height_range(&self) -> Result<HeightRange, DetectError> {
        HeightRange::new(self.lo, self.hi)
    }

    pub fn validate(&self) -> Result<(), DetectError> {
        self.height_range()?;
        ErrorCurves::validate_modes(&self.modes)?;
        if self.chunk_size == 0 {
            return Err(DetectError::InvalidChunkSize);
        }
        if self.threads == Some(0) {
            return Err(DetectError::Config("thread count must be at least 1".into()));
        }
        Ok(())
    }
}
