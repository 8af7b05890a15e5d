//! The checkpoint artifact and its write policy (§4.7 "Checkpointing", §6
//! "Checkpoint artifact"). Serialization is feature-gated behind `serde`
//! (mirroring `geneva-core/serde`); with the feature disabled, a configured
//! writer degrades to a warning instead of failing the run.

use crate::config::EngineConfig;
use geneva_core::Population;
use geneva_error::GenevaResult;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use geneva_error::geneva_err;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The round-trippable snapshot: population, iteration, stall counter,
/// best-ever fitness, and (SA only) the current temperature.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub population: Population,
    pub iteration: u32,
    pub stall_counter: u32,
    pub best_ever: Option<f64>,
    pub temperature: Option<f64>,
}

#[cfg(feature = "serde")]
impl Checkpoint {
    pub fn capture(population: &Population, temperature: Option<f64>) -> Self {
        Self {
            population: population.clone(),
            iteration: population.iteration(),
            stall_counter: population.stall_counter(),
            best_ever: population.best_ever(),
            temperature,
        }
    }

    pub fn to_blob(&self) -> GenevaResult<String> {
        serde_json::to_string(self).map_err(|e| geneva_err!(Io: "failed to serialize checkpoint: {}", e))
    }

    pub fn from_blob(blob: &str) -> GenevaResult<Self> {
        serde_json::from_str(blob).map_err(|e| geneva_err!(Io: "failed to deserialize checkpoint: {}", e))
    }
}

/// Decides when a checkpoint is due and writes it. `cp_interval == 0`
/// disables checkpointing entirely, so [`CheckpointWriter::from_config`]
/// simply returns `None` in that case and the engine skips the check.
pub struct CheckpointWriter {
    interval: i32,
    base_name: String,
    directory: PathBuf,
}

impl CheckpointWriter {
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        if config.cp_interval == 0 {
            return None;
        }
        Some(Self {
            interval: config.cp_interval,
            base_name: config.cp_base_name.clone(),
            directory: PathBuf::from(&config.cp_directory),
        })
    }

    /// `cp_interval == -1` writes whenever `improved`; `cp_interval > 0`
    /// writes every N iterations (§4.7).
    pub fn maybe_write(&self, population: &Population, improved: bool, temperature: Option<f64>) -> GenevaResult<()> {
        let due = if self.interval < 0 {
            improved
        } else {
            self.interval > 0 && population.iteration() % self.interval as u32 == 0
        };
        if !due {
            return Ok(());
        }
        self.write(population, temperature)
    }

    fn path_for(&self, iteration: u32) -> PathBuf {
        self.directory.join(format!("{}-{iteration:08}.json", self.base_name))
    }

    #[cfg(feature = "serde")]
    fn write(&self, population: &Population, temperature: Option<f64>) -> GenevaResult<()> {
        let blob = Checkpoint::capture(population, temperature).to_blob()?;
        let path = self.path_for(population.iteration());
        std::fs::write(&path, blob).map_err(|e| geneva_err!(Io: "failed to write checkpoint {}: {}", path.display(), e))
    }

    #[cfg(not(feature = "serde"))]
    fn write(&self, population: &Population, _temperature: Option<f64>) -> GenevaResult<()> {
        tracing::warn!(
            iteration = population.iteration(),
            "checkpoint due but the \"serde\" feature is disabled; skipping write"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfigBuilder;

    #[test]
    fn zero_interval_disables_checkpointing() {
        let config = EngineConfigBuilder::new().population_size(4).n_parents(2).cp_interval(0).build().unwrap();
        assert!(CheckpointWriter::from_config(&config).is_none());
    }

    #[test]
    fn positive_interval_builds_a_writer() {
        let config = EngineConfigBuilder::new()
            .population_size(4)
            .n_parents(2)
            .cp_interval(5)
            .build()
            .unwrap();
        assert!(CheckpointWriter::from_config(&config).is_some());
    }
}
