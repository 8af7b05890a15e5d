//! The parent-child base loop (§4.7) and its two specializations: the
//! Evolutionary Algorithm (§4.8) and Simulated Annealing (§4.9). Also hosts
//! engine configuration, checkpointing, and the `SIGHUP` halt signal.

pub mod base;
pub mod checkpoint;
pub mod config;
pub mod ea;
pub mod engine;
pub mod recombine;
pub mod sa;
pub mod select;
pub mod signal;

pub use checkpoint::CheckpointWriter;
#[cfg(feature = "serde")]
pub use checkpoint::Checkpoint;
pub use config::{DuplicationScheme, EngineConfig, EngineConfigBuilder, SortingMode};
pub use ea::{EaEngine, EaEpoch};
pub use engine::{Engine, EngineExt};
pub use sa::{SaConfig, SaEngine, SaEpoch};
pub use signal::SignalFlag;
