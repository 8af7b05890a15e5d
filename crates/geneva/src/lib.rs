//! A Rust library for parallel evolutionary optimization: an Evolutionary
//! Algorithm and Simulated Annealing over mixed-type bounded parameters.
//!
//! This crate re-exports the domain types (`geneva-core`), self-adapting
//! mutation (`geneva-alters`), and the engines that drive an optimization
//! run (`geneva-engines`) behind a single entry point.

pub use geneva_alters::*;
pub use geneva_core::*;
pub use geneva_engines::*;
pub use geneva_error::{ErrorCode, GenevaError, GenevaResult};

pub mod prelude {
    pub use geneva_core::prelude::*;
    pub use geneva_engines::{
        DuplicationScheme, EaEngine, EaEpoch, Engine, EngineConfig, EngineConfigBuilder,
        EngineExt, SaConfig, SaEngine, SaEpoch, SignalFlag, SortingMode,
    };
    pub use geneva_error::{GenevaError, GenevaResult};
}
