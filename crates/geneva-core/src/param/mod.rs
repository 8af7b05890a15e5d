//! Typed, bounded parameters and parameter sets (§3, §4.1, §4.3).

pub mod adaptor;
pub mod leaf;
pub mod set;

pub use adaptor::{Adaptor, AdaptionMode, AdaptorState, GaussianExtra};
pub use leaf::{BoolParam, DoubleParam, Int32Param, ParameterLeaf, fold_double, fold_int};
pub use set::ParameterSet;
