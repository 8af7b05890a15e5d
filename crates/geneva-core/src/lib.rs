pub mod domain;
pub mod individual;
pub mod objectives;
pub mod param;
pub mod population;
pub mod problem;
pub mod random;

pub use individual::{Individual, PersonalityTraits};
pub use objectives::{Optimize, dominates};
pub use param::{
    Adaptor, AdaptionMode, AdaptorState, BoolParam, DoubleParam, GaussianExtra, Int32Param,
    ParameterLeaf, ParameterSet, fold_double, fold_int,
};
pub use population::Population;
pub use problem::{EvalResult, ObjectiveFn, Problem};
pub use random::{FactoryConfig, RandomFactory, RandomProxy};

pub mod prelude {
    pub use super::domain::queue::BoundedQueue;
    pub use super::domain::thread_pool::ThreadPool;
    pub use super::individual::{Individual, PersonalityTraits};
    pub use super::objectives::{Optimize, dominates};
    pub use super::param::{
        Adaptor, AdaptionMode, AdaptorState, BoolParam, DoubleParam, GaussianExtra, Int32Param,
        ParameterLeaf, ParameterSet,
    };
    pub use super::population::Population;
    pub use super::problem::{EvalResult, ObjectiveFn, Problem};
    pub use super::random::{FactoryConfig, RandomFactory, RandomProxy};
}
