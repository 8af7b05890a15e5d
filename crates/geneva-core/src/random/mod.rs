//! Process-wide random number factory, per-consumer proxies, and the
//! distributions layered on top of them (§4.5).

mod distributions;
mod factory;
mod proxy;

pub use distributions::{
    BiNormalParams, BiNormalWorkingSet, bernoulli, gaussian, random_sign, standard_normal,
    uniform_int_inclusive, uniform_real,
};
pub use factory::{FactoryConfig, RandomFactory};
pub use proxy::RandomProxy;
