//! Self-adapting mutation algorithms layered over the adaptor data shapes
//! defined in `geneva_core::param::adaptor` (§4.2).

mod adapt;

pub use adapt::{Adapt, adapt_leaf, adapt_set};
