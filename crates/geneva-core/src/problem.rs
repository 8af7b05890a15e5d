//! The objective-function contract the engine consumes (§6).

use crate::objectives::Optimize;
use crate::param::ParameterSet;
use geneva_error::GenevaError;
use std::sync::Arc;

/// One entry per objective; length must stay stable across calls for a
/// given [`Problem`] (§6).
pub type EvalResult = Result<Vec<f64>, GenevaError>;

/// The user-supplied fitness function. Parameters are passed in their
/// external (bounded) values.
pub type ObjectiveFn = Arc<dyn Fn(&ParameterSet) -> EvalResult + Send + Sync>;

/// Bundles the objective function with the optimization sense the engine
/// applies to its output.
#[derive(Clone)]
pub struct Problem {
    eval: ObjectiveFn,
    optimize: Optimize,
}

impl Problem {
    pub fn new<F>(eval: F, optimize: Optimize) -> Self
    where
        F: Fn(&ParameterSet) -> EvalResult + Send + Sync + 'static,
    {
        Self {
            eval: Arc::new(eval),
            optimize,
        }
    }

    pub fn evaluate(&self, parameters: &ParameterSet) -> EvalResult {
        (self.eval)(parameters)
    }

    pub fn optimize(&self) -> Optimize {
        self.optimize
    }
}
