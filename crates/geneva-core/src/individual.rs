//! A candidate solution: parameters plus cached fitness and per-algorithm
//! scratch metadata (§3).

use crate::param::ParameterSet;
use crate::problem::Problem;
use geneva_error::GenevaError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-algorithm metadata attached to an individual. Replaced wholesale when
/// an individual is rehomed to a different algorithm (§3).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PersonalityTraits {
    pub is_parent: bool,
    pub parent_id: Option<usize>,
    pub population_position: Option<usize>,
    pub on_pareto_front: bool,
}

/// A candidate solution: parameters plus cached fitness and traits.
/// Ownership is exclusive — an individual lives in the population vector or
/// in a worker task in flight, never shared mutably across threads (§3).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Individual {
    parameters: ParameterSet,
    fitness: Vec<f64>,
    transformed_fitness: Vec<f64>,
    dirty: bool,
    traits: PersonalityTraits,
}

impl Individual {
    pub fn new(parameters: ParameterSet) -> Self {
        Self {
            parameters,
            fitness: Vec::new(),
            transformed_fitness: Vec::new(),
            dirty: true,
            traits: PersonalityTraits::default(),
        }
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Mutable access always marks the individual dirty — any caller reaching
    /// for this is about to perturb the parameters (adaptation, crossover,
    /// re-initialization).
    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        self.dirty = true;
        &mut self.parameters
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    pub fn transformed_fitness(&self) -> &[f64] {
        &self.transformed_fitness
    }

    /// The scalar the engine sorts on by default: the first (or only)
    /// transformed objective.
    pub fn primary_transformed_fitness(&self) -> Option<f64> {
        self.transformed_fitness.first().copied()
    }

    pub fn traits(&self) -> &PersonalityTraits {
        &self.traits
    }

    pub fn traits_mut(&mut self) -> &mut PersonalityTraits {
        &mut self.traits
    }

    pub fn replace_traits(&mut self, traits: PersonalityTraits) {
        self.traits = traits;
    }

    /// Evaluates against `problem` if dirty, otherwise returns the cached
    /// fitness unchanged. Takes and returns `self` by value (rather than
    /// `&mut self`) so a thread-pool task can move the individual across
    /// the task boundary and hand both it and any evaluation error back to
    /// the driver (§4.7 "evaluate").
    pub fn evaluate(mut self, problem: &Problem) -> (Self, Option<GenevaError>) {
        if !self.dirty {
            return (self, None);
        }

        match problem.evaluate(&self.parameters) {
            Ok(raw) => {
                self.transformed_fitness = problem.optimize().transform(&raw);
                self.fitness = raw;
                self.dirty = false;
                (self, None)
            }
            Err(e) => (self, Some(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::leaf::DoubleParam;
    use crate::param::{Adaptor, AdaptionMode, AdaptorState, ParameterLeaf};
    use crate::objectives::Optimize;
    use geneva_error::geneva_err;

    fn identity_adaptor() -> Adaptor {
        let state = AdaptorState::new(0.0, 0.0, 1.0, 0.0, AdaptionMode::Never, 0, 0.0).unwrap();
        Adaptor::identity(state).unwrap()
    }

    fn one_param_set(v: f64) -> ParameterSet {
        let leaf = ParameterLeaf::Double(DoubleParam::new(v, -10.0, 10.0, identity_adaptor()).unwrap());
        ParameterSet::new(vec![leaf])
    }

    #[test]
    fn fresh_individual_is_dirty() {
        let ind = Individual::new(one_param_set(2.0));
        assert!(ind.is_dirty());
        assert!(ind.fitness().is_empty());
    }

    #[test]
    fn evaluate_clears_dirty_and_caches_transformed_fitness() {
        let problem = Problem::new(
            |p: &ParameterSet| Ok(vec![p.streamline_doubles()[0].powi(2)]),
            Optimize::Maximize,
        );
        let ind = Individual::new(one_param_set(3.0));
        let (ind, err) = ind.evaluate(&problem);
        assert!(err.is_none());
        assert!(!ind.is_dirty());
        assert_eq!(ind.fitness(), &[9.0]);
        assert_eq!(ind.transformed_fitness(), &[-9.0]);
    }

    #[test]
    fn clean_individual_is_not_re_evaluated() {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let calls_inner = std::sync::Arc::clone(&calls);
        let problem = Problem::new(
            move |p: &ParameterSet| {
                calls_inner.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(vec![p.streamline_doubles()[0]])
            },
            Optimize::Minimize,
        );
        let ind = Individual::new(one_param_set(1.0));
        let (ind, _) = ind.evaluate(&problem);
        let (_ind, _) = ind.evaluate(&problem);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn evaluate_error_leaves_individual_unevaluated() {
        let problem = Problem::new(
            |_: &ParameterSet| Err(geneva_err!(Evaluation: "objective blew up")),
            Optimize::Minimize,
        );
        let ind = Individual::new(one_param_set(1.0));
        let (ind, err) = ind.evaluate(&problem);
        assert!(err.is_some());
        assert!(ind.is_dirty());
    }
}
