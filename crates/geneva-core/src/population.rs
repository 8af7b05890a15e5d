//! The population vector and its parent/child layout invariant, stall
//! bookkeeping, and best-ever tracking (§3, §4.7).

use crate::individual::Individual;
use geneva_error::{GenevaResult, ensure};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `individuals[0..n_parents)` are parents, `individuals[n_parents..)` are
/// children; slot 0 is always the best known solution after a select phase
/// (§3).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Population {
    individuals: Vec<Individual>,
    n_parents: usize,
    default_n_children: usize,
    iteration: u32,
    stall_counter: u32,
    best_ever: Option<f64>,
}

impl Population {
    pub fn new(individuals: Vec<Individual>, n_parents: usize) -> GenevaResult<Self> {
        ensure!(
            n_parents > 0 && n_parents <= individuals.len(),
            InvalidConfig: "n_parents ({}) must be in (0, population_size ({})]", n_parents, individuals.len()
        );
        let default_n_children = individuals.len() - n_parents;
        Ok(Self {
            individuals,
            n_parents,
            default_n_children,
            iteration: 0,
            stall_counter: 0,
            best_ever: None,
        })
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn n_parents(&self) -> usize {
        self.n_parents
    }

    pub fn default_n_children(&self) -> usize {
        self.default_n_children
    }

    pub fn set_default_n_children(&mut self, n: usize) {
        self.default_n_children = n;
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn stall_counter(&self) -> u32 {
        self.stall_counter
    }

    pub fn best_ever(&self) -> Option<f64> {
        self.best_ever
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut Vec<Individual> {
        &mut self.individuals
    }

    pub fn parents(&self) -> &[Individual] {
        &self.individuals[..self.n_parents]
    }

    pub fn parents_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals[..self.n_parents]
    }

    pub fn children(&self) -> &[Individual] {
        &self.individuals[self.n_parents..]
    }

    pub fn children_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals[self.n_parents..]
    }

    pub fn best_parent(&self) -> &Individual {
        &self.individuals[0]
    }

    /// `[0, size)` in iteration 0 (parents need initial evaluation too),
    /// `[n_parents, size)` afterward (§4.8 `getEvaluationRange`).
    pub fn evaluation_range(&self) -> std::ops::Range<usize> {
        if self.iteration == 0 {
            0..self.individuals.len()
        } else {
            self.n_parents..self.individuals.len()
        }
    }

    pub fn advance_iteration(&mut self) {
        self.iteration += 1;
    }

    /// Updates `best_ever` and the stall counter from the current best
    /// parent's transformed fitness (lower is always better in this
    /// world). Returns whether this iteration stalled.
    pub fn record_best(&mut self) -> bool {
        let current_best = self.individuals[0].primary_transformed_fitness();
        let improved = match (current_best, self.best_ever) {
            (Some(c), Some(best)) => c < best,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if improved {
            self.best_ever = current_best;
            self.stall_counter = 0;
            false
        } else {
            self.stall_counter += 1;
            true
        }
    }

    /// Trims the population back to `n_parents + default_n_children`,
    /// dropping late-returning stragglers beyond the nominal size (§4.8).
    pub fn trim_to_nominal_size(&mut self) {
        let nominal = self.n_parents + self.default_n_children;
        if self.individuals.len() > nominal {
            self.individuals.truncate(nominal);
        }
    }
}
