//! Regenerating the child slots from the parent slots (§4.7 "recombine").

use crate::config::DuplicationScheme;
use geneva_core::random::{bernoulli, uniform_int_inclusive, uniform_real};
use geneva_core::{Individual, Population, RandomProxy};
use geneva_error::GenevaResult;

/// Regenerates `population`'s child slots from its parent slots using
/// `scheme`. `Value` and `Amalgamation` both fall back to `Random` in
/// iteration 0, when parent fitness is not yet meaningful (§4.7).
pub fn recombine(
    population: &mut Population,
    scheme: DuplicationScheme,
    amalgamation_likelihood: f64,
    rng: &mut RandomProxy,
) -> GenevaResult<()> {
    let n_parents = population.n_parents();
    let total = population.individuals().len();
    let iteration = population.iteration();
    let parents: Vec<Individual> = population.parents().to_vec();

    let mut children = Vec::with_capacity(total - n_parents);
    for _ in n_parents..total {
        let child = if scheme == DuplicationScheme::Amalgamation
            && parents.len() >= 2
            && bernoulli(rng, amalgamation_likelihood)
        {
            amalgamate_child(&parents, rng)?
        } else if scheme == DuplicationScheme::Value && iteration > 0 {
            parents[pick_by_value_weight(parents.len(), rng)].clone()
        } else {
            parents[uniform_int_inclusive(rng, 0, parents.len() as i32 - 1) as usize].clone()
        };
        children.push(child);
    }

    population.individuals_mut().truncate(n_parents);
    population.individuals_mut().extend(children);
    Ok(())
}

fn amalgamate_child(parents: &[Individual], rng: &mut RandomProxy) -> GenevaResult<Individual> {
    let best = &parents[0];
    let other = 1 + uniform_int_inclusive(rng, 0, parents.len() as i32 - 2) as usize;
    let fused = best.parameters().amalgamate(parents[other].parameters(), rng)?;
    Ok(Individual::new(fused))
}

/// Picks a parent index with probability proportional to `1 / (i + 2)`,
/// favouring the best-ranked parent (§4.7 "Value" duplication).
fn pick_by_value_weight(n: usize, rng: &mut RandomProxy) -> usize {
    let weights: Vec<f64> = (0..n).map(|i| 1.0 / (i + 2) as f64).collect();
    let total: f64 = weights.iter().sum();
    let mut r = uniform_real(rng, 0.0, total);
    for (i, w) in weights.iter().enumerate() {
        if r < *w {
            return i;
        }
        r -= *w;
    }
    n - 1
}
