//! The five selection schemes of §4.8. Each sorts `population` so that
//! `individuals[0..n_parents)` is the new parent set, with slot 0 always the
//! best.

use crate::config::SortingMode;
use geneva_core::random::uniform_int_inclusive;
use geneva_core::{Individual, Population, RandomProxy, dominates};

/// Applies `mode`'s selection rule to `population`, then trims back to the
/// nominal size (§4.7 "select" / §4.8 "trim").
pub fn select(population: &mut Population, mode: SortingMode, rng: &mut RandomProxy) {
    let iteration = population.iteration();
    let n_parents = population.n_parents();

    let effective_mode = match mode {
        SortingMode::MuCommaLambda if iteration == 0 => SortingMode::MuPlusLambda,
        SortingMode::MuOnePretain if iteration == 0 || n_parents == 1 => SortingMode::MuPlusLambda,
        SortingMode::MuPlusLambdaPareto if population.individuals().first().is_some() && !is_multi_objective(population) => {
            SortingMode::MuPlusLambda
        }
        SortingMode::MuCommaLambdaPareto if iteration == 0 => SortingMode::MuPlusLambdaPareto,
        SortingMode::MuCommaLambdaPareto if !is_multi_objective(population) => SortingMode::MuCommaLambda,
        other => other,
    };

    match effective_mode {
        SortingMode::MuPlusLambda => select_mu_plus_lambda(population),
        SortingMode::MuCommaLambda => select_mu_comma_lambda(population),
        SortingMode::MuOnePretain => select_mu_one_pretain(population),
        SortingMode::MuPlusLambdaPareto => select_pareto(population, rng, false),
        SortingMode::MuCommaLambdaPareto => select_pareto(population, rng, true),
    }

    population.trim_to_nominal_size();
}

fn is_multi_objective(population: &Population) -> bool {
    population
        .individuals()
        .first()
        .map(|ind| ind.transformed_fitness().len() > 1)
        .unwrap_or(false)
}

pub(crate) fn best_first(a: &Individual, b: &Individual) -> std::cmp::Ordering {
    let fa = a.primary_transformed_fitness().unwrap_or(f64::INFINITY);
    let fb = b.primary_transformed_fitness().unwrap_or(f64::INFINITY);
    fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
}

/// `µ+λ`: sort the whole population, keep the best `n_parents` in front.
fn select_mu_plus_lambda(population: &mut Population) {
    population.individuals_mut().sort_by(best_first);
}

/// `µ,λ`: sort children only, swap them into the parent slots.
fn select_mu_comma_lambda(population: &mut Population) {
    let n_parents = population.n_parents();
    population.children_mut().sort_by(best_first);
    let mut children: Vec<Individual> = population.children().to_vec();
    children.truncate(n_parents.min(children.len()));
    let rest: Vec<Individual> = population.individuals()[n_parents..].to_vec();
    let mut new_individuals = children;
    new_individuals.extend(rest);
    *population.individuals_mut() = new_individuals;
}

/// `µ,1-pretain`: best parent survives unless a child beats it.
fn select_mu_one_pretain(population: &mut Population) {
    let n_parents = population.n_parents();
    population.children_mut().sort_by(best_first);

    let best_parent = population.individuals()[0].clone();
    let best_child = population.children()[0].clone();

    let children: Vec<Individual> = population.children().to_vec();
    let rest_children: Vec<Individual> = population.individuals()[n_parents..].to_vec();

    let child_wins = best_child
        .primary_transformed_fitness()
        .zip(best_parent.primary_transformed_fitness())
        .map(|(c, p)| c < p)
        .unwrap_or(false);

    let mut new_individuals = if child_wins {
        children
    } else {
        let mut v = vec![best_parent];
        v.extend(children.into_iter().take(n_parents - 1));
        v
    };
    new_individuals.extend(rest_children);
    *population.individuals_mut() = new_individuals;
}

/// Pareto-front partition shared by `µ+λ pareto` and `µ,λ pareto`. When
/// `children_only` is set, last iteration's parents are tagged off-front so
/// the new front is drawn from children alone (§4.8 "µ,λ pareto").
fn select_pareto(population: &mut Population, rng: &mut RandomProxy, children_only: bool) {
    let n_parents = population.n_parents();
    let candidates: Vec<Individual> = if children_only {
        population.children().to_vec()
    } else {
        population.individuals().to_vec()
    };

    let mut on_front = vec![true; candidates.len()];
    for i in 0..candidates.len() {
        if !on_front[i] {
            continue;
        }
        for j in 0..candidates.len() {
            if i == j || !on_front[j] {
                continue;
            }
            if dominates(candidates[i].transformed_fitness(), candidates[j].transformed_fitness()) {
                on_front[j] = false;
            }
        }
    }

    let mut front: Vec<Individual> = candidates
        .iter()
        .zip(on_front.iter())
        .filter(|(_, on)| **on)
        .map(|(ind, _)| ind.clone())
        .collect();
    let mut off_front: Vec<Individual> = candidates
        .into_iter()
        .zip(on_front)
        .filter(|(_, on)| !on)
        .map(|(ind, _)| ind)
        .collect();

    if front.len() > n_parents {
        shuffle(&mut front, rng);
    } else if front.len() < n_parents {
        off_front.sort_by(best_first);
        front.extend(off_front.drain(..(n_parents - front.len()).min(off_front.len())));
    }

    front.truncate(n_parents.max(front.len().min(n_parents)));
    front[..front.len().min(n_parents)].sort_by(best_first);

    let rest: Vec<Individual> = population.children().to_vec();
    let mut new_individuals = front;
    new_individuals.extend(rest);
    *population.individuals_mut() = new_individuals;
}

fn shuffle(items: &mut [Individual], rng: &mut RandomProxy) {
    for i in (1..items.len()).rev() {
        let j = uniform_int_inclusive(rng, 0, i as i32) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geneva_core::param::leaf::DoubleParam;
    use geneva_core::param::{Adaptor, AdaptionMode, AdaptorState, ParameterLeaf};
    use geneva_core::{FactoryConfig, ParameterSet, Problem, RandomFactory};
    use geneva_core::Optimize;
    use std::sync::Mutex;

    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn identity_adaptor() -> Adaptor {
        let state = AdaptorState::new(0.0, 0.0, 1.0, 0.0, AdaptionMode::Never, 0, 0.0).unwrap();
        Adaptor::identity(state).unwrap()
    }

    fn evaluated(v: f64) -> Individual {
        let leaf = ParameterLeaf::Double(DoubleParam::new(v, -10.0, 10.0, identity_adaptor()).unwrap());
        let ind = Individual::new(ParameterSet::new(vec![leaf]));
        let problem = Problem::new(|p: &ParameterSet| Ok(vec![p.streamline_doubles()[0]]), Optimize::Minimize);
        ind.evaluate(&problem).0
    }

    #[test]
    fn mu_plus_lambda_keeps_overall_best_in_front() {
        let mut population = Population::new(vec![evaluated(3.0), evaluated(1.0), evaluated(2.0), evaluated(0.5)], 2).unwrap();
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig { start_seed: Some(21), ..Default::default() }).unwrap();
        let mut rng = RandomProxy::new(factory.clone());
        select(&mut population, SortingMode::MuPlusLambda, &mut rng);
        assert_eq!(population.individuals()[0].primary_transformed_fitness(), Some(0.5));
        assert_eq!(population.individuals()[1].primary_transformed_fitness(), Some(1.0));
        factory.shutdown();
    }

    #[test]
    fn pareto_front_excludes_dominated_individuals() {
        // x=0 dominates everything else for minimizing x^2 with a single objective
        // collapsed to two identical objectives so pareto logic still exercises.
        let mut population = Population::new(vec![evaluated(0.0), evaluated(1.0), evaluated(2.0)], 1).unwrap();
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig { start_seed: Some(22), ..Default::default() }).unwrap();
        let mut rng = RandomProxy::new(factory.clone());
        select(&mut population, SortingMode::MuPlusLambdaPareto, &mut rng);
        assert_eq!(population.individuals()[0].primary_transformed_fitness(), Some(0.0));
        factory.shutdown();
    }
}
