//! The parent-child base loop phases shared by [`crate::ea::EaEngine`] and
//! [`crate::sa::SaEngine`] (§4.7): `init`, `grow?`, `adapt`, `evaluate` +
//! `post`, `halt?`, and `finalize`. `recombine` and `select` live in their
//! own modules since each algorithm picks a different scheme for them.

use crate::config::EngineConfig;
use geneva_alters::adapt_set;
use geneva_core::domain::thread_pool::ThreadPool;
use geneva_core::{Individual, PersonalityTraits, Population, Problem, RandomProxy};
use geneva_error::{GenevaResult, geneva_bail};
use std::time::Instant;

/// **init**: resizes to `population_size` clones of `template`, each
/// re-initialized to a random point in its own bounds, every slot tagged a
/// child (§4.7).
pub fn init_population(template: &Individual, config: &EngineConfig, rng: &mut RandomProxy) -> GenevaResult<Population> {
    let mut individuals = Vec::with_capacity(config.population_size);
    for _ in 0..config.population_size {
        let mut ind = template.clone();
        ind.parameters_mut().random_init(rng);
        ind.traits_mut().is_parent = false;
        individuals.push(ind);
    }
    Population::new(individuals, config.n_parents)
}

/// **grow?**: appends `growth_rate` re-initialized clones of the last slot
/// when the resulting size would not exceed `max_population_size`.
pub fn grow(population: &mut Population, config: &EngineConfig, rng: &mut RandomProxy) {
    if config.growth_rate == 0 {
        return;
    }
    let next_size = population.len() + config.growth_rate;
    if next_size > config.max_population_size {
        return;
    }
    let Some(template) = population.individuals().last().cloned() else {
        return;
    };
    for _ in 0..config.growth_rate {
        let mut clone = template.clone();
        clone.parameters_mut().random_init(rng);
        population.individuals_mut().push(clone);
    }
    population.set_default_n_children(population.default_n_children() + config.growth_rate);
}

/// **adapt**: mutates every child's parameters in parallel, each task
/// drawing from its own thread-local random proxy (§4.6, §5). A worker task
/// that panics surfaces here as a `ThreadPool` error rather than unwinding
/// into the driver.
pub fn adapt_phase(population: &mut Population, pool: &ThreadPool) -> GenevaResult<()> {
    let n_parents = population.n_parents();
    let children = population.individuals_mut().split_off(n_parents);

    let handles: Vec<_> = children
        .into_iter()
        .map(|mut ind| {
            pool.schedule(move || {
                let mut rng = RandomProxy::from_global();
                adapt_set(ind.parameters_mut(), &mut rng);
                ind
            })
        })
        .collect();
    pool.drain_queue();

    let mut adapted = Vec::with_capacity(handles.len());
    for handle in handles {
        adapted.push(handle.result()?);
    }
    population.individuals_mut().extend(adapted);
    Ok(())
}

/// **evaluate** + **post**: submits every individual in
/// [`Population::evaluation_range`] to the pool, drops any that errored, and
/// pads shortfalls with clones of the best-available already-evaluated
/// individual. A shortfall with no evaluated candidate to pad from is fatal
/// (§4.7, §7).
pub fn evaluate_phase(population: &mut Population, problem: &Problem, pool: &ThreadPool) -> GenevaResult<()> {
    let range = population.evaluation_range();
    let expected = range.len();
    let tail = population.individuals_mut().split_off(range.start);

    let handles: Vec<_> = tail
        .into_iter()
        .map(|ind| {
            let problem = problem.clone();
            pool.schedule(move || ind.evaluate(&problem))
        })
        .collect();
    pool.drain_queue();

    let mut survivors = Vec::with_capacity(expected);
    for handle in handles {
        let (ind, err) = handle.result()?;
        match err {
            Some(err) => tracing::warn!(%err, "individual evaluation failed, dropping"),
            None => survivors.push(ind),
        }
    }

    if survivors.len() < expected {
        let pad_candidate = survivors
            .iter()
            .chain(population.individuals().iter())
            .filter(|ind| !ind.is_dirty())
            .min_by(|a, b| best_first_fitness(a).partial_cmp(&best_first_fitness(b)).unwrap())
            .cloned();

        match pad_candidate {
            Some(best) => {
                while survivors.len() < expected {
                    survivors.push(best.clone());
                }
            }
            None => geneva_bail!(Engine: "evaluation phase produced no usable individual to pad the population with"),
        }
    }

    population.individuals_mut().extend(survivors);
    Ok(())
}

fn best_first_fitness(ind: &Individual) -> f64 {
    ind.primary_transformed_fitness().unwrap_or(f64::INFINITY)
}

/// `actOnStalls`: on a stalled iteration, resets every non-best parent's
/// `ad_prob` to its construction-time value, leaving the best parent's
/// settings untouched (§4.7 "Stall accounting").
pub fn act_on_stalls(population: &mut Population) {
    let n_parents = population.n_parents();
    for parent in &mut population.individuals_mut()[1..n_parents] {
        for leaf in parent.parameters_mut().iter_mut() {
            leaf.adaptor_mut().update_on_stall();
        }
    }
}

/// **halt?**: iteration/stall/duration/quality-threshold checks plus the
/// `SIGHUP` flag (§4.7, §6).
pub fn should_halt(population: &Population, config: &EngineConfig, started_at: Instant, signalled: bool) -> bool {
    if config.max_iteration > 0 && population.iteration() >= config.max_iteration {
        return true;
    }
    if config.max_stall_iteration > 0 && population.stall_counter() >= config.max_stall_iteration {
        return true;
    }
    if matches!(config.max_duration, Some(d) if started_at.elapsed() >= d) {
        return true;
    }
    if let Some(threshold) = config.quality_threshold {
        if let Some(best_raw) = population.best_parent().fitness().first().copied() {
            let crossed = if config.maximize { best_raw >= threshold } else { best_raw <= threshold };
            if crossed {
                return true;
            }
        }
    }
    signalled
}

/// **finalize**: clears every individual's algorithm-specific traits. The
/// thread pool itself is torn down by its own `Drop` when the engine goes
/// out of scope.
pub fn clear_traits(population: &mut Population) {
    for ind in population.individuals_mut() {
        ind.replace_traits(PersonalityTraits::default());
    }
}

/// Starts the clock `should_halt`'s `max_duration` check measures against.
pub fn now() -> Instant {
    Instant::now()
}

/// Logs progress every `report_iteration` iterations (`0` disables it
/// entirely), at `info` level so a driver doesn't need its own reporting
/// loop just to see the run is alive.
pub fn report_progress(population: &Population, config: &EngineConfig) {
    if config.report_iteration == 0 || population.iteration() % config.report_iteration != 0 {
        return;
    }
    tracing::info!(
        iteration = population.iteration(),
        best_ever = ?population.best_ever(),
        stall_counter = population.stall_counter(),
        "optimization progress"
    );
}
