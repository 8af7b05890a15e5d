//! The Simulated Annealing specialization of the parent-child base loop
//! (§4.9): base loop phases plus Metropolis-acceptance selection and a
//! cooling schedule.

use crate::base;
use crate::checkpoint::{self, CheckpointWriter};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::recombine::recombine;
use crate::select::best_first;
use crate::signal::SignalFlag;
use geneva_core::domain::thread_pool::ThreadPool;
use geneva_core::random::uniform_real;
use geneva_core::{Individual, Population, Problem, RandomProxy};
use geneva_error::{GenevaResult, ensure};
use std::time::Instant;

/// `t0`/`alpha` — the SA-only knobs §9 keeps out of [`EngineConfig`] since
/// no other sorting mode has a notion of temperature.
#[derive(Debug, Clone, Copy)]
pub struct SaConfig {
    pub t0: f64,
    pub alpha: f64,
}

impl SaConfig {
    pub fn new(t0: f64, alpha: f64) -> GenevaResult<Self> {
        ensure!(t0 > 0.0, InvalidConfig: "t0 ({}) must be positive", t0);
        ensure!((0.0..1.0).contains(&alpha), InvalidConfig: "alpha ({}) must lie in (0, 1)", alpha);
        Ok(Self { t0, alpha })
    }
}

#[derive(Debug, Clone)]
pub struct SaEpoch {
    pub iteration: u32,
    pub best_ever: Option<f64>,
    pub temperature: f64,
    pub halted: bool,
}

pub struct SaEngine {
    config: EngineConfig,
    sa: SaConfig,
    problem: Problem,
    population: Population,
    pool: ThreadPool,
    rng: RandomProxy,
    temperature: f64,
    started_at: Instant,
    signal: SignalFlag,
    checkpoint: Option<CheckpointWriter>,
}

impl SaEngine {
    pub fn new(template: Individual, problem: Problem, config: EngineConfig, sa: SaConfig) -> GenevaResult<Self> {
        let mut rng = RandomProxy::from_global();
        let population = base::init_population(&template, &config, &mut rng)?;
        let pool = ThreadPool::new(config.n_evaluation_threads as usize);
        let checkpoint = checkpoint::CheckpointWriter::from_config(&config);

        Ok(Self {
            temperature: sa.t0,
            config,
            sa,
            problem,
            population,
            pool,
            rng,
            started_at: base::now(),
            signal: SignalFlag::global(),
            checkpoint,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// `resetToOptimizationStart`: restores the starting temperature.
    pub fn reset_temperature(&mut self) {
        self.temperature = self.sa.t0;
    }
}

/// Metropolis-acceptance selection (§4.9 steps 1-3). Sorts the child section
/// ascending by transformed fitness, and lets each of the best `n_parents`
/// children compete against the parent in the same slot; a better child
/// always wins, a worse one wins with probability `exp(-Δ/T)`.
fn metropolis_select(population: &mut Population, temperature: f64, rng: &mut RandomProxy) {
    let n_parents = population.n_parents();
    population.children_mut().sort_by(best_first);

    let contenders = n_parents.min(population.children().len());
    for i in 0..contenders {
        let parent_fitness = population.individuals()[i].primary_transformed_fitness().unwrap_or(f64::INFINITY);
        let child: Individual = population.individuals()[n_parents + i].clone();
        let child_fitness = child.primary_transformed_fitness().unwrap_or(f64::INFINITY);
        let delta = child_fitness - parent_fitness;

        let accept = if delta <= 0.0 {
            true
        } else {
            let p = (-delta / temperature).exp();
            uniform_real(rng, 0.0, 1.0) < p
        };

        if accept {
            population.individuals_mut()[i] = child;
        }
    }

    population.individuals_mut()[..n_parents].sort_by(best_first);
    population.trim_to_nominal_size();
}

impl Engine for SaEngine {
    type Epoch = SaEpoch;

    fn next(&mut self) -> GenevaResult<SaEpoch> {
        base::grow(&mut self.population, &self.config, &mut self.rng);
        recombine(
            &mut self.population,
            self.config.recombination_method,
            self.config.amalgamation_likelihood,
            &mut self.rng,
        )?;
        base::adapt_phase(&mut self.population, &self.pool)?;
        base::evaluate_phase(&mut self.population, &self.problem, &self.pool)?;
        metropolis_select(&mut self.population, self.temperature, &mut self.rng);

        let stalled = self.population.record_best();
        if stalled {
            base::act_on_stalls(&mut self.population);
        }

        if let Some(writer) = &self.checkpoint {
            writer.maybe_write(&self.population, !stalled, Some(self.temperature))?;
        }

        self.temperature *= self.sa.alpha;
        self.population.advance_iteration();
        base::report_progress(&self.population, &self.config);
        let halted = base::should_halt(&self.population, &self.config, self.started_at, self.signal.is_set());

        Ok(SaEpoch {
            iteration: self.population.iteration(),
            best_ever: self.population.best_ever(),
            temperature: self.temperature,
            halted,
        })
    }
}

impl Drop for SaEngine {
    fn drop(&mut self) {
        base::clear_traits(&mut self.population);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicationScheme, EngineConfigBuilder, SortingMode};
    use crate::engine::EngineExt;
    use geneva_core::objectives::Optimize;
    use geneva_core::param::leaf::DoubleParam;
    use geneva_core::param::{Adaptor, AdaptionMode, AdaptorState, ParameterLeaf};
    use geneva_core::{FactoryConfig, ParameterSet, RandomFactory};
    use std::sync::Mutex;

    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn identity_adaptor() -> Adaptor {
        let state = AdaptorState::new(0.0, 0.0, 1.0, 0.0, AdaptionMode::Never, 0, 0.0).unwrap();
        Adaptor::identity(state).unwrap()
    }

    fn sphere_template() -> Individual {
        let leaves = (0..2)
            .map(|_| ParameterLeaf::Double(DoubleParam::new(0.0, -5.0, 5.0, identity_adaptor()).unwrap()))
            .collect();
        Individual::new(ParameterSet::new(leaves))
    }

    fn sphere_problem() -> Problem {
        Problem::new(
            |p: &ParameterSet| Ok(vec![p.streamline_doubles().iter().map(|v| v * v).sum()]),
            Optimize::Minimize,
        )
    }

    #[test]
    fn temperature_cools_geometrically_each_iteration() {
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig {
            start_seed: Some(51),
            ..Default::default()
        })
        .unwrap();

        let config = EngineConfigBuilder::new()
            .population_size(6)
            .n_parents(2)
            .max_iteration(3)
            .sorting_mode(SortingMode::MuPlusLambda)
            .recombination_method(DuplicationScheme::Random)
            .build()
            .unwrap();
        let sa = SaConfig::new(10.0, 0.9).unwrap();

        let mut engine = SaEngine::new(sphere_template(), sphere_problem(), config, sa).unwrap();
        let epoch = engine.run(|e| e.halted).unwrap();
        assert_eq!(epoch.iteration, 3);
        assert!((epoch.temperature - 10.0 * 0.9f64.powi(3)).abs() < 1e-9);

        factory.shutdown();
    }

    #[test]
    fn reset_temperature_restores_t0() {
        assert!(SaConfig::new(0.0, 0.9).is_err());
        assert!(SaConfig::new(1.0, 1.0).is_err());
    }
}
