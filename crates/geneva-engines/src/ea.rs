//! The Evolutionary Algorithm specialization of the parent-child base loop
//! (§4.8): base loop phases plus one of the five [`SortingMode`] selection
//! schemes.

use crate::base;
use crate::checkpoint::{self, CheckpointWriter};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::recombine::recombine;
use crate::select::select;
use crate::signal::SignalFlag;
use geneva_core::domain::thread_pool::ThreadPool;
use geneva_core::{Individual, Population, Problem, RandomProxy};
use geneva_error::GenevaResult;
use std::time::Instant;

/// One generation's outcome, enough for a caller to log progress or decide
/// whether to keep running via [`crate::engine::EngineExt::run`].
#[derive(Debug, Clone)]
pub struct EaEpoch {
    pub iteration: u32,
    pub best_ever: Option<f64>,
    pub stalled: bool,
    pub halted: bool,
}

/// Drives the EA parent-child loop for a single [`Problem`].
pub struct EaEngine {
    config: EngineConfig,
    problem: Problem,
    population: Population,
    pool: ThreadPool,
    rng: RandomProxy,
    started_at: Instant,
    signal: SignalFlag,
    checkpoint: Option<CheckpointWriter>,
}

impl EaEngine {
    /// Builds a fresh engine: validates `config` implicitly via its own
    /// construction, spins up the evaluation pool, and seeds the initial
    /// population from re-initialized clones of `template` (§4.7 "init").
    pub fn new(template: Individual, problem: Problem, config: EngineConfig) -> GenevaResult<Self> {
        let mut rng = RandomProxy::from_global();
        let population = base::init_population(&template, &config, &mut rng)?;
        let pool = ThreadPool::new(config.n_evaluation_threads as usize);
        let checkpoint = checkpoint::CheckpointWriter::from_config(&config);

        Ok(Self {
            config,
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

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Engine for EaEngine {
    type Epoch = EaEpoch;

    fn next(&mut self) -> GenevaResult<EaEpoch> {
        base::grow(&mut self.population, &self.config, &mut self.rng);
        recombine(
            &mut self.population,
            self.config.recombination_method,
            self.config.amalgamation_likelihood,
            &mut self.rng,
        )?;
        base::adapt_phase(&mut self.population, &self.pool)?;
        base::evaluate_phase(&mut self.population, &self.problem, &self.pool)?;
        select(&mut self.population, self.config.sorting_mode, &mut self.rng);

        let stalled = self.population.record_best();
        if stalled {
            base::act_on_stalls(&mut self.population);
        }

        if let Some(writer) = &self.checkpoint {
            writer.maybe_write(&self.population, !stalled, None)?;
        }

        self.population.advance_iteration();
        base::report_progress(&self.population, &self.config);
        let halted = base::should_halt(&self.population, &self.config, self.started_at, self.signal.is_set());

        Ok(EaEpoch {
            iteration: self.population.iteration(),
            best_ever: self.population.best_ever(),
            stalled,
            halted,
        })
    }
}

impl Drop for EaEngine {
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
        let leaves = (0..3)
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
    fn runs_until_max_iteration_and_improves_best_ever() {
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig {
            start_seed: Some(41),
            ..Default::default()
        })
        .unwrap();

        let config = EngineConfigBuilder::new()
            .population_size(8)
            .n_parents(2)
            .max_iteration(10)
            .sorting_mode(SortingMode::MuPlusLambda)
            .recombination_method(DuplicationScheme::Value)
            .build()
            .unwrap();

        let mut engine = EaEngine::new(sphere_template(), sphere_problem(), config).unwrap();
        let epoch = engine.run(|e| e.halted).unwrap();
        assert_eq!(epoch.iteration, 10);
        assert!(epoch.best_ever.is_some());

        factory.shutdown();
    }
}
