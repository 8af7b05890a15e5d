//! Seed-fixed end-to-end scenarios exercising both engines against the
//! classic benchmark objectives they're built for.

use geneva::prelude::*;
use geneva_core::param::leaf::{BoolParam, DoubleParam};
use geneva_core::param::{Adaptor, AdaptionMode, AdaptorState, GaussianExtra, ParameterLeaf};
use std::sync::Mutex;

// `RandomFactory` is a process-wide singleton; serialize every test in this
// binary on a local lock rather than let them race for the global slot.
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn gaussian_adaptor(ad_prob: f64, sigma: f64, sigma_sigma: f64, min_sigma: f64) -> Adaptor {
    let state = AdaptorState::new(ad_prob, 0.0, 1.0, 0.0, AdaptionMode::Always, 0, 0.0).unwrap();
    let gaussian = GaussianExtra::new(sigma, sigma_sigma, min_sigma, f64::MAX).unwrap();
    Adaptor::gaussian(state, gaussian)
}

fn flip_bool_adaptor(ad_prob: f64) -> Adaptor {
    let state = AdaptorState::new(ad_prob, 0.0, 1.0, 0.0, AdaptionMode::Probabilistic, 0, 0.0).unwrap();
    Adaptor::flip_bool(state)
}

#[test]
fn one_dimensional_parabola_converges_under_ea() {
    let _serial = TEST_LOCK.lock().unwrap();
    let factory = RandomFactory::init(FactoryConfig {
        start_seed: Some(1001),
        ..Default::default()
    })
    .unwrap();

    let leaf = ParameterLeaf::Double(DoubleParam::new(5.0, -10.0, 10.0, gaussian_adaptor(1.0, 0.5, 0.05, 0.02)).unwrap());
    let template = Individual::new(ParameterSet::new(vec![leaf]));
    let problem = Problem::new(
        |p: &ParameterSet| Ok(vec![p.streamline_doubles()[0].powi(2)]),
        Optimize::Minimize,
    );
    let config = EngineConfigBuilder::new()
        .population_size(10)
        .n_parents(2)
        .max_iteration(200)
        .sorting_mode(SortingMode::MuPlusLambda)
        .recombination_method(DuplicationScheme::Random)
        .build()
        .unwrap();

    let mut engine = EaEngine::new(template, problem, config).unwrap();
    let epoch = engine.run(|e| e.halted).unwrap();
    assert_eq!(epoch.iteration, 200);

    let best = engine.population().best_parent();
    let x = best.parameters().streamline_doubles()[0];
    assert!(x.abs() < 0.05, "|x| = {x}");
    assert!(best.fitness()[0] < 0.0025, "f(x) = {}", best.fitness()[0]);

    factory.shutdown();
}

#[test]
fn rosenbrock_five_dimensional_converges_under_mu_comma_lambda() {
    let _serial = TEST_LOCK.lock().unwrap();
    let factory = RandomFactory::init(FactoryConfig {
        start_seed: Some(1002),
        ..Default::default()
    })
    .unwrap();

    let leaves = (0..5)
        .map(|_| ParameterLeaf::Double(DoubleParam::new(0.0, -5.0, 5.0, gaussian_adaptor(1.0, 0.3, 0.03, 0.01)).unwrap()))
        .collect();
    let template = Individual::new(ParameterSet::new(leaves));
    let problem = Problem::new(
        |p: &ParameterSet| {
            let x = p.streamline_doubles();
            let sum: f64 = (0..x.len() - 1)
                .map(|i| 100.0 * (x[i + 1] - x[i].powi(2)).powi(2) + (1.0 - x[i]).powi(2))
                .sum();
            Ok(vec![sum])
        },
        Optimize::Minimize,
    );
    let config = EngineConfigBuilder::new()
        .population_size(50)
        .n_parents(5)
        .max_iteration(1000)
        .sorting_mode(SortingMode::MuCommaLambda)
        .recombination_method(DuplicationScheme::Random)
        .build()
        .unwrap();

    let mut engine = EaEngine::new(template, problem, config).unwrap();
    let epoch = engine.run(|e| e.halted).unwrap();
    assert_eq!(epoch.iteration, 1000);
    assert!(epoch.best_ever.unwrap() < 0.1, "best = {:?}", epoch.best_ever);

    factory.shutdown();
}

#[test]
fn bitstring_maximization_reaches_all_true() {
    let _serial = TEST_LOCK.lock().unwrap();
    let factory = RandomFactory::init(FactoryConfig {
        start_seed: Some(1003),
        ..Default::default()
    })
    .unwrap();

    let leaves = (0..20)
        .map(|_| ParameterLeaf::Bool(BoolParam::new(false, flip_bool_adaptor(0.1))))
        .collect();
    let template = Individual::new(ParameterSet::new(leaves));
    let problem = Problem::new(
        |p: &ParameterSet| Ok(vec![p.streamline_bools().iter().filter(|b| **b).count() as f64]),
        Optimize::Maximize,
    );
    let config = EngineConfigBuilder::new()
        .population_size(20)
        .n_parents(4)
        .max_iteration(100)
        .sorting_mode(SortingMode::MuPlusLambda)
        .recombination_method(DuplicationScheme::Random)
        .maximize(true)
        .build()
        .unwrap();

    let mut engine = EaEngine::new(template, problem, config).unwrap();
    let epoch = engine.run(|e| e.halted).unwrap();
    assert_eq!(epoch.iteration, 100);
    assert_eq!(engine.population().best_parent().fitness()[0], 20.0);

    factory.shutdown();
}

#[test]
fn noisy_parabola_converges_under_simulated_annealing() {
    let _serial = TEST_LOCK.lock().unwrap();
    let factory = RandomFactory::init(FactoryConfig {
        start_seed: Some(1004),
        ..Default::default()
    })
    .unwrap();

    let leaf = ParameterLeaf::Double(DoubleParam::new(5.0, -10.0, 10.0, gaussian_adaptor(1.0, 0.5, 0.05, 0.02)).unwrap());
    let template = Individual::new(ParameterSet::new(vec![leaf]));
    let problem = Problem::new(
        |p: &ParameterSet| {
            let x = p.streamline_doubles()[0];
            let mut rng = RandomProxy::from_global();
            let noise = geneva_core::random::gaussian(&mut rng, 0.0, 0.1);
            Ok(vec![x * x + noise])
        },
        Optimize::Minimize,
    );
    let config = EngineConfigBuilder::new()
        .population_size(10)
        .n_parents(2)
        .max_iteration(500)
        .recombination_method(DuplicationScheme::Random)
        .build()
        .unwrap();
    let sa = SaConfig::new(1.0, 0.95).unwrap();

    let mut engine = SaEngine::new(template, problem, config, sa).unwrap();
    let epoch = engine.run(|e| e.halted).unwrap();
    assert_eq!(epoch.iteration, 500);

    let x = engine.population().best_parent().parameters().streamline_doubles()[0];
    assert!(x.abs() < 0.2, "|x| = {x}");

    factory.shutdown();
}

#[test]
fn pareto_front_spans_the_two_objective_segment() {
    let _serial = TEST_LOCK.lock().unwrap();
    let factory = RandomFactory::init(FactoryConfig {
        start_seed: Some(1005),
        ..Default::default()
    })
    .unwrap();

    let leaves = (0..2)
        .map(|_| ParameterLeaf::Double(DoubleParam::new(0.0, -5.0, 5.0, gaussian_adaptor(1.0, 0.4, 0.04, 0.01)).unwrap()))
        .collect();
    let template = Individual::new(ParameterSet::new(leaves));
    let problem = Problem::new(
        |p: &ParameterSet| {
            let x = p.streamline_doubles()[0];
            Ok(vec![x.powi(2), (x - 2.0).powi(2)])
        },
        Optimize::Minimize,
    );
    let config = EngineConfigBuilder::new()
        .population_size(40)
        .n_parents(10)
        .max_iteration(50)
        .sorting_mode(SortingMode::MuPlusLambdaPareto)
        .recombination_method(DuplicationScheme::Random)
        .build()
        .unwrap();

    let mut engine = EaEngine::new(template, problem, config).unwrap();
    let epoch = engine.run(|e| e.halted).unwrap();
    assert_eq!(epoch.iteration, 50);

    let n_parents = engine.config().n_parents;
    for parent in &engine.population().individuals()[..n_parents] {
        let x = parent.parameters().streamline_doubles()[0];
        assert!((-1e-6..=2.0 + 1e-6).contains(&x), "x out of pareto segment: {x}");
    }

    factory.shutdown();
}

#[test]
fn boundary_folding_matches_the_piecewise_definition() {
    use geneva_core::param::fold_double;
    let cases = [(-5.0, 3.0), (-1.0, -1.0), (0.0, 0.0), (3.0, 3.0), (7.0, -1.0), (11.0, 3.0)];
    for (v, expected) in cases {
        assert_eq!(fold_double(v, -1.0, 3.0), expected, "v = {v}");
    }
}
