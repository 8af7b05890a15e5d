//! Engine configuration and the validating builder (§6 configuration
//! surface).

use geneva_error::{GenevaResult, ensure};
use std::time::Duration;

/// One of the five selection schemes of §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortingMode {
    MuPlusLambda,
    MuCommaLambda,
    MuOnePretain,
    MuPlusLambdaPareto,
    MuCommaLambdaPareto,
}

/// The `recombination_method` config key (§4.7 "recombine").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicationScheme {
    Random,
    Value,
    Amalgamation,
}

/// Engine-wide configuration, shared by the EA and SA specializations.
/// Built only through [`EngineConfigBuilder`], which fails fast on malformed
/// input rather than letting the engine panic mid-run (§7).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub n_evaluation_threads: u16,
    pub population_size: usize,
    pub n_parents: usize,
    pub max_iteration: u32,
    pub max_stall_iteration: u32,
    pub max_duration: Option<Duration>,
    pub quality_threshold: Option<f64>,
    pub report_iteration: u32,
    pub sorting_mode: SortingMode,
    pub recombination_method: DuplicationScheme,
    pub amalgamation_likelihood: f64,
    pub growth_rate: usize,
    pub max_population_size: usize,
    pub cp_interval: i32,
    pub cp_base_name: String,
    pub cp_directory: String,
    pub maximize: bool,
}

/// Builds an [`EngineConfig`], validating the population/selection
/// invariants named in §6 rather than deferring the failure to first use.
pub struct EngineConfigBuilder {
    n_evaluation_threads: u16,
    population_size: usize,
    n_parents: usize,
    max_iteration: u32,
    max_stall_iteration: u32,
    max_duration: Option<Duration>,
    quality_threshold: Option<f64>,
    report_iteration: u32,
    sorting_mode: SortingMode,
    recombination_method: DuplicationScheme,
    amalgamation_likelihood: f64,
    growth_rate: usize,
    max_population_size: usize,
    cp_interval: i32,
    cp_base_name: String,
    cp_directory: String,
    maximize: bool,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self {
            n_evaluation_threads: std::thread::available_parallelism()
                .map(|n| n.get() as u16)
                .unwrap_or(1),
            population_size: 20,
            n_parents: 4,
            max_iteration: 1000,
            max_stall_iteration: 0,
            max_duration: None,
            quality_threshold: None,
            report_iteration: 0,
            sorting_mode: SortingMode::MuPlusLambda,
            recombination_method: DuplicationScheme::Random,
            amalgamation_likelihood: 0.0,
            growth_rate: 0,
            max_population_size: 0,
            cp_interval: 0,
            cp_base_name: "geneva".to_string(),
            cp_directory: ".".to_string(),
            maximize: false,
        }
    }
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_evaluation_threads(mut self, v: u16) -> Self {
        self.n_evaluation_threads = v;
        self
    }

    pub fn population_size(mut self, v: usize) -> Self {
        self.population_size = v;
        self
    }

    pub fn n_parents(mut self, v: usize) -> Self {
        self.n_parents = v;
        self
    }

    pub fn max_iteration(mut self, v: u32) -> Self {
        self.max_iteration = v;
        self
    }

    pub fn max_stall_iteration(mut self, v: u32) -> Self {
        self.max_stall_iteration = v;
        self
    }

    pub fn max_duration(mut self, v: Duration) -> Self {
        self.max_duration = Some(v);
        self
    }

    pub fn quality_threshold(mut self, v: f64) -> Self {
        self.quality_threshold = Some(v);
        self
    }

    pub fn report_iteration(mut self, v: u32) -> Self {
        self.report_iteration = v;
        self
    }

    pub fn sorting_mode(mut self, v: SortingMode) -> Self {
        self.sorting_mode = v;
        self
    }

    pub fn recombination_method(mut self, v: DuplicationScheme) -> Self {
        self.recombination_method = v;
        self
    }

    pub fn amalgamation_likelihood(mut self, v: f64) -> Self {
        self.amalgamation_likelihood = v;
        self
    }

    pub fn growth(mut self, growth_rate: usize, max_population_size: usize) -> Self {
        self.growth_rate = growth_rate;
        self.max_population_size = max_population_size;
        self
    }

    pub fn cp_interval(mut self, v: i32) -> Self {
        self.cp_interval = v;
        self
    }

    pub fn cp_location(mut self, base_name: impl Into<String>, directory: impl Into<String>) -> Self {
        self.cp_base_name = base_name.into();
        self.cp_directory = directory.into();
        self
    }

    pub fn maximize(mut self, v: bool) -> Self {
        self.maximize = v;
        self
    }

    pub fn build(self) -> GenevaResult<EngineConfig> {
        ensure!(
            self.population_size > 0,
            InvalidConfig: "population_size must be positive"
        );
        ensure!(
            self.n_parents > 0 && self.n_parents < self.population_size,
            InvalidConfig: "n_parents ({}) must be in (0, population_size ({}))", self.n_parents, self.population_size
        );
        if matches!(
            self.sorting_mode,
            SortingMode::MuCommaLambda | SortingMode::MuOnePretain | SortingMode::MuCommaLambdaPareto
        ) {
            ensure!(
                2 * self.n_parents <= self.population_size,
                InvalidConfig: "2 * n_parents ({}) must be <= population_size ({}) for this sorting mode", 2 * self.n_parents, self.population_size
            );
        }
        ensure!(
            (0.0..=1.0).contains(&self.amalgamation_likelihood),
            InvalidConfig: "amalgamation_likelihood must be a probability"
        );
        ensure!(
            self.growth_rate == 0 || self.max_population_size >= self.population_size,
            InvalidConfig: "max_population_size must be >= population_size when growth_rate is set"
        );

        Ok(EngineConfig {
            n_evaluation_threads: self.n_evaluation_threads.max(1),
            population_size: self.population_size,
            n_parents: self.n_parents,
            max_iteration: self.max_iteration,
            max_stall_iteration: self.max_stall_iteration,
            max_duration: self.max_duration,
            quality_threshold: self.quality_threshold,
            report_iteration: self.report_iteration,
            sorting_mode: self.sorting_mode,
            recombination_method: self.recombination_method,
            amalgamation_likelihood: self.amalgamation_likelihood,
            growth_rate: self.growth_rate,
            max_population_size: self.max_population_size,
            cp_interval: self.cp_interval,
            cp_base_name: self.cp_base_name,
            cp_directory: self.cp_directory,
            maximize: self.maximize,
        })
    }
}
