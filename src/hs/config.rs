//! Harmony Search configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::HarmonyRates;
use crate::simulator::SimulationConfig;

/// Configuration for the Harmony Search driver.
///
/// # Examples
///
/// ```
/// use u_harmony::hs::HsConfig;
///
/// let config = HsConfig::default()
///     .with_memory_size(20)
///     .with_max_iterations(200)
///     .with_consideration_rate(0.85)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HsConfig {
    /// Harmony Memory capacity. `None` scales with the problem size.
    pub memory_size: Option<usize>,

    /// Iteration budget. `None` scales with the problem size.
    pub max_iterations: Option<usize>,

    /// Initial harmony consideration and pitch adjustment rates.
    pub rates: HarmonyRates,

    /// Improvised candidates per iteration before any restart.
    ///
    /// Each restart lowers the count by one, never below 3.
    pub candidates_per_iteration: usize,

    /// Probability of locally refining each candidate.
    pub refine_probability: f64,

    /// Operations inspected by one local refinement.
    pub refine_sample_size: usize,

    /// Probability of hybridizing the batch best with the global best.
    pub hybridize_probability: f64,

    /// Memory reseeds allowed before stagnation may stop the search.
    pub max_restarts: usize,

    /// Iterations between diversity-based rate adjustments. 0 disables.
    pub tuning_interval: usize,

    /// Stagnant iterations after which a small instance stops.
    pub early_stop_threshold: usize,

    /// Problems with a data size below this count as small.
    pub small_instance_limit: usize,

    /// Whether to improvise and evaluate candidates in parallel using rayon.
    ///
    /// Only effective with the `parallel` feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    /// Fitness evaluation settings.
    pub simulation: SimulationConfig,
}

impl Default for HsConfig {
    fn default() -> Self {
        Self {
            memory_size: None,
            max_iterations: None,
            rates: HarmonyRates::default(),
            candidates_per_iteration: 5,
            refine_probability: 0.3,
            refine_sample_size: 5,
            hybridize_probability: 0.4,
            max_restarts: 2,
            tuning_interval: 10,
            early_stop_threshold: 5,
            small_instance_limit: 50,
            parallel: true,
            seed: None,
            simulation: SimulationConfig::default(),
        }
    }
}

impl HsConfig {
    pub fn with_memory_size(mut self, size: usize) -> Self {
        self.memory_size = Some(size);
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn with_consideration_rate(mut self, rate: f64) -> Self {
        self.rates.consideration = rate;
        self
    }

    pub fn with_pitch_adjustment_rate(mut self, rate: f64) -> Self {
        self.rates.pitch_adjustment = rate;
        self
    }

    pub fn with_candidates_per_iteration(mut self, n: usize) -> Self {
        self.candidates_per_iteration = n;
        self
    }

    pub fn with_refinement(mut self, probability: f64, sample_size: usize) -> Self {
        self.refine_probability = probability;
        self.refine_sample_size = sample_size;
        self
    }

    pub fn with_hybridize_probability(mut self, p: f64) -> Self {
        self.hybridize_probability = p;
        self
    }

    pub fn with_max_restarts(mut self, n: usize) -> Self {
        self.max_restarts = n;
        self
    }

    pub fn with_tuning_interval(mut self, n: usize) -> Self {
        self.tuning_interval = n;
        self
    }

    pub fn with_early_stop(mut self, threshold: usize, small_instance_limit: usize) -> Self {
        self.early_stop_threshold = threshold;
        self.small_instance_limit = small_instance_limit;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    /// Memory size and iteration budget for a problem of `data_size`
    /// entities, honoring explicit settings.
    ///
    /// | data size | memory | iterations |
    /// |-----------|--------|------------|
    /// | < 50      | 10     | 10         |
    /// | < 100     | 20     | 20         |
    /// | otherwise | 30     | 100        |
    pub fn resolve(&self, data_size: usize) -> (usize, usize) {
        let (memory, iterations) = match data_size {
            0..50 => (10, 10),
            50..100 => (20, 20),
            _ => (30, 100),
        };
        (
            self.memory_size.unwrap_or(memory),
            self.max_iterations.unwrap_or(iterations),
        )
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.memory_size == Some(0) {
            return Err("memory_size must be at least 1".into());
        }
        for (name, p) in [
            ("consideration_rate", self.rates.consideration),
            ("pitch_adjustment_rate", self.rates.pitch_adjustment),
            ("refine_probability", self.refine_probability),
            ("hybridize_probability", self.hybridize_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        if self.candidates_per_iteration == 0 {
            return Err("candidates_per_iteration must be at least 1".into());
        }
        self.simulation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = HsConfig::default();
        assert_eq!(c.rates.consideration, 0.9);
        assert_eq!(c.rates.pitch_adjustment, 0.3);
        assert_eq!(c.candidates_per_iteration, 5);
        assert_eq!(c.max_restarts, 2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_resolve_tiers() {
        let c = HsConfig::default();
        assert_eq!(c.resolve(0), (10, 10));
        assert_eq!(c.resolve(49), (10, 10));
        assert_eq!(c.resolve(50), (20, 20));
        assert_eq!(c.resolve(99), (20, 20));
        assert_eq!(c.resolve(100), (30, 100));
        assert_eq!(c.resolve(5000), (30, 100));
    }

    #[test]
    fn test_resolve_explicit() {
        let c = HsConfig::default().with_memory_size(4).with_max_iterations(7);
        assert_eq!(c.resolve(500), (4, 7));
    }

    #[test]
    fn test_validate() {
        assert!(HsConfig::default().with_memory_size(0).validate().is_err());
        assert!(HsConfig::default()
            .with_consideration_rate(1.2)
            .validate()
            .is_err());
        assert!(HsConfig::default()
            .with_pitch_adjustment_rate(f64::NAN)
            .validate()
            .is_err());
        assert!(HsConfig::default()
            .with_candidates_per_iteration(0)
            .validate()
            .is_err());
        assert!(HsConfig::default()
            .with_simulation(SimulationConfig::default().with_horizon_days(0))
            .validate()
            .is_err());
    }
}
