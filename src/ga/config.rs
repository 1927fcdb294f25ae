//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use std::time::Duration;

use crate::error::{MmacError, Result};
use crate::random::DEFAULT_SEED;

/// Configuration for the Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use mmac_heur::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 200);
/// assert_eq!(config.selected_size, 40);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use mmac_heur::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(100)
///     .with_selected_size(20)
///     .with_seed(7)
///     .with_max_generations(50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Number of tournament winners per generation. Each pair of winners
    /// produces two children, so up to twice this many offspring compete
    /// for replacement.
    pub selected_size: usize,

    /// Individuals drawn per tournament.
    pub tournament_size: usize,

    /// Stagnation limit on the largest instances (about 2000 edges).
    pub min_stagnation: usize,

    /// Stagnation limit on the smallest instances (about 50 edges).
    pub max_stagnation: usize,

    /// Fraction of layers, most crossings first, whose nodes are barycenter
    /// mutation candidates.
    pub barycenter_layer_fraction: f64,

    /// Probe radius of the directed mutation, as a fraction of the largest
    /// layer.
    pub probe_ratio: f64,

    /// Probe radius while the search is stuck.
    pub stuck_probe_ratio: f64,

    /// Fraction of each layer shuffled at every evaluation step.
    pub perturbation_strength: f64,

    /// Random seed. `None` uses [`DEFAULT_SEED`].
    pub seed: Option<u64>,

    /// Wall-clock budget in milliseconds. `None` disables it.
    ///
    /// The check happens at the start of each generation, so the actual
    /// runtime may exceed this limit by one generation's worth of work.
    pub time_limit_ms: Option<u64>,

    /// Stop once the best objective is at or below this value.
    pub target_objective: Option<usize>,

    /// Maximum number of generations.
    pub max_generations: Option<usize>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            selected_size: 40,
            tournament_size: 3,
            min_stagnation: 1,
            max_stagnation: 80,
            barycenter_layer_fraction: 0.5,
            probe_ratio: 0.5,
            stuck_probe_ratio: 1.0,
            perturbation_strength: 0.1,
            seed: None,
            time_limit_ms: Some(78_000),
            target_objective: None,
            max_generations: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of tournament winners per generation.
    pub fn with_selected_size(mut self, n: usize) -> Self {
        self.selected_size = n;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the stagnation limits for large and small instances.
    pub fn with_stagnation_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_stagnation = min;
        self.max_stagnation = max;
        self
    }

    pub fn with_barycenter_layer_fraction(mut self, fraction: f64) -> Self {
        self.barycenter_layer_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Sets the regular and stuck probe ratios.
    pub fn with_probe_ratios(mut self, regular: f64, stuck: f64) -> Self {
        self.probe_ratio = regular;
        self.stuck_probe_ratio = stuck;
        self
    }

    pub fn with_perturbation_strength(mut self, strength: f64) -> Self {
        self.perturbation_strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Removes the wall-clock budget. A generation cap or target is then
    /// required.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    pub fn with_target_objective(mut self, target: usize) -> Self {
        self.target_objective = Some(target);
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    /// Seed actually used by a run.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// The wall-clock budget, unbounded when unset.
    pub fn time_limit(&self) -> Duration {
        self.time_limit_ms.map_or(Duration::MAX, Duration::from_millis)
    }

    /// Generations without improvement after which the search counts as
    /// stuck, interpolated exponentially on the number of edges.
    pub fn stagnation_limit(&self, num_edges: usize) -> usize {
        let a = (self.max_stagnation as f64 - self.min_stagnation as f64) / (50.0 - 2000.0);
        let limit = ((a * 0.35 * num_edges as f64).exp() * self.max_stagnation as f64).round();
        (limit as usize).max(1)
    }

    /// Number of layers feeding the barycenter mutation, at least one.
    pub fn barycenter_layers(&self, num_layers: usize) -> usize {
        ((self.barycenter_layer_fraction * num_layers as f64).round() as usize).max(1)
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(MmacError::InvalidConfig(msg));
        if self.population_size < 2 {
            return invalid("population_size must be at least 2".into());
        }
        if self.tournament_size == 0 {
            return invalid("tournament_size must be at least 1".into());
        }
        if self.selected_size > 0
            && self.population_size + 1 < self.selected_size + self.tournament_size
        {
            return invalid(format!(
                "population_size {} too small for {} tournaments of size {}",
                self.population_size, self.selected_size, self.tournament_size
            ));
        }
        if self.min_stagnation > self.max_stagnation {
            return invalid("min_stagnation must not exceed max_stagnation".into());
        }
        if !(self.probe_ratio >= 0.0 && self.stuck_probe_ratio >= 0.0) {
            return invalid("probe ratios must be non-negative".into());
        }
        if self.time_limit_ms == Some(0) {
            return invalid("time_limit_ms must be positive or None".into());
        }
        if self.time_limit_ms.is_none()
            && self.max_generations.is_none()
            && self.target_objective.is_none()
        {
            return invalid(
                "at least one of time_limit_ms, max_generations or target_objective is required"
                    .into(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 200);
        assert_eq!(config.selected_size, 40);
        assert_eq!(config.tournament_size, 3);
        assert_eq!(config.min_stagnation, 1);
        assert_eq!(config.max_stagnation, 80);
        assert!((config.barycenter_layer_fraction - 0.5).abs() < 1e-10);
        assert!((config.probe_ratio - 0.5).abs() < 1e-10);
        assert!((config.stuck_probe_ratio - 1.0).abs() < 1e-10);
        assert!((config.perturbation_strength - 0.1).abs() < 1e-10);
        assert!(config.seed.is_none());
        assert_eq!(config.effective_seed(), 42);
        assert_eq!(config.time_limit_ms, Some(78_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(50)
            .with_selected_size(10)
            .with_tournament_size(4)
            .with_stagnation_bounds(2, 40)
            .with_probe_ratios(0.3, 0.9)
            .with_perturbation_strength(2.0)
            .with_seed(42);

        assert_eq!(config.population_size, 50);
        assert_eq!(config.selected_size, 10);
        assert_eq!(config.tournament_size, 4);
        assert_eq!((config.min_stagnation, config.max_stagnation), (2, 40));
        assert!((config.probe_ratio - 0.3).abs() < 1e-10);
        assert!((config.perturbation_strength - 1.0).abs() < 1e-10);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_stagnation_limit_shrinks_with_edges() {
        let config = GaConfig::default();
        let small = config.stagnation_limit(50);
        let large = config.stagnation_limit(2000);
        assert!(small > large);
        // exp(-79/1950 * 0.35 * 50) * 80 = 39.3
        assert_eq!(small, 39);
        assert_eq!(config.stagnation_limit(1_000_000), 1);
        assert_eq!(config.stagnation_limit(0), 80);
    }

    #[test]
    fn test_barycenter_layers_at_least_one() {
        let config = GaConfig::default();
        assert_eq!(config.barycenter_layers(1), 1);
        assert_eq!(config.barycenter_layers(5), 3);
        assert_eq!(config.with_barycenter_layer_fraction(0.0).barycenter_layers(8), 1);
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = GaConfig::default().with_population_size(41);
        assert!(config.validate().is_err());
        let config = GaConfig::default().with_population_size(42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        assert!(GaConfig::default().with_population_size(1).validate().is_err());
        assert!(GaConfig::default().with_tournament_size(0).validate().is_err());
        assert!(GaConfig::default().with_stagnation_bounds(5, 2).validate().is_err());
        assert!(GaConfig::default().with_time_limit_ms(0).validate().is_err());
        assert!(GaConfig::default().without_time_limit().validate().is_err());
        assert!(GaConfig::default()
            .without_time_limit()
            .with_max_generations(3)
            .validate()
            .is_ok());
    }
}
