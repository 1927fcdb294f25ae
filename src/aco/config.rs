//! ACO configuration.

use std::time::Duration;

use crate::error::{MmacError, Result};
use crate::local_search::LocalSearchConfig;
use crate::random::DEFAULT_SEED;

/// Configuration for the ant colony optimizer.
///
/// # Examples
///
/// ```
/// use mmac_heur::aco::AcoConfig;
///
/// let config = AcoConfig::default()
///     .with_ants(30)
///     .with_seed(7)
///     .with_time_limit_ms(5_000)
///     .with_max_colonies(50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcoConfig {
    /// Ants built per colony.
    pub ants: usize,

    /// Pheromone exponent.
    pub alpha: f64,

    /// Initial heuristic exponent.
    pub beta: f64,

    /// Evaporation rate in (0, 1].
    pub rho: f64,

    /// Fraction of the colony (best first) that reinforces the pheromone.
    pub gamma: f64,

    /// Initial value of every pheromone and heuristic cell, and the
    /// evaporation baseline.
    pub initial_pheromone: f64,

    /// Multiplicative decay of beta per stagnant colony, once stagnation
    /// has set in.
    pub beta_decay: f64,

    /// Colonies without improvement before beta starts decaying.
    pub stagnation_colonies: usize,

    /// Fraction of each layer shuffled after construction.
    pub perturbation_strength: f64,

    /// Local search applied to the reference solution and to every ant.
    pub local_search: LocalSearchConfig,

    /// Random seed. `None` uses [`DEFAULT_SEED`].
    pub seed: Option<u64>,

    /// Wall-clock budget in milliseconds. `None` disables it.
    pub time_limit_ms: Option<u64>,

    /// Stop once the best objective is at or below this value.
    pub target_objective: Option<usize>,

    /// Maximum number of colonies.
    pub max_colonies: Option<usize>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            ants: 60,
            alpha: 1.0,
            beta: 0.5,
            rho: 0.08,
            gamma: 0.05,
            initial_pheromone: 1.1,
            beta_decay: 0.05,
            stagnation_colonies: 20,
            perturbation_strength: 0.1,
            local_search: LocalSearchConfig::default(),
            seed: None,
            time_limit_ms: Some(78_000),
            target_objective: None,
            max_colonies: None,
        }
    }
}

impl AcoConfig {
    pub fn with_ants(mut self, ants: usize) -> Self {
        self.ants = ants;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_initial_pheromone(mut self, value: f64) -> Self {
        self.initial_pheromone = value;
        self
    }

    pub fn with_beta_decay(mut self, decay: f64) -> Self {
        self.beta_decay = decay;
        self
    }

    pub fn with_stagnation_colonies(mut self, colonies: usize) -> Self {
        self.stagnation_colonies = colonies;
        self
    }

    pub fn with_perturbation_strength(mut self, strength: f64) -> Self {
        self.perturbation_strength = strength;
        self
    }

    pub fn with_local_search(mut self, local_search: LocalSearchConfig) -> Self {
        self.local_search = local_search;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Removes the wall-clock budget. A colony cap or target is then
    /// required.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    pub fn with_target_objective(mut self, target: usize) -> Self {
        self.target_objective = Some(target);
        self
    }

    pub fn with_max_colonies(mut self, colonies: usize) -> Self {
        self.max_colonies = Some(colonies);
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

    /// Number of top ants that reinforce the pheromone.
    pub fn elite_ants(&self) -> usize {
        ((self.gamma * self.ants as f64).round() as usize).min(self.ants)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(MmacError::InvalidConfig(msg.into()));
        if self.ants == 0 {
            return invalid("ants must be at least 1");
        }
        if !(self.alpha >= 0.0 && self.beta >= 0.0) {
            return invalid("alpha and beta must be non-negative");
        }
        if !(self.rho > 0.0 && self.rho <= 1.0) {
            return invalid("rho must be in (0, 1]");
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid("gamma must be in [0, 1]");
        }
        if !(self.initial_pheromone > 0.0 && self.initial_pheromone.is_finite()) {
            return invalid("initial_pheromone must be positive");
        }
        if !(0.0..1.0).contains(&self.beta_decay) {
            return invalid("beta_decay must be in [0, 1)");
        }
        if !(0.0..=1.0).contains(&self.perturbation_strength) {
            return invalid("perturbation_strength must be in [0, 1]");
        }
        if self.time_limit_ms == Some(0) {
            return invalid("time_limit_ms must be positive or None");
        }
        if self.time_limit_ms.is_none()
            && self.max_colonies.is_none()
            && self.target_objective.is_none()
        {
            return invalid(
                "at least one of time_limit_ms, max_colonies or target_objective is required",
            );
        }
        self.local_search.validate()
    }
}
