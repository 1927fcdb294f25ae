//! Local search configuration.

use crate::error::{MmacError, Result};

/// How many nodes a scan inspects before committing to a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanStrategy {
    /// Scan every node and keep the most negative delta.
    #[default]
    BestImprovement,
    /// Stop at the first node, in ranking order, that offers an improving
    /// move.
    FirstImprovingNode,
}

/// Configuration for [`LocalSearchRunner`](super::LocalSearchRunner).
///
/// # Examples
///
/// ```
/// use mmac_heur::local_search::{LocalSearchConfig, ScanStrategy};
///
/// let config = LocalSearchConfig::default()
///     .with_move_distance_ratio(0.25)
///     .with_scan(ScanStrategy::FirstImprovingNode);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalSearchConfig {
    /// Farthest relocation, as a fraction of the largest layer size.
    pub move_distance_ratio: f64,

    /// Penalty per crossing that a move would add above the current
    /// objective.
    pub lambda: usize,

    pub scan: ScanStrategy,

    /// Maximum number of applied moves. 0 = no limit.
    pub max_moves: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            move_distance_ratio: 0.5,
            lambda: 10_000,
            scan: ScanStrategy::default(),
            max_moves: 0,
        }
    }
}

impl LocalSearchConfig {
    pub fn with_move_distance_ratio(mut self, ratio: f64) -> Self {
        self.move_distance_ratio = ratio;
        self
    }

    pub fn with_lambda(mut self, lambda: usize) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_scan(mut self, scan: ScanStrategy) -> Self {
        self.scan = scan;
        self
    }

    /// Caps the number of applied moves (0 disables the cap).
    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = max_moves;
        self
    }

    /// Farthest relocation distance for an instance whose largest layer
    /// holds `max_layer_size` nodes.
    pub fn move_max_distance(&self, max_layer_size: usize) -> usize {
        (self.move_distance_ratio * max_layer_size as f64).floor() as usize
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.move_distance_ratio > 0.0 && self.move_distance_ratio <= 1.0) {
            return Err(MmacError::InvalidConfig(
                "move_distance_ratio must be in (0, 1]".into(),
            ));
        }
        if self.lambda == 0 {
            return Err(MmacError::InvalidConfig("lambda must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LocalSearchConfig::default();
        assert!((config.move_distance_ratio - 0.5).abs() < 1e-10);
        assert_eq!(config.lambda, 10_000);
        assert_eq!(config.scan, ScanStrategy::BestImprovement);
        assert_eq!(config.max_moves, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_move_max_distance_floors() {
        let config = LocalSearchConfig::default();
        assert_eq!(config.move_max_distance(7), 3);
        assert_eq!(config.move_max_distance(1), 0);
        assert_eq!(config.with_move_distance_ratio(1.0).move_max_distance(7), 7);
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        assert!(LocalSearchConfig::default()
            .with_move_distance_ratio(0.0)
            .validate()
            .is_err());
        assert!(LocalSearchConfig::default()
            .with_move_distance_ratio(1.5)
            .validate()
            .is_err());
        assert!(LocalSearchConfig::default()
            .with_move_distance_ratio(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_zero_lambda() {
        assert!(LocalSearchConfig::default().with_lambda(0).validate().is_err());
    }
}
