//! Summary statistics over repeated seeded trials.

use crate::solution::Solution;

/// Objective statistics over a set of trials.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialStats {
    pub trials: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 for a single trial.
    pub stdev: f64,
    pub min: usize,
    pub max: usize,
}

impl TrialStats {
    /// Computes the statistics of `values`, or `None` if there are none.
    pub fn from_values(values: &[usize]) -> Option<Self> {
        let min = *values.iter().min()?;
        let max = *values.iter().max()?;
        let n = values.len() as f64;
        let mean = values.iter().sum::<usize>() as f64 / n;
        let stdev = if values.len() < 2 {
            0.0
        } else {
            let ss: f64 = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        };
        Some(Self {
            trials: values.len(),
            mean,
            stdev,
            min,
            max,
        })
    }

    /// Gap between the best trial and a best known solution. Negative when
    /// the trials beat it.
    pub fn distance_to(&self, bks: usize) -> i64 {
        self.min as i64 - bks as i64
    }
}

/// Per-trial objectives of one algorithm, plus the best solution seen.
#[derive(Debug, Clone, Default)]
pub struct TrialSummary {
    objectives: Vec<usize>,
    best: Option<Solution>,
}

impl TrialSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one trial's final solution. The first strictly better
    /// solution is kept as the overall best.
    pub fn record(&mut self, solution: Solution) {
        let objective = solution.objective();
        self.objectives.push(objective);
        if self.best.as_ref().is_none_or(|b| objective < b.objective()) {
            self.best = Some(solution);
        }
    }

    pub fn objectives(&self) -> &[usize] {
        &self.objectives
    }

    pub fn best(&self) -> Option<&Solution> {
        self.best.as_ref()
    }

    pub fn stats(&self) -> Option<TrialStats> {
        TrialStats::from_values(&self.objectives)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::instance::InstanceData;

    #[test]
    fn test_empty_is_none() {
        assert!(TrialStats::from_values(&[]).is_none());
        assert!(TrialSummary::new().stats().is_none());
    }

    #[test]
    fn test_single_trial_has_zero_stdev() {
        let stats = TrialStats::from_values(&[7]).unwrap();
        assert_eq!(stats.trials, 1);
        assert!((stats.mean - 7.0).abs() < 1e-12);
        assert_eq!(stats.stdev, 0.0);
        assert_eq!((stats.min, stats.max), (7, 7));
    }

    #[test]
    fn test_sample_stdev() {
        let stats = TrialStats::from_values(&[2, 4, 4, 4, 5, 5, 7, 9]).unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-12);
        // sum of squares 32 over n - 1 = 7
        assert!((stats.stdev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!((stats.min, stats.max), (2, 9));
    }

    #[test]
    fn test_distance_to_bks() {
        let stats = TrialStats::from_values(&[5, 6]).unwrap();
        assert_eq!(stats.distance_to(3), 2);
        assert_eq!(stats.distance_to(5), 0);
        assert_eq!(stats.distance_to(8), -3);
    }

    #[test]
    fn test_summary_keeps_first_best() {
        let inst = Arc::new(InstanceData::new(vec![2, 2], &[(1, 4), (2, 3)]).unwrap());
        let order = |id, upper: [usize; 2], lower: [usize; 2]| {
            Solution::from_orders(id, Arc::clone(&inst), &[upper.to_vec(), lower.to_vec()]).unwrap()
        };
        let crossed = order(1, [1, 2], [3, 4]);
        let clean = order(2, [1, 2], [4, 3]);
        let other = order(3, [2, 1], [3, 4]);

        let mut summary = TrialSummary::new();
        summary.record(crossed);
        summary.record(clean);
        summary.record(other);
        assert_eq!(summary.objectives(), &[1, 0, 0]);
        assert_eq!(summary.best().map(Solution::id), Some(2));
        assert_eq!(summary.stats().map(|s| s.min), Some(0));
    }
}
