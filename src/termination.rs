//! Wall-clock deadline and stop rules shared by both drivers.
//!
//! The drivers check [`Termination::check`] once at the top of every
//! colony/generation; an iteration that has started always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The wall-clock budget ran out.
    TimeLimit,
    /// A solution with `M == 0` was found.
    Optimal,
    /// The best objective reached the configured target (e.g. a BKS).
    TargetReached,
    /// The configured iteration cap was reached.
    IterationLimit,
    /// The cancellation token was set.
    Cancelled,
}

/// A new run-best, as reported by the drivers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Improvement {
    /// Colony or generation in which it was found.
    pub iteration: usize,
    pub objective: usize,
    /// Seconds since the run started, one decimal.
    pub elapsed_secs: f64,
}

/// A wall-clock budget started at construction.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Duration,
}

impl Deadline {
    /// Starts the clock now.
    pub fn start(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in seconds, rounded to one decimal for log lines.
    pub fn elapsed_secs(&self) -> f64 {
        (self.elapsed().as_secs_f64() * 10.0).round() / 10.0
    }

    pub fn expired(&self) -> bool {
        self.elapsed() > self.limit
    }
}

/// Stop rules of one run.
#[derive(Debug, Clone)]
pub struct Termination {
    deadline: Deadline,
    target_objective: Option<usize>,
    max_iterations: Option<usize>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Termination {
    /// Starts the deadline now.
    pub fn start(
        time_limit: Duration,
        target_objective: Option<usize>,
        max_iterations: Option<usize>,
    ) -> Self {
        Self {
            deadline: Deadline::start(time_limit),
            target_objective,
            max_iterations,
            cancel: None,
        }
    }

    /// Adds an external cancellation token, polled by [`check`](Self::check).
    pub fn with_cancel(mut self, cancel: Option<Arc<AtomicBool>>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    /// Returns the reason to stop before running iteration `iteration`, or
    /// `None` to keep going.
    pub fn check(&self, iteration: usize, best_objective: usize) -> Option<StopReason> {
        if best_objective == 0 {
            return Some(StopReason::Optimal);
        }
        if self
            .target_objective
            .is_some_and(|target| best_objective <= target)
        {
            return Some(StopReason::TargetReached);
        }
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Some(StopReason::Cancelled);
        }
        if self.max_iterations.is_some_and(|cap| iteration >= cap) {
            return Some(StopReason::IterationLimit);
        }
        if self.deadline.expired() {
            return Some(StopReason::TimeLimit);
        }
        None
    }
}
