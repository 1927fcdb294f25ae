//! Metaheuristics for the Min-Max Arc-Crossing problem (MMAC).
//!
//! Given a layered graph whose edges join adjacent layers, find an order of
//! the nodes within every layer that minimizes `M`, the largest number of
//! crossings any single edge takes part in.
//!
//! - **Instance model**: immutable topology shared by all solutions
//!   ([`instance`]).
//! - **Solution and crossing engine**: per-solution layer orders with
//!   incrementally maintained crossing counts ([`solution`]).
//! - **Local search**: relocation moves scored by their effect on the
//!   edges at the current objective ([`local_search`]).
//! - **Ant Colony Optimization (ACO)**: slot-by-slot construction guided by
//!   pheromone and a reference solution ([`aco`]).
//! - **Genetic Algorithm (GA)**: tournaments, layer-split crossover and two
//!   mutations over full solutions ([`ga`]).
//!
//! Every driver takes an explicit seed and is deterministic for a given
//! seed and iteration cap.

pub mod aco;
pub mod error;
pub mod ga;
pub mod instance;
pub mod local_search;
pub mod random;
pub mod solution;
pub mod stats;
pub mod termination;

pub use error::{MmacError, Result};
