//! Ant Colony Optimization (ACO) for MMAC.
//!
//! Each ant fills every layer slot by slot, choosing among the nodes not yet
//! placed with probability proportional to `τ^α · η^β`, where `τ` is the
//! pheromone and `η` a fixed heuristic matrix seeded from a locally
//! optimized reference solution. After construction the colony is
//! evaluated, the pheromone evaporates toward its baseline and is reinforced
//! on the slots of the best ants, then every ant is perturbed and improved
//! by [local search](crate::local_search).
//!
//! # References
//!
//! - Dorigo & Stützle (2004), *Ant Colony Optimization*

mod config;
mod matrix;
mod runner;

pub use config::AcoConfig;
pub use matrix::SlotMatrix;
pub use runner::{AcoResult, AcoRunner};
