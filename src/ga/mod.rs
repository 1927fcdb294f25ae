//! Genetic Algorithm for MMAC.
//!
//! Individuals are full [`Solution`](crate::solution::Solution)s. Each
//! generation evaluates and perturbs the population, ranks it by penalized
//! fitness, runs tournaments without reuse, recombines winners with a
//! layer-split crossover, mutates every offspring twice (barycenter, then
//! directed) and places offspring over repeated or weak individuals.
//!
//! # Core Traits
//!
//! - [`Individual`]: what selection and replacement need from a member
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population, tournaments, stagnation)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final optimization result with statistics
//!
//! # Submodules
//!
//! - [`operators`]: Layer-split crossover, barycenter and directed mutation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
pub mod operators;
mod runner;
mod selection;
mod types;

pub use config::GaConfig;
pub use runner::{GaResult, GaRunner};
pub use selection::{replace_into, tournament_without_reuse};
pub use types::{Fitness, Individual};
