//! Relocation local search.
//!
//! Repeatedly moves one node to another position inside its own layer,
//! choosing the move with the most negative score. A move is scored by
//! sliding the node one adjacent swap at a time and accumulating, per
//! touched edge, whether it joins the set of edges at the current objective
//! `M` (+1), leaves it (-1), or rises above it (`+lambda` per extra
//! crossing). Counts are updated incrementally; nothing is recounted from
//! scratch while searching.

mod config;
mod runner;

pub use config::{LocalSearchConfig, ScanStrategy};
pub use runner::{LocalSearchResult, LocalSearchRunner};
