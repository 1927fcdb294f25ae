//! Error type shared by the parser, the configs and the crossing engine.

use std::path::PathBuf;

/// Errors raised by the crate.
///
/// Malformed instances and invalid configurations are fatal for a run.
/// [`MmacError::Invariant`] is only produced by the diagnostic checker
/// ([`Solution::check`](crate::solution::Solution::check)) and signals a bug
/// in an incremental update, not a runtime condition.
#[derive(Debug, thiserror::Error)]
pub enum MmacError {
    #[error("cannot read instance file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("{what}: header declares {expected}, found {found}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("edge {edge}: node id {node} is outside 1..={num_nodes}")]
    NodeOutOfRange {
        edge: usize,
        node: usize,
        num_nodes: usize,
    },

    #[error("edge {edge}: nodes {origin} and {destination} are not in adjacent layers")]
    NonAdjacentEdge {
        edge: usize,
        origin: usize,
        destination: usize,
    },

    #[error("instance has no nodes")]
    EmptyInstance,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("layer index {index} out of range (instance has {num_layers} layers)")]
    LayerOutOfRange { index: usize, num_layers: usize },

    #[error("solution invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, MmacError>;
