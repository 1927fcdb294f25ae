//! Immutable instance topology.
//!
//! [`InstanceData`] is built once per input and shared read-only (through an
//! `Arc`) by every [`Solution`](crate::solution::Solution) of a run. It holds
//! only what never changes while searching: layer membership, edge endpoints
//! and the derived adjacency lists. Node and edge indices are `id - 1`.

mod parser;

pub use parser::{parse_instance, read_instance};

use tracing::warn;

use crate::error::{MmacError, Result};

/// Endpoints of one edge, as node indices, oriented from layer `l` to `l + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEnds {
    pub origin: usize,
    pub destination: usize,
}

/// Topology template of one MMAC instance.
#[derive(Debug, Clone)]
pub struct InstanceData {
    num_nodes: usize,
    num_layers: usize,
    layer_sizes: Vec<usize>,
    layer_offsets: Vec<usize>,
    node_layer: Vec<usize>,
    edges: Vec<EdgeEnds>,
    out_edges: Vec<Vec<usize>>,
    in_edges: Vec<Vec<usize>>,
    layer_out_edges: Vec<Vec<usize>>,
    layer_in_edges: Vec<Vec<usize>>,
    max_layer_size: usize,
}

impl InstanceData {
    /// Builds the topology from layer sizes and 1-based `(origin, destination)`
    /// pairs.
    ///
    /// Node ids are assigned sequentially across layers in the given order.
    /// An edge listed from layer `l + 1` back to layer `l` is reoriented;
    /// any edge not joining adjacent layers is rejected.
    pub fn new(layer_sizes: Vec<usize>, edge_list: &[(usize, usize)]) -> Result<Self> {
        let num_nodes: usize = layer_sizes.iter().sum();
        if num_nodes == 0 {
            return Err(MmacError::EmptyInstance);
        }
        let num_layers = layer_sizes.len();

        let mut layer_offsets = Vec::with_capacity(num_layers);
        let mut node_layer = Vec::with_capacity(num_nodes);
        let mut offset = 0;
        for (layer, &size) in layer_sizes.iter().enumerate() {
            layer_offsets.push(offset);
            node_layer.extend(std::iter::repeat_n(layer, size));
            offset += size;
        }

        let mut edges = Vec::with_capacity(edge_list.len());
        let mut out_edges = vec![Vec::new(); num_nodes];
        let mut in_edges = vec![Vec::new(); num_nodes];
        let mut layer_out_edges = vec![Vec::new(); num_layers];
        let mut layer_in_edges = vec![Vec::new(); num_layers];

        for (e, &(a, b)) in edge_list.iter().enumerate() {
            for id in [a, b] {
                if id == 0 || id > num_nodes {
                    return Err(MmacError::NodeOutOfRange {
                        edge: e + 1,
                        node: id,
                        num_nodes,
                    });
                }
            }
            let (la, lb) = (node_layer[a - 1], node_layer[b - 1]);
            let ends = if lb == la + 1 {
                EdgeEnds {
                    origin: a - 1,
                    destination: b - 1,
                }
            } else if la == lb + 1 {
                EdgeEnds {
                    origin: b - 1,
                    destination: a - 1,
                }
            } else {
                return Err(MmacError::NonAdjacentEdge {
                    edge: e + 1,
                    origin: a,
                    destination: b,
                });
            };
            out_edges[ends.origin].push(e);
            in_edges[ends.destination].push(e);
            edges.push(ends);
        }

        // Layer edge caches follow node order inside each layer.
        for node in 0..num_nodes {
            let layer = node_layer[node];
            layer_out_edges[layer].extend_from_slice(&out_edges[node]);
            layer_in_edges[layer].extend_from_slice(&in_edges[node]);
            if out_edges[node].is_empty() && in_edges[node].is_empty() {
                warn!(node = node + 1, layer = layer + 1, "isolated node has no incident edges");
            }
        }

        let max_layer_size = layer_sizes.iter().copied().max().unwrap_or(0);

        Ok(Self {
            num_nodes,
            num_layers,
            layer_sizes,
            layer_offsets,
            node_layer,
            edges,
            out_edges,
            in_edges,
            layer_out_edges,
            layer_in_edges,
            max_layer_size,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn layer_size(&self, layer: usize) -> usize {
        self.layer_sizes[layer]
    }

    /// Number of nodes in all layers before `layer`.
    pub fn layer_offset(&self, layer: usize) -> usize {
        self.layer_offsets[layer]
    }

    pub fn max_layer_size(&self) -> usize {
        self.max_layer_size
    }

    /// Layer of a node index.
    pub fn node_layer(&self, node: usize) -> usize {
        self.node_layer[node]
    }

    /// Node indices of `layer` in instance (input) order.
    pub fn layer_nodes(&self, layer: usize) -> std::ops::Range<usize> {
        let start = self.layer_offsets[layer];
        start..start + self.layer_sizes[layer]
    }

    pub fn edge(&self, edge: usize) -> EdgeEnds {
        self.edges[edge]
    }

    pub fn edges(&self) -> &[EdgeEnds] {
        &self.edges
    }

    pub fn out_edges(&self, node: usize) -> &[usize] {
        &self.out_edges[node]
    }

    pub fn in_edges(&self, node: usize) -> &[usize] {
        &self.in_edges[node]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.out_edges[node].len() + self.in_edges[node].len()
    }

    /// Edges whose origin lies in `layer`.
    pub fn layer_out_edges(&self, layer: usize) -> &[usize] {
        &self.layer_out_edges[layer]
    }

    /// Edges whose destination lies in `layer`.
    pub fn layer_in_edges(&self, layer: usize) -> &[usize] {
        &self.layer_in_edges[layer]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_assigned_across_layers() {
        let inst = InstanceData::new(vec![2, 3, 1], &[(1, 3), (2, 5), (4, 6)]).unwrap();
        assert_eq!(inst.num_nodes(), 6);
        assert_eq!(inst.num_layers(), 3);
        assert_eq!(inst.layer_nodes(1), 2..5);
        assert_eq!(inst.node_layer(5), 2);
        assert_eq!(inst.layer_offset(2), 5);
        assert_eq!(inst.max_layer_size(), 3);
        assert_eq!(inst.layer_out_edges(0), &[0, 1]);
        assert_eq!(inst.layer_in_edges(2), &[2]);
    }

    #[test]
    fn test_upward_edge_is_reoriented() {
        let inst = InstanceData::new(vec![1, 1], &[(2, 1)]).unwrap();
        assert_eq!(
            inst.edge(0),
            EdgeEnds {
                origin: 0,
                destination: 1
            }
        );
        assert_eq!(inst.out_edges(0), &[0]);
        assert_eq!(inst.in_edges(1), &[0]);
    }

    #[test]
    fn test_non_adjacent_edge_rejected() {
        let err = InstanceData::new(vec![1, 1, 1], &[(1, 3)]).unwrap_err();
        assert!(matches!(err, MmacError::NonAdjacentEdge { edge: 1, .. }));
    }

    #[test]
    fn test_same_layer_edge_rejected() {
        let err = InstanceData::new(vec![2], &[(1, 2)]).unwrap_err();
        assert!(matches!(err, MmacError::NonAdjacentEdge { .. }));
    }

    #[test]
    fn test_out_of_range_node_rejected() {
        let err = InstanceData::new(vec![1, 1], &[(1, 3)]).unwrap_err();
        assert!(matches!(
            err,
            MmacError::NodeOutOfRange {
                node: 3,
                num_nodes: 2,
                ..
            }
        ));
        let err = InstanceData::new(vec![1, 1], &[(0, 1)]).unwrap_err();
        assert!(matches!(err, MmacError::NodeOutOfRange { node: 0, .. }));
    }

    #[test]
    fn test_empty_instance_rejected() {
        assert!(matches!(
            InstanceData::new(vec![], &[]),
            Err(MmacError::EmptyInstance)
        ));
    }
}
