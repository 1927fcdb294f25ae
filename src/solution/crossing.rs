//! Crossing counts: full evaluation and per-layer refresh.

use std::sync::Arc;

use tracing::trace;

use super::Solution;
use crate::error::{MmacError, Result};

/// Whether edge `(i, j)` crosses edge `(k, l)`, given origin positions `i`,
/// `k` in one layer and destination positions `j`, `l` in the next.
///
/// Edges sharing an endpoint position never cross.
#[inline]
pub fn is_cross(i: usize, j: usize, k: usize, l: usize) -> bool {
    (i < k && j > l) || (i > k && j < l)
}

impl Solution {
    /// Counts the edges of the same layer pair crossing `edge`, skipping
    /// edges that share its origin or its destination.
    pub(crate) fn count_crossings(&self, edge: usize) -> usize {
        let ends = self.instance.edge(edge);
        let layer = self.nodes[ends.origin].layer;
        let i = self.nodes[ends.origin].position;
        let j = self.nodes[ends.destination].position;
        self.instance
            .layer_out_edges(layer)
            .iter()
            .map(|&other| self.instance.edge(other))
            .filter(|o| o.origin != ends.origin && o.destination != ends.destination)
            .filter(|o| {
                let (k, l) = (self.nodes[o.origin].position, self.nodes[o.destination].position);
                is_cross(i, j, k, l)
            })
            .count()
    }

    /// Recomputes `num_cross` of one edge.
    pub fn calc_cross(&mut self, edge: usize) {
        let count = self.count_crossings(edge);
        self.edges[edge].num_cross = count;
    }

    /// Recomputes `max_cross` of one node and returns the number of edges
    /// inspected. An isolated node gets `max_cross = 0`.
    pub fn calc_node_max_cross(&mut self, node: usize) -> usize {
        let inst = &self.instance;
        let edges = &self.edges;
        let max = inst
            .out_edges(node)
            .iter()
            .chain(inst.in_edges(node))
            .map(|&e| edges[e].num_cross)
            .max();
        if max.is_none() {
            trace!(node = node + 1, "no incident edges");
        }
        self.nodes[node].max_cross = max.unwrap_or(0);
        inst.degree(node)
    }

    /// Full evaluation: every edge count, every node max, totals and ranking.
    pub fn calc_all_node_max_cross(&mut self) {
        for edge in 0..self.edges.len() {
            self.calc_cross(edge);
        }
        for node in 0..self.nodes.len() {
            self.calc_node_max_cross(node);
        }
        self.update_total_cross();
        self.sort_ranking();
        self.needs_evaluation = false;
    }

    /// Refreshes the edges leaving `layer`, the node maxima of `layer` and
    /// `layer + 1`, and the ranking. Totals are left to the caller.
    ///
    /// Returns the fraction of nodes in `layer`, the evaluation-cost unit
    /// used by the genetic algorithm.
    pub fn update_layer(&mut self, layer: usize) -> Result<f64> {
        let num_layers = self.instance.num_layers();
        if layer >= num_layers {
            return Err(MmacError::LayerOutOfRange {
                index: layer,
                num_layers,
            });
        }
        let inst = Arc::clone(&self.instance);
        for &edge in inst.layer_out_edges(layer) {
            self.calc_cross(edge);
        }
        for node in inst.layer_nodes(layer) {
            self.calc_node_max_cross(node);
        }
        if layer + 1 < num_layers {
            for node in inst.layer_nodes(layer + 1) {
                self.calc_node_max_cross(node);
            }
        }
        self.sort_ranking();
        Ok(inst.layer_size(layer) as f64 / inst.num_nodes() as f64)
    }

    /// Recomputes layer sums, node sums and the solution total from the
    /// current edge counts.
    pub fn update_total_cross(&mut self) {
        let inst = &self.instance;
        let edges = &self.edges;
        let mut total = 0;
        for layer in &mut self.layers {
            layer.num_cross = inst
                .layer_out_edges(layer.index)
                .iter()
                .map(|&e| edges[e].num_cross)
                .sum();
            total += layer.num_cross;
        }
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            node.total_cross = inst
                .out_edges(idx)
                .iter()
                .chain(inst.in_edges(idx))
                .map(|&e| edges[e].num_cross)
                .sum();
        }
        self.total_cross = total;
    }

    /// Sets `total_cross_normalized = total_cross / (max_total + 1)`, where
    /// `max_total` is the largest total in the current population.
    pub fn normalize_total_cross(&mut self, max_total: usize) {
        self.total_cross_normalized = self.total_cross as f64 / (max_total as f64 + 1.0);
    }

    /// Moves `node` to `new_pos` inside its layer, shifting the nodes in
    /// between. Counts are left stale.
    ///
    /// # Panics
    /// Panics if `new_pos` is outside the layer.
    pub fn relocate(&mut self, node: usize, new_pos: usize) {
        let layer = self.nodes[node].layer;
        let old_pos = self.nodes[node].position;
        let order = &mut self.layers[layer].nodes;
        assert!(
            new_pos < order.len(),
            "position {new_pos} outside layer of {} nodes",
            order.len()
        );
        if old_pos == new_pos {
            return;
        }
        let moved = order.remove(old_pos);
        order.insert(new_pos, moved);
        let (lo, hi) = (old_pos.min(new_pos), old_pos.max(new_pos));
        for (position, &idx) in order.iter().enumerate().take(hi + 1).skip(lo) {
            self.nodes[idx].position = position;
        }
        self.modified = true;
    }
}
