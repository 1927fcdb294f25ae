//! What-if evaluation of single-node moves without committing them.
//!
//! Both probes report the layer-pair total: the sum of `num_cross` over the
//! edges entering and leaving the node's layer, so each crossing pair
//! counts twice.

use super::{is_cross, Solution};

/// Result of [`Solution::simulate_cross`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedCross {
    /// Layer-pair total with the node at the tested position.
    pub total_cross: usize,
    /// Edges inspected divided by the instance edge count.
    pub evaluation_fraction: f64,
}

/// Result of [`Solution::sweep_cross_totals`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossSweep {
    /// Layer-pair total at the node's current position.
    pub base: usize,
    /// `(position, total)` for each reachable position to the left, nearest
    /// first.
    pub left: Vec<(usize, usize)>,
    /// `(position, total)` for each reachable position to the right, nearest
    /// first.
    pub right: Vec<(usize, usize)>,
}

impl Solution {
    /// Layer-pair total if `node` were moved to `test_pos`, recounted from
    /// scratch. The solution is not modified.
    ///
    /// # Panics
    /// Panics if `test_pos` is outside the node's layer.
    pub fn simulate_cross(&self, node: usize, test_pos: usize) -> SimulatedCross {
        let inst = &self.instance;
        let layer = self.nodes[node].layer;
        let order = &self.layers[layer].nodes;
        assert!(
            test_pos < order.len(),
            "position {test_pos} outside layer of {} nodes",
            order.len()
        );

        let offset = inst.layer_offset(layer);
        let mut tentative = vec![0; order.len()];
        let from = self.nodes[node].position;
        for (pos, &idx) in order.iter().enumerate() {
            let shifted = if idx == node {
                test_pos
            } else if from < test_pos && pos > from && pos <= test_pos {
                pos - 1
            } else if test_pos < from && pos >= test_pos && pos < from {
                pos + 1
            } else {
                pos
            };
            tentative[idx - offset] = shifted;
        }
        let position = |idx: usize| {
            if inst.node_layer(idx) == layer {
                tentative[idx - offset]
            } else {
                self.nodes[idx].position
            }
        };

        let mut pairs = 0;
        let mut inspected = 0;
        for edges in [inst.layer_in_edges(layer), inst.layer_out_edges(layer)] {
            inspected += edges.len();
            for (a, &ea) in edges.iter().enumerate() {
                let x = inst.edge(ea);
                for &eb in &edges[a + 1..] {
                    let y = inst.edge(eb);
                    if x.origin == y.origin {
                        continue;
                    }
                    if is_cross(
                        position(x.origin),
                        position(x.destination),
                        position(y.origin),
                        position(y.destination),
                    ) {
                        pairs += 1;
                    }
                }
            }
        }

        let evaluation_fraction = match inst.num_edges() {
            0 => 0.0,
            e => inspected as f64 / e as f64,
        };
        SimulatedCross {
            total_cross: 2 * pairs,
            evaluation_fraction,
        }
    }

    /// Layer-pair totals for `node` slid up to `radius` positions each way,
    /// computed incrementally by adjacent swaps from the maintained counts.
    /// The solution is not modified.
    pub fn sweep_cross_totals(&self, node: usize, radius: usize) -> CrossSweep {
        let inst = &self.instance;
        let layer = self.nodes[node].layer;
        let order = &self.layers[layer].nodes;
        let from = self.nodes[node].position;

        let base: usize = inst
            .layer_in_edges(layer)
            .iter()
            .chain(inst.layer_out_edges(layer))
            .map(|&e| self.edges[e].num_cross)
            .sum();

        let mut left = Vec::new();
        let mut total = base as i64;
        let mut pos = from;
        while pos > 0 && from - pos < radius {
            let neighbour = order[pos - 1];
            total += 2 * self.adjacent_swap_flip(neighbour, pos - 1, node, pos);
            pos -= 1;
            left.push((pos, total.max(0) as usize));
        }

        let mut right = Vec::new();
        let mut total = base as i64;
        let mut pos = from;
        while pos + 1 < order.len() && pos - from < radius {
            let neighbour = order[pos + 1];
            total += 2 * self.adjacent_swap_flip(node, pos, neighbour, pos + 1);
            pos += 1;
            right.push((pos, total.max(0) as usize));
        }

        CrossSweep { base, left, right }
    }

    /// Change in the number of crossing pairs when two side-by-side nodes of
    /// the same layer exchange places. `left` sits at `left_pos` and `right`
    /// at `left_pos + 1`; other-layer endpoints are read from the solution.
    fn adjacent_swap_flip(
        &self,
        left: usize,
        left_pos: usize,
        right: usize,
        right_pos: usize,
    ) -> i64 {
        let inst = &self.instance;
        let mut flip = 0;
        let groups = [
            (inst.out_edges(left), inst.out_edges(right), true),
            (inst.in_edges(left), inst.in_edges(right), false),
        ];
        for (left_edges, right_edges, outgoing) in groups {
            for &ea in left_edges {
                let a = inst.edge(ea);
                let pa = if outgoing { a.destination } else { a.origin };
                for &eb in right_edges {
                    let b = inst.edge(eb);
                    let pb = if outgoing { b.destination } else { b.origin };
                    let (qa, qb) = (self.nodes[pa].position, self.nodes[pb].position);
                    if qa == qb {
                        continue;
                    }
                    let crossing = is_cross(left_pos, qa, right_pos, qb);
                    flip += if crossing { -1 } else { 1 };
                }
            }
        }
        flip
    }
}
