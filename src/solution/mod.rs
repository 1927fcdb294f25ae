//! Solution data model.
//!
//! A [`Solution`] owns one complete arena of nodes, edges and layers for a
//! single candidate ordering. Nodes and edges are indexed by `id - 1`;
//! layers reference nodes by index and never own them. The topology itself
//! lives in the shared, immutable [`InstanceData`].
//!
//! # Invariants
//!
//! After every operation that claims completion:
//!
//! 1. `ranking` is sorted non-increasing by `max_cross` and
//!    `M = nodes[ranking[0]].max_cross`;
//! 2. positions inside each layer are exactly `0..size`;
//! 3. every node id `1..=N` appears in exactly one layer, once;
//! 4. every edge's `num_cross` equals a brute-force recount;
//! 5. every node's `max_cross` is the max `num_cross` of its incident edges.
//!
//! [`Solution::check`] verifies all of them.

mod check;
mod crossing;
mod simulate;

pub use crossing::is_cross;
pub use simulate::{CrossSweep, SimulatedCross};

use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{MmacError, Result};
use crate::instance::InstanceData;
use crate::random::rand_between;

/// A node of the layered graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// 1-based id.
    pub id: usize,
    pub layer: usize,
    /// Position inside the layer, `0..layer size`.
    pub position: usize,
    /// Largest `num_cross` among incident edges.
    pub max_cross: usize,
    /// Sum of `num_cross` over incident edges.
    pub total_cross: usize,
}

/// An edge between two adjacent layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// 1-based id.
    pub id: usize,
    /// Origin node index (upper layer).
    pub origin: usize,
    /// Destination node index (lower layer).
    pub destination: usize,
    /// Number of edges of the same layer pair crossing this one.
    pub num_cross: usize,
    // Overlay used by local search while scoring a move window.
    pub(crate) tmp_cross: i64,
    pub(crate) tmp_delta_cross: i64,
}

/// One layer: the left-to-right order of its nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub index: usize,
    /// Node indices, left to right.
    pub nodes: Vec<usize>,
    /// Sum of `num_cross` over the edges leaving this layer.
    pub num_cross: usize,
}

impl Layer {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One candidate ordering of every layer, with its crossing counts.
#[derive(Debug, Clone)]
pub struct Solution {
    pub(crate) id: usize,
    pub(crate) instance: Arc<InstanceData>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) layers: Vec<Layer>,
    /// Node indices sorted non-increasing by `max_cross`.
    pub(crate) ranking: Vec<usize>,
    pub(crate) total_cross: usize,
    pub(crate) total_cross_normalized: f64,
    pub(crate) needs_evaluation: bool,
    pub(crate) modified: bool,
}

impl Solution {
    /// Builds a solution in instance order. Crossing counts are not computed
    /// yet ([`needs_evaluation`](Self::needs_evaluation) is `true`).
    pub fn new(id: usize, instance: Arc<InstanceData>) -> Self {
        let nodes = (0..instance.num_nodes())
            .map(|idx| {
                let layer = instance.node_layer(idx);
                Node {
                    id: idx + 1,
                    layer,
                    position: idx - instance.layer_offset(layer),
                    max_cross: 0,
                    total_cross: 0,
                }
            })
            .collect();
        let edges = instance
            .edges()
            .iter()
            .enumerate()
            .map(|(e, ends)| Edge {
                id: e + 1,
                origin: ends.origin,
                destination: ends.destination,
                num_cross: 0,
                tmp_cross: 0,
                tmp_delta_cross: 0,
            })
            .collect();
        let layers = (0..instance.num_layers())
            .map(|index| Layer {
                index,
                nodes: instance.layer_nodes(index).collect(),
                num_cross: 0,
            })
            .collect();
        let ranking = (0..instance.num_nodes()).collect();

        Self {
            id,
            instance,
            nodes,
            edges,
            layers,
            ranking,
            total_cross: 0,
            total_cross_normalized: 0.0,
            needs_evaluation: true,
            modified: true,
        }
    }

    /// Builds a solution with every layer uniformly shuffled, without
    /// evaluating it.
    pub fn shuffled<R: Rng>(id: usize, instance: Arc<InstanceData>, rng: &mut R) -> Self {
        let mut solution = Self::new(id, instance);
        for layer in 0..solution.layers.len() {
            let size = solution.layers[layer].len();
            solution.shuffle_layer_window(layer, 0, size, rng);
        }
        solution
    }

    /// Builds a randomly ordered solution and fully evaluates it.
    pub fn random<R: Rng>(id: usize, instance: Arc<InstanceData>, rng: &mut R) -> Self {
        let mut solution = Self::shuffled(id, instance, rng);
        solution.calc_all_node_max_cross();
        solution
    }

    /// Builds an evaluated solution from explicit per-layer orders of node ids.
    ///
    /// Returns [`MmacError::Invariant`] if `orders` is not a permutation of
    /// each layer's members.
    pub fn from_orders(
        id: usize,
        instance: Arc<InstanceData>,
        orders: &[Vec<usize>],
    ) -> Result<Self> {
        if orders.len() != instance.num_layers() {
            return Err(MmacError::Invariant(format!(
                "expected {} layer orders, got {}",
                instance.num_layers(),
                orders.len()
            )));
        }
        let mut solution = Self::new(id, instance);
        for (layer, order) in orders.iter().enumerate() {
            let members = solution.instance.layer_nodes(layer);
            let mut seen = vec![false; members.len()];
            let mut indices = Vec::with_capacity(order.len());
            for &node_id in order {
                let idx = node_id.wrapping_sub(1);
                let fresh = members.contains(&idx)
                    && !std::mem::replace(&mut seen[idx - members.start], true);
                if !fresh {
                    return Err(MmacError::Invariant(format!(
                        "node {node_id} is not a unique member of layer {layer}"
                    )));
                }
                indices.push(idx);
            }
            if indices.len() != members.len() {
                return Err(MmacError::Invariant(format!(
                    "layer {layer} order has {} nodes, expected {}",
                    indices.len(),
                    members.len()
                )));
            }
            solution.set_layer_order(layer, indices);
        }
        solution.calc_all_node_max_cross();
        Ok(solution)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    pub fn instance(&self) -> &Arc<InstanceData> {
        &self.instance
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    /// O(1) lookup by 1-based node id.
    pub fn node_by_id(&self, id: usize) -> Option<&Node> {
        id.checked_sub(1).and_then(|idx| self.nodes.get(idx))
    }

    /// Node indices ordered worst first (non-increasing `max_cross`).
    pub fn ranking(&self) -> &[usize] {
        &self.ranking
    }

    /// The objective `M`: the largest crossing count of any edge.
    pub fn objective(&self) -> usize {
        self.ranking
            .first()
            .map_or(0, |&idx| self.nodes[idx].max_cross)
    }

    /// `M` plus the normalized total crossing count, used as tie-breaker.
    pub fn penalized_fitness(&self) -> f64 {
        self.objective() as f64 + self.total_cross_normalized
    }

    /// Sum of `num_cross` over all edges (each crossing pair counts twice).
    pub fn total_cross(&self) -> usize {
        self.total_cross
    }

    pub fn total_cross_normalized(&self) -> f64 {
        self.total_cross_normalized
    }

    /// `true` until the crossing counts have been computed once.
    pub fn needs_evaluation(&self) -> bool {
        self.needs_evaluation
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Node ids of one layer, left to right.
    pub fn layer_ids(&self, layer: usize) -> Vec<usize> {
        self.layers[layer]
            .nodes
            .iter()
            .map(|&idx| self.nodes[idx].id)
            .collect()
    }

    /// One line per layer: `"<layer number>\t<id>,<id>,..."`.
    pub fn layer_dump(&self) -> String {
        let mut out = String::new();
        for layer in 0..self.layers.len() {
            let ids: Vec<String> = self.layer_ids(layer).iter().map(ToString::to_string).collect();
            out.push_str(&format!("{}\t{}\n", layer + 1, ids.join(",")));
        }
        out
    }

    /// Replaces the order of one layer and reassigns positions. Counts are
    /// left stale.
    pub(crate) fn set_layer_order(&mut self, layer: usize, order: Vec<usize>) {
        for (position, &idx) in order.iter().enumerate() {
            self.nodes[idx].position = position;
        }
        self.layers[layer].nodes = order;
    }

    /// Shuffles `layer[start..end]` and reassigns positions. Counts are left
    /// stale.
    pub(crate) fn shuffle_layer_window<R: Rng>(
        &mut self,
        layer: usize,
        start: usize,
        end: usize,
        rng: &mut R,
    ) {
        let order = &mut self.layers[layer].nodes;
        order[start..end].shuffle(rng);
        for (position, &idx) in order.iter().enumerate().take(end).skip(start) {
            self.nodes[idx].position = position;
        }
    }

    /// Shuffles one window per layer and fully re-evaluates.
    ///
    /// Each layer is treated as holding `size - trim` nodes: the window
    /// spans `floor(n × strength)` slots starting at a uniform draw from
    /// `0..=round(n × (1 − strength))`.
    pub fn perturb<R: Rng>(&mut self, strength: f64, trim: usize, rng: &mut R) {
        for layer in 0..self.layers.len() {
            let size = self.layers[layer].len();
            let span = size.saturating_sub(trim) as f64;
            let start = rand_between(rng, 0, (span * (1.0 - strength)).round() as usize);
            let end = (start + (span * strength).floor() as usize).min(size);
            self.shuffle_layer_window(layer, start, end, rng);
        }
        self.calc_all_node_max_cross();
        self.modified = false;
    }

    /// Copies the orders of `layers` from `donor`, together with the counts
    /// that depend only on them: `num_cross` of the edges leaving those
    /// layers and `max_cross` of their nodes. Edges entering the first
    /// copied layer are left stale; refresh them with
    /// [`update_layer`](Self::update_layer) on the layer above.
    pub(crate) fn adopt_layers(&mut self, donor: &Solution, layers: std::ops::Range<usize>) {
        let inst = Arc::clone(&self.instance);
        for layer in layers {
            self.layers[layer].nodes.clone_from(&donor.layers[layer].nodes);
            self.layers[layer].num_cross = donor.layers[layer].num_cross;
            for node in inst.layer_nodes(layer) {
                self.nodes[node].position = donor.nodes[node].position;
                self.nodes[node].max_cross = donor.nodes[node].max_cross;
            }
            for &edge in inst.layer_out_edges(layer) {
                self.edges[edge].num_cross = donor.edges[edge].num_cross;
            }
        }
        self.modified = true;
    }

    /// Re-sorts the ranking worst first. Stable, so equal nodes keep their
    /// relative order.
    pub(crate) fn sort_ranking(&mut self) {
        let nodes = &self.nodes;
        self.ranking
            .sort_by(|&a, &b| nodes[b].max_cross.cmp(&nodes[a].max_cross));
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "M={}", self.objective())?;
        write!(f, "{}", self.layer_dump())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_new_is_instance_order() {
        let sol = Solution::new(1, crossed_pair());
        assert_eq!(sol.layer_ids(0), vec![1, 2]);
        assert_eq!(sol.layer_ids(1), vec![3, 4]);
        assert!(sol.needs_evaluation());
    }

    #[test]
    fn test_from_orders_evaluates() {
        let sol = Solution::from_orders(1, crossed_pair(), &[vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(sol.objective(), 1);
        assert_eq!(sol.total_cross(), 2);
        let sol = Solution::from_orders(1, crossed_pair(), &[vec![1, 2], vec![4, 3]]).unwrap();
        assert_eq!(sol.objective(), 0);
        assert!(!sol.needs_evaluation());
    }

    #[test]
    fn test_from_orders_rejects_foreign_and_duplicate_ids() {
        assert!(Solution::from_orders(1, crossed_pair(), &[vec![1, 3], vec![2, 4]]).is_err());
        assert!(Solution::from_orders(1, crossed_pair(), &[vec![1, 1], vec![3, 4]]).is_err());
        assert!(Solution::from_orders(1, crossed_pair(), &[vec![1], vec![3, 4]]).is_err());
        assert!(Solution::from_orders(1, crossed_pair(), &[vec![1, 2]]).is_err());
    }

    #[test]
    fn test_random_solution_is_consistent() {
        let mut rng = create_rng(5);
        let sol = Solution::random(3, sparse(11), &mut rng);
        sol.check().unwrap();
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rng = create_rng(5);
        let sol = Solution::random(1, sparse(2), &mut rng);
        let mut copy = sol.clone();
        copy.relocate(copy.layers[1].nodes[0], 3);
        copy.update_layer(0).unwrap();
        copy.update_layer(1).unwrap();
        copy.update_total_cross();
        copy.check().unwrap();
        sol.check().unwrap();
        assert_ne!(sol.layer_ids(1), copy.layer_ids(1));
    }

    #[test]
    fn test_perturb_keeps_layer_membership() {
        let mut rng = create_rng(17);
        let mut sol = Solution::random(1, complete_layers(3, 20), &mut rng);
        let before: Vec<Vec<usize>> = (0..3).map(|l| sol.layer_ids(l)).collect();
        sol.perturb(0.1, 0, &mut rng);
        sol.check().unwrap();
        assert!(!sol.is_modified());
        for (l, ids) in before.iter().enumerate() {
            let mut a = ids.clone();
            let mut b = sol.layer_ids(l);
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
            // at most floor(20 * 0.1) = 2 slots move
            let moved = ids.iter().zip(sol.layer_ids(l)).filter(|(x, y)| *x != y).count();
            assert!(moved <= 2);
        }
    }

    #[test]
    fn test_shuffle_layer_window_only_touches_window() {
        let mut sol = Solution::new(1, complete_layers(2, 10));
        let mut rng = create_rng(3);
        sol.shuffle_layer_window(0, 3, 7, &mut rng);

        let ids = sol.layer_ids(0);
        assert_eq!(&ids[..3], &[1, 2, 3]);
        assert_eq!(&ids[7..], &[8, 9, 10]);
        let mut window = ids[3..7].to_vec();
        window.sort_unstable();
        assert_eq!(window, vec![4, 5, 6, 7]);
        for (pos, &idx) in sol.layer(0).nodes.iter().enumerate() {
            assert_eq!(sol.nodes()[idx].position, pos);
        }
    }

    #[test]
    fn test_adopt_layers_then_boundary_refresh() {
        let mut rng = create_rng(23);
        let inst = sparse(6);
        let a = Solution::random(1, Arc::clone(&inst), &mut rng);
        let b = Solution::random(2, Arc::clone(&inst), &mut rng);
        let mut child = a.clone();
        child.adopt_layers(&b, 2..5);
        child.update_layer(1).unwrap();
        child.update_total_cross();
        child.check().unwrap();
        assert_eq!(child.layer_ids(0), a.layer_ids(0));
        assert_eq!(child.layer_ids(3), b.layer_ids(3));
    }

    #[test]
    fn test_node_by_id() {
        let sol = Solution::new(1, crossed_pair());
        assert_eq!(sol.node_by_id(3).map(|n| n.layer), Some(1));
        assert!(sol.node_by_id(0).is_none());
        assert!(sol.node_by_id(5).is_none());
    }

    #[test]
    fn test_layer_dump_format() {
        let sol = Solution::from_orders(1, crossed_pair(), &[vec![2, 1], vec![3, 4]]).unwrap();
        assert_eq!(sol.layer_dump(), "1\t2,1\n2\t3,4\n");
        assert_eq!(sol.to_string(), "M=0\n1\t2,1\n2\t3,4\n");
    }
}
