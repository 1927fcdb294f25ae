//! Brute-force consistency check of a solution.

use super::{is_cross, Solution};
use crate::error::{MmacError, Result};

fn violation(message: String) -> MmacError {
    MmacError::Invariant(message)
}

impl Solution {
    /// Verifies every solution invariant against a from-scratch recount.
    ///
    /// Returns the first violation found as [`MmacError::Invariant`].
    pub fn check(&self) -> Result<()> {
        let inst = &self.instance;
        let n = inst.num_nodes();

        // layers: membership, uniqueness, contiguous positions
        let mut seen = vec![false; n];
        for (l, layer) in self.layers.iter().enumerate() {
            if layer.index != l {
                return Err(violation(format!("layer {l} carries index {}", layer.index)));
            }
            if layer.len() != inst.layer_size(l) {
                return Err(violation(format!(
                    "layer {l} holds {} nodes, expected {}",
                    layer.len(),
                    inst.layer_size(l)
                )));
            }
            for (pos, &idx) in layer.nodes.iter().enumerate() {
                let node = &self.nodes[idx];
                if node.id != idx + 1 {
                    return Err(violation(format!("node index {idx} carries id {}", node.id)));
                }
                if inst.node_layer(idx) != l || node.layer != l {
                    return Err(violation(format!("node {} placed in layer {l}", node.id)));
                }
                if node.position != pos {
                    return Err(violation(format!(
                        "node {} at slot {pos} records position {}",
                        node.id, node.position
                    )));
                }
                if std::mem::replace(&mut seen[idx], true) {
                    return Err(violation(format!("node {} appears twice", node.id)));
                }
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(violation(format!("node {} is in no layer", missing + 1)));
        }

        // edges: brute-force recount per layer pair
        let mut recount = vec![0usize; self.edges.len()];
        for l in 0..inst.num_layers() {
            let edges = inst.layer_out_edges(l);
            for (a, &ea) in edges.iter().enumerate() {
                let x = inst.edge(ea);
                for &eb in &edges[a + 1..] {
                    let y = inst.edge(eb);
                    if x.origin == y.origin || x.destination == y.destination {
                        continue;
                    }
                    if is_cross(
                        self.nodes[x.origin].position,
                        self.nodes[x.destination].position,
                        self.nodes[y.origin].position,
                        self.nodes[y.destination].position,
                    ) {
                        recount[ea] += 1;
                        recount[eb] += 1;
                    }
                }
            }
        }
        for (edge, &expected) in self.edges.iter().zip(&recount) {
            if edge.num_cross != expected {
                return Err(violation(format!(
                    "edge {} records {} crossings, recount gives {expected}",
                    edge.id, edge.num_cross
                )));
            }
        }

        // node maxima
        for (idx, node) in self.nodes.iter().enumerate() {
            let expected = inst
                .out_edges(idx)
                .iter()
                .chain(inst.in_edges(idx))
                .map(|&e| recount[e])
                .max()
                .unwrap_or(0);
            if node.max_cross != expected {
                return Err(violation(format!(
                    "node {} records max {} but incident edges give {expected}",
                    node.id, node.max_cross
                )));
            }
        }

        // ranking and objective
        if self.ranking.len() != n {
            return Err(violation(format!(
                "ranking holds {} entries for {n} nodes",
                self.ranking.len()
            )));
        }
        if let Some(w) = self
            .ranking
            .windows(2)
            .find(|w| self.nodes[w[0]].max_cross < self.nodes[w[1]].max_cross)
        {
            return Err(violation(format!(
                "ranking out of order at nodes {} and {}",
                w[0] + 1,
                w[1] + 1
            )));
        }
        let m = recount.iter().copied().max().unwrap_or(0);
        if self.objective() != m {
            return Err(violation(format!(
                "objective {} but largest edge count is {m}",
                self.objective()
            )));
        }

        let total: usize = recount.iter().sum();
        if self.total_cross != total {
            return Err(violation(format!(
                "total crossings {} but recount gives {total}",
                self.total_cross
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn test_check_accepts_evaluated() {
        let sol = Solution::from_orders(1, crossed_pair(), &[vec![1, 2], vec![3, 4]]).unwrap();
        assert!(sol.check().is_ok());
    }

    #[test]
    fn test_check_rejects_stale_counts() {
        let mut sol = Solution::from_orders(1, crossed_pair(), &[vec![1, 2], vec![3, 4]]).unwrap();
        sol.relocate(0, 1);
        let err = sol.check().unwrap_err();
        assert!(matches!(err, MmacError::Invariant(msg) if msg.contains("recount")));
    }

    #[test]
    fn test_check_rejects_unsorted_ranking() {
        // node 5 is isolated, so it ranks last with max 0
        let inst = std::sync::Arc::new(
            crate::instance::InstanceData::new(vec![2, 3], &[(1, 4), (2, 3)]).unwrap(),
        );
        let mut sol = Solution::from_orders(1, inst, &[vec![1, 2], vec![3, 4, 5]]).unwrap();
        assert!(sol.check().is_ok());
        sol.ranking.reverse();
        assert!(sol.check().is_err());
    }

    #[test]
    fn test_check_rejects_broken_positions() {
        let mut sol = Solution::from_orders(1, crossed_pair(), &[vec![1, 2], vec![4, 3]]).unwrap();
        sol.nodes[0].position = 1;
        assert!(sol.check().is_err());
    }

    #[test]
    fn test_unevaluated_solution_fails_check() {
        let sol = Solution::new(1, crossed_pair());
        assert!(sol.check().is_err());
    }
}
