//! Dense node × slot matrices for pheromone and heuristic information.

use crate::solution::Solution;

/// An `N × N` matrix indexed by node index and global slot.
///
/// The global slot of position `p` in layer `l` is `layer_offset(l) + p`,
/// so each layer only uses its own block of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl SlotMatrix {
    /// Creates a `size × size` matrix with every cell set to `value`.
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, node: usize, slot: usize) -> f64 {
        self.cells[node * self.size + slot]
    }

    #[inline]
    pub fn add(&mut self, node: usize, slot: usize, amount: f64) {
        self.cells[node * self.size + slot] += amount;
    }

    /// Moves every cell toward `baseline`: `v = (1 − rho)·v + rho·baseline`.
    pub fn evaporate(&mut self, rho: f64, baseline: f64) {
        for cell in &mut self.cells {
            *cell = (1.0 - rho) * *cell + rho * baseline;
        }
    }

    /// Adds `amount` to the cell of every (node, slot) pair of `solution`.
    pub fn reinforce_solution(&mut self, solution: &Solution, amount: f64) {
        for (node, slot) in slots_of(solution) {
            self.add(node, slot, amount);
        }
    }
}

/// The `(node index, global slot)` pairs of a solution.
pub fn slots_of(solution: &Solution) -> impl Iterator<Item = (usize, usize)> + '_ {
    let inst = solution.instance();
    solution
        .nodes()
        .iter()
        .enumerate()
        .map(move |(idx, node)| (idx, inst.layer_offset(node.layer) + node.position))
}
