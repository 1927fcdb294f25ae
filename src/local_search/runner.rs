//! Local search execution loop.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, trace};

use super::config::{LocalSearchConfig, ScanStrategy};
use crate::random::rand_between;
use crate::solution::{is_cross, Solution};

/// Result of a local search run.
#[derive(Debug, Clone)]
pub struct LocalSearchResult {
    /// Best solution seen along the trajectory, fully consistent.
    pub best: Solution,

    /// Objective of the input solution.
    pub initial_objective: usize,

    /// Objective of `best`.
    pub best_objective: usize,

    /// Number of moves applied.
    pub moves: usize,
}

/// A candidate relocation of one node inside its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Move {
    node: usize,
    new_pos: usize,
    delta: i64,
}

/// Keeps the most negative delta; equal deltas are sampled uniformly
/// (the k-th tie replaces the incumbent with probability 1/k).
#[derive(Debug, Default)]
struct Reservoir {
    best: Option<Move>,
    ties: usize,
}

impl Reservoir {
    fn offer<R: Rng>(&mut self, candidate: Move, rng: &mut R) {
        match self.best {
            Some(best) if candidate.delta > best.delta => {}
            Some(best) if candidate.delta == best.delta => {
                if rand_between(rng, 0, self.ties) == 0 {
                    self.best = Some(candidate);
                }
                self.ties += 1;
            }
            _ => {
                self.best = Some(candidate);
                self.ties = 1;
            }
        }
    }

    fn improving(&self) -> bool {
        self.best.is_some_and(|m| m.delta < 0)
    }
}

/// Executes the relocation local search.
pub struct LocalSearchRunner;

impl LocalSearchRunner {
    /// Improves a copy of `solution` by single-node relocations until no
    /// move has a negative delta, `M == 0`, or the move cap is reached.
    ///
    /// An unevaluated input is evaluated first. The input is never modified.
    pub fn run<R: Rng>(
        solution: &Solution,
        config: &LocalSearchConfig,
        rng: &mut R,
    ) -> LocalSearchResult {
        let mut current = solution.clone();
        if current.needs_evaluation() {
            current.calc_all_node_max_cross();
        }
        let initial_objective = current.objective();
        let max_distance = config.move_max_distance(current.instance().max_layer_size());

        let mut best = current.clone();
        let mut moves = 0;

        while current.objective() > 0 && (config.max_moves == 0 || moves < config.max_moves) {
            let Some(mv) = find_move(&mut current, config, max_distance, rng) else {
                break;
            };
            trace!(
                node = mv.node + 1,
                from = current.nodes()[mv.node].position,
                to = mv.new_pos,
                delta = mv.delta,
                "relocate"
            );
            apply_move(&mut current, mv);
            moves += 1;

            if current.objective() < best.objective() {
                best = current.clone();
            }
        }

        // Prefer the final state over a snapshot of equal M.
        let mut best = if current.objective() <= best.objective() {
            current
        } else {
            best
        };
        best.update_total_cross();
        debug_assert_eq!(best.check().map_err(|e| e.to_string()), Ok(()));

        debug!(
            moves,
            initial = initial_objective,
            best = best.objective(),
            "local search finished"
        );
        LocalSearchResult {
            best_objective: best.objective(),
            best,
            initial_objective,
            moves,
        }
    }
}

/// Scans the ranking for the best improving relocation.
fn find_move<R: Rng>(
    sol: &mut Solution,
    config: &LocalSearchConfig,
    max_distance: usize,
    rng: &mut R,
) -> Option<Move> {
    let curr_m = sol.objective() as i64;
    let lambda = config.lambda as i64;
    let mut reservoir = Reservoir::default();

    for rank in 0..sol.ranking().len() {
        if config.scan == ScanStrategy::FirstImprovingNode && reservoir.improving() {
            break;
        }
        let node = sol.ranking()[rank];
        let position = sol.nodes()[node].position;
        let layer_size = sol.layer(sol.nodes()[node].layer).len();
        let lower = position.saturating_sub(max_distance);
        let upper = (position + max_distance).min(layer_size - 1);

        if lower < position {
            if let Some(mv) = try_move_left(sol, node, lower, curr_m, lambda, rng) {
                reservoir.offer(mv, rng);
            }
        }
        if upper > position {
            if let Some(mv) = try_move_right(sol, node, upper, curr_m, lambda, rng) {
                reservoir.offer(mv, rng);
            }
        }
    }

    reservoir.best.filter(|mv| mv.delta < 0)
}

/// Slides `node` left one swap at a time down to `lower`, scoring each stop.
fn try_move_left<R: Rng>(
    sol: &mut Solution,
    node: usize,
    lower: usize,
    curr_m: i64,
    lambda: i64,
    rng: &mut R,
) -> Option<Move> {
    let layer = sol.nodes[node].layer;
    let from = sol.nodes[node].position;
    reset_tmp_cross(sol, layer, lower, from);

    let mut reservoir = Reservoir::default();
    let mut delta = 0;
    for new_pos in (lower..from).rev() {
        let neighbour = sol.layers[layer].nodes[new_pos];
        delta += swap_delta(sol, neighbour, node, new_pos, curr_m, lambda);
        reservoir.offer(Move { node, new_pos, delta }, rng);
        update_tmp_cross(sol, node);
        update_tmp_cross(sol, neighbour);
    }
    reservoir.best
}

/// Slides `node` right one swap at a time up to `upper`, scoring each stop.
fn try_move_right<R: Rng>(
    sol: &mut Solution,
    node: usize,
    upper: usize,
    curr_m: i64,
    lambda: i64,
    rng: &mut R,
) -> Option<Move> {
    let layer = sol.nodes[node].layer;
    let from = sol.nodes[node].position;
    reset_tmp_cross(sol, layer, from, upper);

    let mut reservoir = Reservoir::default();
    let mut delta = 0;
    for new_pos in from + 1..=upper {
        let neighbour = sol.layers[layer].nodes[new_pos];
        delta += swap_delta(sol, node, neighbour, new_pos - 1, curr_m, lambda);
        reservoir.offer(Move { node, new_pos, delta }, rng);
        update_tmp_cross(sol, node);
        update_tmp_cross(sol, neighbour);
    }
    reservoir.best
}

/// Seeds the overlay of every edge touching `layer[lower..=upper]`.
fn reset_tmp_cross(sol: &mut Solution, layer: usize, lower: usize, upper: usize) {
    let inst = Arc::clone(&sol.instance);
    for pos in lower..=upper {
        let node = sol.layers[layer].nodes[pos];
        for &e in inst.out_edges(node).iter().chain(inst.in_edges(node)) {
            sol.edges[e].tmp_cross = sol.edges[e].num_cross as i64;
        }
    }
}

fn update_tmp_cross(sol: &mut Solution, node: usize) {
    let inst = Arc::clone(&sol.instance);
    for &e in inst.out_edges(node).iter().chain(inst.in_edges(node)) {
        let edge = &mut sol.edges[e];
        edge.tmp_cross += edge.tmp_delta_cross;
    }
}

/// Scores swapping `left` (at `left_pos`) with `right` (at `left_pos + 1`)
/// against the overlay, recording each edge's change in `tmp_delta_cross`.
fn swap_delta(
    sol: &mut Solution,
    left: usize,
    right: usize,
    left_pos: usize,
    curr_m: i64,
    lambda: i64,
) -> i64 {
    let inst = Arc::clone(&sol.instance);
    let right_pos = left_pos + 1;
    for node in [left, right] {
        for &e in inst.out_edges(node).iter().chain(inst.in_edges(node)) {
            sol.edges[e].tmp_delta_cross = 0;
        }
    }

    for &eb in inst.out_edges(right) {
        let qb = sol.nodes[inst.edge(eb).destination].position;
        for &ea in inst.out_edges(left) {
            let qa = sol.nodes[inst.edge(ea).destination].position;
            if qa == qb {
                continue;
            }
            let flip = if is_cross(left_pos, qa, right_pos, qb) { -1 } else { 1 };
            sol.edges[ea].tmp_delta_cross += flip;
            sol.edges[eb].tmp_delta_cross += flip;
        }
    }
    for &eb in inst.in_edges(right) {
        let qb = sol.nodes[inst.edge(eb).origin].position;
        for &ea in inst.in_edges(left) {
            let qa = sol.nodes[inst.edge(ea).origin].position;
            if qa == qb {
                continue;
            }
            let flip = if is_cross(qa, left_pos, qb, right_pos) { -1 } else { 1 };
            sol.edges[ea].tmp_delta_cross += flip;
            sol.edges[eb].tmp_delta_cross += flip;
        }
    }

    [left, right]
        .iter()
        .flat_map(|&node| inst.out_edges(node).iter().chain(inst.in_edges(node)))
        .map(|&e| {
            let edge = &sol.edges[e];
            score_change(edge.tmp_cross, edge.tmp_cross + edge.tmp_delta_cross, curr_m, lambda)
        })
        .sum()
}

/// Score of one edge going from `old` to `new` crossings while the
/// objective is `curr_m`. Negative is better.
fn score_change(old: i64, new: i64, curr_m: i64, lambda: i64) -> i64 {
    if old < curr_m && new == curr_m {
        1
    } else if old <= curr_m && new > curr_m {
        lambda * (new - curr_m)
    } else if old == curr_m && new < curr_m {
        -1
    } else {
        0
    }
}

/// Position of the node at `pos` after the node at `from` moves to `to`.
fn shifted_position(from: usize, to: usize, pos: usize) -> usize {
    if pos == from {
        to
    } else if from < to && pos > from && pos <= to {
        pos - 1
    } else if to < from && pos >= to && pos < from {
        pos + 1
    } else {
        pos
    }
}

/// Commits a move: patches the counts of every edge pair inside the window,
/// rotates the layer, refreshes the affected maxima and the ranking.
fn apply_move(sol: &mut Solution, mv: Move) {
    let inst = Arc::clone(&sol.instance);
    let layer = sol.nodes[mv.node].layer;
    let from = sol.nodes[mv.node].position;
    let (lower, upper) = (from.min(mv.new_pos), from.max(mv.new_pos));
    let window: Vec<usize> = sol.layers[layer].nodes[lower..=upper].to_vec();

    for (a, &na) in window.iter().enumerate() {
        let (ia, ja) = (lower + a, shifted_position(from, mv.new_pos, lower + a));
        for (b, &nb) in window.iter().enumerate().skip(a + 1) {
            let (ib, jb) = (lower + b, shifted_position(from, mv.new_pos, lower + b));

            for &ea in inst.out_edges(na) {
                let qa = sol.nodes[inst.edge(ea).destination].position;
                for &eb in inst.out_edges(nb) {
                    let qb = sol.nodes[inst.edge(eb).destination].position;
                    if qa == qb {
                        continue;
                    }
                    let d = is_cross(ja, qa, jb, qb) as isize - is_cross(ia, qa, ib, qb) as isize;
                    patch_pair(sol, ea, eb, d);
                }
            }
            for &ea in inst.in_edges(na) {
                let qa = sol.nodes[inst.edge(ea).origin].position;
                for &eb in inst.in_edges(nb) {
                    let qb = sol.nodes[inst.edge(eb).origin].position;
                    if qa == qb {
                        continue;
                    }
                    let d = is_cross(qa, ja, qb, jb) as isize - is_cross(qa, ia, qb, ib) as isize;
                    patch_pair(sol, ea, eb, d);
                }
            }
        }
    }

    let order = &mut sol.layers[layer].nodes;
    if mv.new_pos > from {
        order[lower..=upper].rotate_left(1);
    } else {
        order[lower..=upper].rotate_right(1);
    }
    for pos in lower..=upper {
        let idx = sol.layers[layer].nodes[pos];
        sol.nodes[idx].position = pos;
    }

    let mut touched = window.clone();
    for &node in &window {
        touched.extend(inst.out_edges(node).iter().map(|&e| inst.edge(e).destination));
        touched.extend(inst.in_edges(node).iter().map(|&e| inst.edge(e).origin));
    }
    touched.sort_unstable();
    touched.dedup();
    for node in touched {
        sol.calc_node_max_cross(node);
    }
    sol.sort_ranking();
    sol.modified = true;
}

fn patch_pair(sol: &mut Solution, ea: usize, eb: usize, d: isize) {
    if d == 0 {
        return;
    }
    for e in [ea, eb] {
        let edge = &mut sol.edges[e];
        edge.num_cross = edge.num_cross.saturating_add_signed(d);
    }
}
