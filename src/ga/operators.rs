//! Layer-order genetic operators.
//!
//! Every operator leaves the solution fully consistent (counts, ranking and
//! totals) and returns the evaluation cost it incurred, measured in
//! [`update_layer`](Solution::update_layer) fractions.
//!
//! # Crossover
//!
//! - [`layer_split_crossover`]: one-point crossover on the layer list
//!
//! # Mutation
//!
//! - [`barycenter_mutation`]: move a node of a congested layer to the mean
//!   position of its neighbours
//! - [`directed_mutation`]: probe positions around a node and commit the
//!   best one that lowers its layers' crossing total
//!
//! # References
//!
//! - Sugiyama, Tagawa & Toda (1981), "Methods for Visual Understanding of
//!   Hierarchical System Structures"

use std::sync::Arc;

use rand::Rng;

use crate::error::Result;
use crate::random::rand_between;
use crate::solution::Solution;

/// Splits both parents at layer `L / 2` and swaps the lower halves.
///
/// Only the boundary layer pair is recounted. Returns `None` when the
/// instance has fewer than two layers.
pub fn layer_split_crossover(
    a: &Solution,
    b: &Solution,
    ids: (usize, usize),
) -> Result<Option<(Solution, Solution, f64)>> {
    let num_layers = a.instance().num_layers();
    if num_layers < 2 {
        return Ok(None);
    }
    let cut = num_layers / 2;

    let mut cost = 0.0;
    let mut children = Vec::with_capacity(2);
    for (upper, lower, id) in [(a, b, ids.0), (b, a, ids.1)] {
        let mut child = upper.clone();
        child.set_id(id);
        child.adopt_layers(lower, cut..num_layers);
        cost += child.update_layer(cut - 1)?;
        child.update_total_cross();
        children.push(child);
    }
    let second = children.pop();
    let first = children.pop();
    Ok(first.zip(second).map(|(x, y)| (x, y, cost)))
}

/// Relocates one node of the `layer_count` most crossed layers to the
/// rounded mean position of its neighbours.
///
/// Candidates are sampled without replacement until one actually moves.
/// Returns the evaluation cost, or `None` if nothing moved.
pub fn barycenter_mutation<R: Rng>(
    sol: &mut Solution,
    layer_count: usize,
    rng: &mut R,
) -> Result<Option<f64>> {
    let mut by_cross: Vec<usize> = (0..sol.layers().len()).collect();
    by_cross.sort_by(|&x, &y| sol.layer(y).num_cross.cmp(&sol.layer(x).num_cross));

    let mut candidates: Vec<usize> = by_cross
        .into_iter()
        .take(layer_count)
        .filter(|&l| sol.layer(l).num_cross > 0)
        .flat_map(|l| sol.layer(l).nodes.clone())
        .collect();

    while !candidates.is_empty() {
        let node = candidates.swap_remove(rand_between(rng, 0, candidates.len() - 1));
        let Some(target) = barycenter(sol, node) else {
            continue;
        };
        let layer = sol.nodes()[node].layer;
        let target = target.min(sol.layer(layer).len() - 1);
        if target == sol.nodes()[node].position {
            continue;
        }
        sol.relocate(node, target);
        return refresh_around(sol, layer).map(Some);
    }
    Ok(None)
}

/// Rounded mean neighbour position; the mean of both sides when the node has
/// neighbours above and below. `None` for an isolated node.
fn barycenter(sol: &Solution, node: usize) -> Option<usize> {
    let inst = sol.instance();
    let mean = |positions: Vec<usize>| {
        (!positions.is_empty())
            .then(|| positions.iter().sum::<usize>() as f64 / positions.len() as f64)
    };
    let below = mean(
        inst.out_edges(node)
            .iter()
            .map(|&e| sol.nodes()[inst.edge(e).destination].position)
            .collect(),
    );
    let above = mean(
        inst.in_edges(node)
            .iter()
            .map(|&e| sol.nodes()[inst.edge(e).origin].position)
            .collect(),
    );
    let value = match (below, above) {
        (Some(b), Some(a)) => (a + b) / 2.0,
        (Some(x), None) | (None, Some(x)) => x,
        (None, None) => return None,
    };
    Some(value.round() as usize)
}

/// Draws nodes by roulette on `total_cross + 1` and probes up to `radius`
/// positions each way with the incremental sweep. The first node with a
/// position strictly below its current layer-pair total is moved there
/// (closest position wins, right before left at equal distance).
///
/// Stops without moving when the solution has no crossings, when a drawn
/// node's layer pairs have none, or after `N − 1` fruitless draws. Returns
/// the evaluation cost, or `None` if nothing moved.
pub fn directed_mutation<R: Rng>(
    sol: &mut Solution,
    radius: usize,
    rng: &mut R,
) -> Result<Option<f64>> {
    if sol.total_cross() == 0 {
        return Ok(None);
    }
    let inst = Arc::clone(sol.instance());
    let n = inst.num_nodes();
    let num_edges = inst.num_edges().max(1) as f64;
    let mut visited = vec![false; n];
    let mut cost = 0.0;

    for _ in 0..n.saturating_sub(1) {
        let total_weight: usize = (0..n)
            .filter(|&i| !visited[i])
            .map(|i| sol.nodes()[i].total_cross + 1)
            .sum();
        let ticket = rand_between(rng, 1, total_weight);
        let mut acc = 0;
        let Some(node) = (0..n).filter(|&i| !visited[i]).find(|&i| {
            acc += sol.nodes()[i].total_cross + 1;
            acc >= ticket
        }) else {
            break;
        };
        visited[node] = true;

        let layer = sol.nodes()[node].layer;
        let sweep = sol.sweep_cross_totals(node, radius);
        let touched = inst.layer_in_edges(layer).len() + inst.layer_out_edges(layer).len();
        cost += touched as f64 / num_edges;
        if sweep.base == 0 {
            break;
        }

        let mut choice: Option<(usize, usize)> = None;
        for d in 0..sweep.left.len().max(sweep.right.len()) {
            for probe in [sweep.right.get(d), sweep.left.get(d)].into_iter().flatten() {
                let bound = choice.map_or(sweep.base, |(_, total)| total);
                if probe.1 < bound {
                    choice = Some(*probe);
                }
            }
        }

        if let Some((position, _)) = choice {
            sol.relocate(node, position);
            return Ok(Some(cost + refresh_around(sol, layer)?));
        }
    }
    Ok(None)
}

/// Recounts the layer pairs above and below `layer`, then the totals.
fn refresh_around(sol: &mut Solution, layer: usize) -> Result<f64> {
    let mut cost = sol.update_layer(layer)?;
    if layer > 0 {
        cost += sol.update_layer(layer - 1)?;
    }
    sol.update_total_cross();
    Ok(cost)
}
