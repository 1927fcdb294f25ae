//! Parent selection and survivor replacement.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use rand::Rng;

use super::types::Individual;
use crate::random::rand_between;

/// Runs `winners` tournaments of size `k` over `population` and returns the
/// winners' indices in selection order.
///
/// Candidates of one tournament are distinct and never include an earlier
/// winner. The lowest fitness wins; on equal fitness the later candidate
/// wins.
///
/// # Panics
/// Panics if fewer than `k` individuals are available for the last
/// tournament (`population.len() < winners - 1 + k`).
pub fn tournament_without_reuse<I: Individual, R: Rng>(
    population: &[I],
    k: usize,
    winners: usize,
    rng: &mut R,
) -> Vec<usize> {
    let n = population.len();
    let k = k.max(1);
    if winners == 0 {
        return Vec::new();
    }
    assert!(
        n + 1 >= winners + k,
        "cannot run {winners} tournaments of size {k} over {n} individuals"
    );

    let mut won = vec![false; n];
    let mut selected = Vec::with_capacity(winners);
    let mut candidates = Vec::with_capacity(k);
    for _ in 0..winners {
        candidates.clear();
        while candidates.len() < k {
            let idx = rand_between(rng, 0, n - 1);
            if !won[idx] && !candidates.contains(&idx) {
                candidates.push(idx);
            }
        }
        let mut winner = candidates[0];
        for &idx in &candidates[1..] {
            if population[idx].fitness() <= population[winner].fitness() {
                winner = idx;
            }
        }
        won[winner] = true;
        selected.push(winner);
    }
    selected
}

/// Places `offspring` into `population`.
///
/// Slots holding an unmodified individual whose objective repeats its
/// predecessor's are filled first, in order. Remaining offspring go to
/// uniformly drawn, not yet replaced slots of the worse half. Offspring that
/// find no free slot are dropped; their count is returned.
///
/// `population` must be sorted best first.
pub fn replace_into<I: Individual, R: Rng>(
    population: &mut [I],
    offspring: Vec<I>,
    rng: &mut R,
) -> usize {
    let n = population.len();
    let mut taken = vec![false; n];
    let mut repeated = Vec::new();
    for i in 1..n {
        let current = &population[i];
        if !current.is_modified() && current.objective() <= population[i - 1].objective() {
            repeated.push(i);
            taken[i] = true;
        }
    }

    let mut offspring = offspring.into_iter();
    for slot in repeated {
        match offspring.next() {
            Some(child) => population[slot] = child,
            None => return 0,
        }
    }

    let mut free: Vec<usize> = (n / 2..n).filter(|&i| !taken[i]).collect();
    let mut dropped = 0;
    for child in offspring {
        if free.is_empty() {
            dropped += 1;
            continue;
        }
        let pick = rand_between(rng, 0, free.len() - 1);
        population[free.swap_remove(pick)] = child;
    }
    dropped
}
