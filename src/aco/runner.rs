//! ACO colony loop.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use super::config::AcoConfig;
use super::matrix::{slots_of, SlotMatrix};
use crate::error::Result;
use crate::instance::InstanceData;
use crate::local_search::LocalSearchRunner;
use crate::random::{create_rng, rand_between};
use crate::solution::Solution;
use crate::termination::{Improvement, StopReason, Termination};

/// Result of an ACO run.
#[derive(Debug, Clone)]
pub struct AcoResult {
    /// Best solution found, fully consistent.
    pub best: Solution,

    /// `M` of `best`.
    pub best_objective: usize,

    /// Colonies completed.
    pub colonies: usize,

    /// Full evaluations performed (construction and reference).
    pub evaluations: usize,

    /// Every new run-best, in discovery order.
    pub improvements: Vec<Improvement>,

    /// Heuristic weight `β` after the last colony.
    pub final_beta: f64,

    pub stop_reason: StopReason,

    pub elapsed: Duration,
}

/// Executes the ant colony optimizer.
pub struct AcoRunner;

impl AcoRunner {
    /// Runs ACO on `instance`.
    pub fn run(instance: Arc<InstanceData>, config: &AcoConfig) -> Result<AcoResult> {
        Self::run_with_cancel(instance, config, None)
    }

    /// Runs ACO with an optional cancellation token, polled before every
    /// colony.
    pub fn run_with_cancel(
        instance: Arc<InstanceData>,
        config: &AcoConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AcoResult> {
        config.validate()?;

        let mut rng = create_rng(config.effective_seed());
        let termination = Termination::start(
            config.time_limit(),
            config.target_objective,
            config.max_colonies,
        )
        .with_cancel(cancel);
        let deadline = *termination.deadline();

        let n = instance.num_nodes();
        let mut pheromone = SlotMatrix::filled(n, config.initial_pheromone);
        let mut heuristic = SlotMatrix::filled(n, config.initial_pheromone);
        let mut next_id = 1;

        // Reference solution: seeds the heuristic matrix and the run-best.
        let reference = Solution::random(next_id, Arc::clone(&instance), &mut rng);
        next_id += 1;
        let mut best = LocalSearchRunner::run(&reference, &config.local_search, &mut rng).best;
        heuristic.reinforce_solution(&best, config.initial_pheromone);
        let mut evaluations = 1;
        let mut improvements = vec![Improvement {
            iteration: 0,
            objective: best.objective(),
            elapsed_secs: deadline.elapsed_secs(),
        }];
        info!(objective = best.objective(), "aco reference solution");

        let mut beta = config.beta;
        let mut stagnation = 0;
        let mut colonies = 0;

        let stop_reason = loop {
            if let Some(reason) = termination.check(colonies, best.objective()) {
                break reason;
            }
            let mut improved = false;
            let mut record = |candidate: &Solution, best: &mut Solution| {
                if candidate.objective() < best.objective() {
                    *best = candidate.clone();
                    improvements.push(Improvement {
                        iteration: colonies,
                        objective: best.objective(),
                        elapsed_secs: deadline.elapsed_secs(),
                    });
                    info!(
                        colony = colonies,
                        objective = best.objective(),
                        elapsed_secs = deadline.elapsed_secs(),
                        "aco new best"
                    );
                    true
                } else {
                    false
                }
            };

            let mut ants = Vec::with_capacity(config.ants);
            for _ in 0..config.ants {
                let mut ant = construct(
                    next_id,
                    &instance,
                    &pheromone,
                    &heuristic,
                    config.alpha,
                    beta,
                    &mut rng,
                );
                next_id += 1;
                ant.calc_all_node_max_cross();
                evaluations += 1;
                improved |= record(&ant, &mut best);
                ants.push(ant);
            }

            let decayed = decayed_beta(beta, stagnation, improved, config);
            if decayed != beta {
                beta = decayed;
                debug!(colony = colonies, beta, "heuristic weight decayed");
            }

            let max_total = ants.iter().map(Solution::total_cross).max().unwrap_or(0);
            for ant in &mut ants {
                ant.normalize_total_cross(max_total);
            }
            ants.sort_by(|a, b| a.penalized_fitness().total_cmp(&b.penalized_fitness()));
            update_pheromone(&mut pheromone, &ants, &best, config);

            for ant in &mut ants {
                ant.perturb(config.perturbation_strength, 0, &mut rng);
            }
            for ant in &mut ants {
                *ant = LocalSearchRunner::run(ant, &config.local_search, &mut rng).best;
                improved |= record(ant, &mut best);
            }

            stagnation = if improved { 0 } else { stagnation + 1 };
            colonies += 1;
            if colonies % 10 == 0 {
                debug!(colonies, best = best.objective(), stagnation, "colony progress");
            }
        };

        debug_assert_eq!(best.check().map_err(|e| e.to_string()), Ok(()));
        info!(
            objective = best.objective(),
            colonies,
            ?stop_reason,
            elapsed_secs = deadline.elapsed_secs(),
            "aco finished"
        );

        Ok(AcoResult {
            best_objective: best.objective(),
            best,
            colonies,
            evaluations,
            improvements,
            final_beta: beta,
            stop_reason,
            elapsed: deadline.elapsed(),
        })
    }
}

/// `β` for the current colony. It decays once `stagnation_colonies`
/// colonies passed without improvement, unless an ant built in this colony
/// already improved the run-best.
fn decayed_beta(
    beta: f64,
    stagnation: usize,
    constructed_improvement: bool,
    config: &AcoConfig,
) -> f64 {
    if !constructed_improvement && stagnation >= config.stagnation_colonies {
        beta * (1.0 - config.beta_decay)
    } else {
        beta
    }
}

/// Builds one ant: every layer is filled left to right, each slot drawing
/// one of the remaining nodes by roulette over `τ^α · η^β`.
fn construct<R: Rng>(
    id: usize,
    instance: &Arc<InstanceData>,
    pheromone: &SlotMatrix,
    heuristic: &SlotMatrix,
    alpha: f64,
    beta: f64,
    rng: &mut R,
) -> Solution {
    let mut ant = Solution::new(id, Arc::clone(instance));
    let mut cumulative = Vec::with_capacity(instance.max_layer_size());

    for layer in 0..instance.num_layers() {
        let offset = instance.layer_offset(layer);
        let mut remaining: Vec<usize> = instance.layer_nodes(layer).collect();
        let mut order = Vec::with_capacity(remaining.len());

        for slot in offset..offset + instance.layer_size(layer) {
            let pick = if remaining.len() == 1 {
                0
            } else {
                cumulative.clear();
                let mut total = 0.0;
                for &node in &remaining {
                    total += pheromone.get(node, slot).powf(alpha)
                        * heuristic.get(node, slot).powf(beta);
                    cumulative.push(total);
                }
                if total > 0.0 && total.is_finite() {
                    let r = rng.random::<f64>() * total;
                    cumulative.partition_point(|&c| c <= r).min(remaining.len() - 1)
                } else {
                    rand_between(rng, 0, remaining.len() - 1)
                }
            };
            order.push(remaining.remove(pick));
        }
        ant.set_layer_order(layer, order);
    }
    ant
}

/// Evaporates, then reinforces the slots used by the elite ants and the
/// run-best with `(1/M_best + Σ 1/(2·M_k)) / 2`.
fn update_pheromone(
    pheromone: &mut SlotMatrix,
    ants: &[Solution],
    best: &Solution,
    config: &AcoConfig,
) {
    pheromone.evaporate(config.rho, config.initial_pheromone);

    let elite = &ants[..config.elite_ants().min(ants.len())];
    let mut amount = 1.0 / best.objective().max(1) as f64;
    let mut slots: Vec<(usize, usize)> = slots_of(best).collect();
    for ant in elite {
        amount += 1.0 / (2.0 * ant.objective().max(1) as f64);
        slots.extend(slots_of(ant));
    }
    amount /= 2.0;

    slots.sort_unstable();
    slots.dedup();
    for (node, slot) in slots {
        pheromone.add(node, slot, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::parse_instance;
    use crate::solution::fixtures::complete_layers;

    fn layered(seed: u64, layers: usize, width: usize, edges: usize) -> Arc<InstanceData> {
        let mut rng = create_rng(seed);
        let list: Vec<(usize, usize)> = (0..edges)
            .map(|_| {
                let l = rand_between(&mut rng, 0, layers - 2);
                let a = rand_between(&mut rng, 0, width - 1);
                let b = rand_between(&mut rng, 0, width - 1);
                (l * width + a + 1, (l + 1) * width + b + 1)
            })
            .collect();
        Arc::new(InstanceData::new(vec![width; layers], &list).unwrap())
    }

    fn quick_config() -> AcoConfig {
        AcoConfig::default()
            .with_ants(8)
            .with_seed(42)
            .with_time_limit_ms(60_000)
            .with_max_colonies(3)
    }

    #[test]
    fn test_construct_yields_permutations() {
        let inst = layered(1, 4, 6, 30);
        let n = inst.num_nodes();
        let tau = SlotMatrix::filled(n, 1.1);
        let eta = SlotMatrix::filled(n, 1.1);
        let mut rng = create_rng(4);
        let mut ant = construct(1, &inst, &tau, &eta, 1.0, 0.5, &mut rng);
        ant.calc_all_node_max_cross();
        ant.check().unwrap();
    }

    #[test]
    fn test_construct_follows_dominant_pheromone() {
        let inst = Arc::new(InstanceData::new(vec![3], &[]).unwrap());
        let mut tau = SlotMatrix::filled(3, 1e-9);
        // node 3 -> slot 0, node 1 -> slot 1, node 2 -> slot 2
        tau.add(2, 0, 1e6);
        tau.add(0, 1, 1e6);
        tau.add(1, 2, 1e6);
        let eta = SlotMatrix::filled(3, 1.0);
        let mut rng = create_rng(4);
        let ant = construct(1, &inst, &tau, &eta, 1.0, 0.5, &mut rng);
        assert_eq!(ant.layer_ids(0), vec![3, 1, 2]);
    }

    #[test]
    fn test_zero_weights_fall_back_to_uniform() {
        let inst = Arc::new(InstanceData::new(vec![4], &[]).unwrap());
        let tau = SlotMatrix::filled(4, 0.0);
        let eta = SlotMatrix::filled(4, 0.0);
        let mut rng = create_rng(2);
        let mut ant = construct(1, &inst, &tau, &eta, 1.0, 1.0, &mut rng);
        ant.calc_all_node_max_cross();
        ant.check().unwrap();
    }

    #[test]
    fn test_update_pheromone_reinforces_best() {
        let inst = parse_instance("4 2 2\n2 2\n1 4\n2 3\n").map(Arc::new).unwrap();
        let best = Solution::from_orders(1, Arc::clone(&inst), &[vec![2, 1], vec![3, 4]]).unwrap();
        let mut tau = SlotMatrix::filled(4, 1.1);
        let config = AcoConfig::default().with_ants(1).with_gamma(0.0);
        update_pheromone(&mut tau, &[], &best, &config);
        // M = 0 is clamped to 1: amount = (1/1) / 2
        assert!((tau.get(1, 0) - 1.6).abs() < 1e-12);
        assert!((tau.get(0, 0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_two_edge_cross_reaches_optimum() {
        let inst = parse_instance("4 2 2\n2 2\n1 4\n2 3\n").map(Arc::new).unwrap();
        let result = AcoRunner::run(inst, &quick_config()).unwrap();
        assert_eq!(result.best_objective, 0);
        assert_eq!(result.stop_reason, StopReason::Optimal);
        result.best.check().unwrap();
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let inst = layered(9, 5, 8, 70);
        let a = AcoRunner::run(Arc::clone(&inst), &quick_config()).unwrap();
        let b = AcoRunner::run(Arc::clone(&inst), &quick_config()).unwrap();
        let trace = |r: &AcoResult| -> Vec<(usize, usize)> {
            r.improvements.iter().map(|i| (i.iteration, i.objective)).collect()
        };
        assert_eq!(trace(&a), trace(&b));
        assert_eq!(a.best.layer_dump(), b.best.layer_dump());
        assert_eq!(a.colonies, b.colonies);
    }

    #[test]
    fn test_colony_cap_and_bookkeeping() {
        let inst = layered(3, 4, 7, 50);
        let result = AcoRunner::run(inst, &quick_config()).unwrap();
        if result.stop_reason == StopReason::IterationLimit {
            assert_eq!(result.colonies, 3);
            assert_eq!(result.evaluations, 1 + 3 * 8);
        }
        assert!(result
            .improvements
            .windows(2)
            .all(|w| w[1].objective < w[0].objective));
        assert_eq!(result.improvements.last().map(|i| i.objective), Some(result.best_objective));
    }

    #[test]
    fn test_beta_decays_only_after_stagnation() {
        let config = AcoConfig::default().with_stagnation_colonies(20);
        assert_eq!(decayed_beta(0.5, 19, false, &config), 0.5);
        assert!((decayed_beta(0.5, 20, false, &config) - 0.475).abs() < 1e-12);
        // an ant of this colony already improved the run-best
        assert_eq!(decayed_beta(0.5, 20, true, &config), 0.5);
        assert_eq!(decayed_beta(0.5, 0, true, &config.with_stagnation_colonies(0)), 0.5);
    }

    #[test]
    fn test_beta_decay_over_stagnant_run() {
        // every order of K(3,3) has M = 4, so no colony ever improves
        let inst = complete_layers(2, 3);
        let stagnant = AcoRunner::run(
            Arc::clone(&inst),
            &quick_config().with_stagnation_colonies(0),
        )
        .unwrap();
        assert_eq!(stagnant.stop_reason, StopReason::IterationLimit);
        assert_eq!(stagnant.improvements.len(), 1);
        assert!((stagnant.final_beta - 0.5 * 0.95f64.powi(3)).abs() < 1e-12);

        let patient = AcoRunner::run(inst, &quick_config()).unwrap();
        assert_eq!(patient.final_beta, 0.5);
    }

    #[test]
    fn test_cancel_before_first_colony() {
        let inst = layered(3, 4, 7, 50);
        let flag = Arc::new(AtomicBool::new(true));
        let result = AcoRunner::run_with_cancel(inst, &quick_config(), Some(flag)).unwrap();
        if result.best_objective > 0 {
            assert_eq!(result.stop_reason, StopReason::Cancelled);
            assert_eq!(result.colonies, 0);
        }
    }

    #[test]
    fn test_invalid_config_is_error() {
        let inst = layered(3, 3, 4, 10);
        assert!(AcoRunner::run(inst, &AcoConfig::default().with_ants(0)).is_err());
    }
}
