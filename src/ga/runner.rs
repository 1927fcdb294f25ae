//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! evaluation (with perturbation) → selection → crossover → mutation →
//! replacement → repeat.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use super::config::GaConfig;
use super::operators::{barycenter_mutation, directed_mutation, layer_split_crossover};
use super::selection::{replace_into, tournament_without_reuse};
use crate::error::Result;
use crate::instance::InstanceData;
use crate::random::create_rng;
use crate::solution::Solution;
use crate::termination::{Improvement, StopReason, Termination};

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The best individual found during the entire run.
    pub best: Solution,

    /// `M` of `best`.
    pub best_objective: usize,

    /// Total number of generations executed.
    pub generations: usize,

    /// Evaluation cost: full evaluations plus partial layer refreshes,
    /// each counted as the fraction of nodes it touched.
    pub evaluations: f64,

    /// Every new run-best, in discovery order.
    pub improvements: Vec<Improvement>,

    /// Generations without improvement after which the run counted as stuck.
    pub stagnation_limit: usize,

    pub stop_reason: StopReason,

    pub elapsed: Duration,
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```no_run
/// use std::sync::Arc;
/// use mmac_heur::ga::{GaConfig, GaRunner};
/// use mmac_heur::instance::read_instance;
///
/// let instance = Arc::new(read_instance("instance.txt")?);
/// let result = GaRunner::run(instance, &GaConfig::default().with_seed(42))?;
/// println!("M = {}", result.best_objective);
/// # Ok::<(), mmac_heur::MmacError>(())
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// Returns [`MmacError::InvalidConfig`](crate::MmacError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn run(instance: Arc<InstanceData>, config: &GaConfig) -> Result<GaResult> {
        Self::run_with_cancel(instance, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA will
    /// stop before the next generation and return the best solution found
    /// so far.
    pub fn run_with_cancel(
        instance: Arc<InstanceData>,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult> {
        config.validate()?;

        let mut rng = create_rng(config.effective_seed());
        let termination = Termination::start(
            config.time_limit(),
            config.target_objective,
            config.max_generations,
        )
        .with_cancel(cancel);
        let deadline = *termination.deadline();

        let stagnation_limit = config.stagnation_limit(instance.num_edges());
        debug!(stagnation_limit, "ga stagnation limit");
        let barycenter_layers = config.barycenter_layers(instance.num_layers());

        // 1. Initialize population
        let mut next_id = 1;
        let mut population: Vec<Solution> = Vec::with_capacity(config.population_size);
        for _ in 0..config.population_size {
            population.push(Solution::shuffled(next_id, Arc::clone(&instance), &mut rng));
            next_id += 1;
        }

        let mut best: Option<Solution> = None;
        let mut improvements = Vec::new();
        let mut evaluations = 0.0;
        let mut stagnant = 0usize;
        let mut stuck = false;
        let mut generations = 0;

        // 2. Evolutionary loop
        let stop_reason = loop {
            let best_objective = best.as_ref().map_or(usize::MAX, Solution::objective);
            if let Some(reason) = termination.check(generations, best_objective) {
                break reason;
            }

            if stagnant > stagnation_limit && !stuck {
                stuck = true;
                debug!(generation = generations, "stuck: widening directed mutation");
            } else if stagnant < stagnation_limit && stuck {
                stuck = false;
                debug!(generation = generations, "no longer stuck");
            }

            // Evaluate, perturb, rank
            let candidate = evaluate_population(
                &mut population,
                config.perturbation_strength,
                &mut evaluations,
                &mut rng,
            );
            if candidate.objective() < best_objective {
                info!(
                    generation = generations,
                    objective = candidate.objective(),
                    elapsed_secs = deadline.elapsed_secs(),
                    "ga new best"
                );
                improvements.push(Improvement {
                    iteration: generations,
                    objective: candidate.objective(),
                    elapsed_secs: deadline.elapsed_secs(),
                });
                best = Some(candidate);
                stagnant = 0;
            } else {
                stagnant += 1;
            }

            // Selection
            let winners = tournament_without_reuse(
                &population,
                config.tournament_size,
                config.selected_size,
                &mut rng,
            );
            let mut offspring: Vec<Solution> = winners
                .iter()
                .map(|&i| {
                    let mut winner = population[i].clone();
                    winner.set_modified(true);
                    winner
                })
                .collect();

            // Crossover
            let parents = offspring.len();
            let mut children = Vec::with_capacity(parents);
            for i in 0..parents / 2 {
                let pair = layer_split_crossover(
                    &offspring[i],
                    &offspring[parents - 1 - i],
                    (next_id, next_id + 1),
                )?;
                if let Some((a, b, cost)) = pair {
                    next_id += 2;
                    evaluations += cost;
                    children.push(a);
                    children.push(b);
                }
            }
            offspring.extend(children);

            // Mutation
            let mut skipped = 0;
            for ind in &mut offspring {
                match barycenter_mutation(ind, barycenter_layers, &mut rng)? {
                    Some(cost) => evaluations += cost,
                    None => skipped += 1,
                }
            }
            if skipped > 0 {
                debug!(generation = generations, skipped, "barycenter mutation found no move");
            }
            let ratio = if stuck {
                config.stuck_probe_ratio
            } else {
                config.probe_ratio
            };
            let radius = (instance.max_layer_size() as f64 * ratio).floor() as usize;
            for ind in &mut offspring {
                if let Some(cost) = directed_mutation(ind, radius, &mut rng)? {
                    evaluations += cost;
                }
            }

            // Replacement
            let dropped = replace_into(&mut population, offspring, &mut rng);
            if dropped > 0 {
                warn!(generation = generations, dropped, "no free slot for offspring");
            }

            generations += 1;
            if generations % 10 == 0 {
                debug!(generations, best = best_objective, stagnant, "generation progress");
            }
        };

        let best = match best {
            Some(best) => best,
            None => {
                let mut first = population.swap_remove(0);
                if first.needs_evaluation() {
                    first.calc_all_node_max_cross();
                    evaluations += 1.0;
                }
                first
            }
        };
        debug_assert_eq!(best.check().map_err(|e| e.to_string()), Ok(()));
        info!(
            objective = best.objective(),
            generations,
            ?stop_reason,
            elapsed_secs = deadline.elapsed_secs(),
            "ga finished"
        );

        Ok(GaResult {
            best_objective: best.objective(),
            best,
            generations,
            evaluations,
            improvements,
            stagnation_limit,
            stop_reason,
            elapsed: deadline.elapsed(),
        })
    }
}

/// Evaluates pending individuals, perturbs every individual, normalizes
/// totals and sorts best first. Only the evaluation of pending individuals
/// is added to `evaluations`. Returns a copy of the better of the
/// pre-perturbation best and the post-perturbation leader.
fn evaluate_population<R: Rng>(
    population: &mut [Solution],
    strength: f64,
    evaluations: &mut f64,
    rng: &mut R,
) -> Solution {
    for ind in population.iter_mut() {
        if ind.needs_evaluation() {
            ind.calc_all_node_max_cross();
            *evaluations += 1.0;
        }
    }
    let pre_best = population
        .iter()
        .min_by_key(|ind| ind.objective())
        .cloned();

    for ind in population.iter_mut() {
        ind.perturb(strength, 1, rng);
    }

    let max_total = population.iter().map(Solution::total_cross).max().unwrap_or(0);
    for ind in population.iter_mut() {
        ind.normalize_total_cross(max_total);
    }
    population.sort_by(|a, b| a.penalized_fitness().total_cmp(&b.penalized_fitness()));

    match pre_best {
        Some(pre) if pre.objective() < population[0].objective() => pre,
        _ => population[0].clone(),
    }
}
