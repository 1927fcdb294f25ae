//! `mmac` command-line entry point.
//!
//! Reads an instance, runs the GA and/or ACO for a number of seeded trials
//! and prints per-trial objectives, the best layer orders and the trial
//! statistics.

use std::process;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mmac_heur::aco::{AcoConfig, AcoRunner};
use mmac_heur::ga::{GaConfig, GaRunner};
use mmac_heur::instance::{read_instance, InstanceData};
use mmac_heur::stats::TrialSummary;
use mmac_heur::termination::StopReason;
use mmac_heur::Result;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Ga,
    Aco,
    Both,
}

/// Min-Max Arc-Crossing heuristics for layered graphs.
#[derive(Parser, Debug)]
#[command(name = "mmac", about = "Min-Max Arc-Crossing heuristics (GA, ACO)")]
struct Cli {
    /// Instance file
    instance: String,

    /// Which driver to run
    #[arg(short = 'a', long = "algorithm", value_enum, default_value = "both")]
    algorithm: Algorithm,

    /// Seed of the first trial; trial t uses seed + t
    #[arg(short = 's', long = "seed", default_value = "42")]
    seed: u64,

    /// Number of independent trials per driver
    #[arg(short = 'n', long = "trials", default_value = "1")]
    trials: usize,

    /// Wall-clock budget per trial, in seconds
    #[arg(short = 't', long = "time-limit", default_value = "78")]
    time_limit: f64,

    /// Best known objective, for reporting
    #[arg(long = "bks")]
    bks: Option<usize>,

    /// Stop a trial as soon as it reaches the best known objective
    #[arg(long = "stop-at-bks", requires = "bks")]
    stop_at_bks: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    if cli.time_limit.is_nan() || cli.time_limit <= 0.0 {
        eprintln!("error: --time-limit must be positive");
        process::exit(1);
    }

    let instance = match read_instance(&cli.instance) {
        Ok(inst) => Arc::new(inst),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    println!(
        "instance {}: {} nodes, {} edges, {} layers",
        cli.instance,
        instance.num_nodes(),
        instance.num_edges(),
        instance.num_layers()
    );

    if let Err(e) = run(&cli, &instance) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli, instance: &Arc<InstanceData>) -> Result<()> {
    let time_limit_ms = (cli.time_limit * 1000.0).round().max(1.0) as u64;
    let target = cli.bks.filter(|_| cli.stop_at_bks);

    if matches!(cli.algorithm, Algorithm::Ga | Algorithm::Both) {
        let mut summary = TrialSummary::new();
        for trial in 0..cli.trials {
            let seed = cli.seed.wrapping_add(trial as u64);
            let mut config = GaConfig::default()
                .with_seed(seed)
                .with_time_limit_ms(time_limit_ms);
            if let Some(bks) = target {
                config = config.with_target_objective(bks);
            }
            let result = GaRunner::run(Arc::clone(instance), &config)?;
            println!(
                "GA  trial {:>3} seed {:>6}: M = {:>5} {:>8.1} s {:>7} gens {:>10.1} evals ({})",
                trial + 1,
                seed,
                result.best_objective,
                result.elapsed.as_secs_f64(),
                result.generations,
                result.evaluations,
                stop_label(result.stop_reason)
            );
            summary.record(result.best);
        }
        report("GA", &summary, cli.bks);
    }

    if matches!(cli.algorithm, Algorithm::Aco | Algorithm::Both) {
        let mut summary = TrialSummary::new();
        for trial in 0..cli.trials {
            let seed = cli.seed.wrapping_add(trial as u64);
            let mut config = AcoConfig::default()
                .with_seed(seed)
                .with_time_limit_ms(time_limit_ms);
            if let Some(bks) = target {
                config = config.with_target_objective(bks);
            }
            let result = AcoRunner::run(Arc::clone(instance), &config)?;
            println!(
                "ACO trial {:>3} seed {:>6}: M = {:>5} {:>8.1} s {:>7} cols {:>10} evals ({})",
                trial + 1,
                seed,
                result.best_objective,
                result.elapsed.as_secs_f64(),
                result.colonies,
                result.evaluations,
                stop_label(result.stop_reason)
            );
            summary.record(result.best);
        }
        report("ACO", &summary, cli.bks);
    }
    Ok(())
}

fn report(label: &str, summary: &TrialSummary, bks: Option<usize>) {
    let Some(stats) = summary.stats() else {
        return;
    };
    if let Some(best) = summary.best() {
        println!("{label} best solution:");
        print!("{best}");
    }
    print!(
        "{label} over {} trials: mean {:.2}  stdev {:.2}  min {}  max {}",
        stats.trials, stats.mean, stats.stdev, stats.min, stats.max
    );
    match bks {
        Some(bks) => println!("  distance to BKS {}", stats.distance_to(bks)),
        None => println!(),
    }
}

fn stop_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::TimeLimit => "time limit",
        StopReason::Optimal => "optimal",
        StopReason::TargetReached => "target reached",
        StopReason::IterationLimit => "iteration limit",
        StopReason::Cancelled => "cancelled",
    }
}
