// src/main.rs
//
// CLI entrypoint: train a tabular agent on one of the reference grid
// environments.
//
// - Deterministic runs via --seed (drives both policy and environment
//   RNG streams).
// - Algorithm and learning rates selectable from the command line.
// - Optional Q-table snapshot load/save (JSON) for resumed runs.
// - Telemetry: set TABQ_TELEMETRY_MODE=jsonl (and TABQ_TELEMETRY_PATH)
//   to stream per-step records.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use tabq::config::{EpisodeLimits, LearningConfig};
use tabq::grid_world::GridWorld;
use tabq::policy::EpsilonGreedy;
use tabq::runner::{Algorithm, Trainer, TrainerConfig};
use tabq::snapshot::QTableSnapshot;
use tabq::telemetry::Telemetry;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AlgorithmArg {
    Sarsa,
    QLearning,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EnvArg {
    /// 4x4 grid with three pits.
    Grid,
    /// 12x4 cliff walk.
    Cliff,
}

#[derive(Debug, Parser)]
#[command(
    name = "tabq",
    about = "Tabular SARSA / Q-learning trainer on reference grid environments",
    version
)]
struct Args {
    /// TD algorithm.
    #[arg(long, value_enum, default_value_t = AlgorithmArg::QLearning)]
    algorithm: AlgorithmArg,

    /// Environment preset.
    #[arg(long, value_enum, default_value_t = EnvArg::Grid)]
    env: EnvArg,

    /// Number of training episodes.
    #[arg(long, default_value_t = 150)]
    episodes: u64,

    /// Per-episode step budget (0 = unlimited).
    #[arg(long, default_value_t = 10_000)]
    max_steps: u64,

    /// Deterministic seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Learning rate.
    #[arg(long, default_value_t = 0.6)]
    alpha: f64,

    /// Discount factor.
    #[arg(long, default_value_t = 0.6)]
    discount: f64,

    /// Initial exploration rate.
    #[arg(long, default_value_t = 0.3)]
    epsilon: f64,

    /// Resume from a Q-table snapshot (JSON).
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final Q-table snapshot here (JSON).
    #[arg(long)]
    save: Option<PathBuf>,

    /// Suppress per-episode output.
    #[arg(long)]
    quiet: bool,
}

fn run(args: &Args) -> tabq::Result<()> {
    let env = match args.env {
        EnvArg::Grid => GridWorld::four_by_four(args.seed),
        EnvArg::Cliff => GridWorld::cliff_walk(args.seed),
    };
    let policy = EpsilonGreedy::new(args.seed);
    let algorithm = match args.algorithm {
        AlgorithmArg::Sarsa => Algorithm::Sarsa,
        AlgorithmArg::QLearning => Algorithm::QLearning,
    };

    let learning = LearningConfig {
        alpha: args.alpha,
        discount: args.discount,
        epsilon_initial: args.epsilon,
        ..Default::default()
    };
    let limits = EpisodeLimits {
        max_episodes: args.episodes,
        max_steps_per_episode: args.max_steps,
        loss_settle_steps: 1,
    };
    let config = TrainerConfig {
        algorithm,
        learning,
        limits,
    };

    println!(
        "tabq | env={:?} | algorithm={:?} | episodes={} | alpha={} | discount={} | epsilon={} | seed={}",
        args.env, algorithm, args.episodes, args.alpha, args.discount, args.epsilon, args.seed
    );

    let mut trainer = match &args.load {
        Some(path) => {
            let snapshot = QTableSnapshot::load(path)?;
            Trainer::resume(env, policy, config, &snapshot)?
        }
        None => Trainer::new(env, policy, config)?,
    };
    trainer = trainer.with_telemetry(Telemetry::from_env());

    let summaries = trainer.run()?;
    if !args.quiet {
        for s in &summaries {
            println!(
                "episode={} steps={} outcome={} reward={:.2} wins={} losses={} epsilon={:.3}",
                s.episode,
                s.time_steps,
                match s.outcome {
                    Some(o) => format!("{o:?}"),
                    None => "Truncated".to_string(),
                },
                s.episode_reward,
                s.cumulative_wins,
                s.cumulative_losses,
                s.epsilon
            );
        }
    }

    if let Some(last) = summaries.last() {
        println!(
            "done | episodes={} | wins={} | losses={} | final_epsilon={:.3}",
            summaries.len(),
            last.cumulative_wins,
            last.cumulative_losses,
            trainer.epsilon()
        );
    }

    if let Some(path) = &args.save {
        trainer.snapshot().save(path)?;
        println!("snapshot written to {}", path.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("tabq: {err}");
        process::exit(1);
    }
}
