//! Frozen Lake CLI - tabular reinforcement learning on a grid world
//!
//! This CLI provides:
//! - Q-learning from sampled episodes
//! - Value iteration over the known transition table
//! - Policy replay with optional live rendering
//! - JSON summaries and JSONL episode logs

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "frozen-lake")]
#[command(version, about = "Tabular Q-learning and value iteration on Frozen Lake", long_about = None)]
struct Cli {
    /// Log engine progress (debug level); RUST_LOG takes precedence
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn a policy with tabular Q-learning
    QLearning(Box<tabular_rl::cli::commands::q_learning::QLearningArgs>),

    /// Solve for the optimal policy with value iteration
    ValueIteration(Box<tabular_rl::cli::commands::value_iteration::ValueIterationArgs>),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::QLearning(args) => tabular_rl::cli::commands::q_learning::execute(*args),
        Commands::ValueIteration(args) => {
            tabular_rl::cli::commands::value_iteration::execute(*args)
        }
    }
}
