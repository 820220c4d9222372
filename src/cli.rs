use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ergosim threshold-queue ergodic probability simulator.
#[derive(Parser)]
#[command(
    name = "ergosim",
    version,
    about = "Random-walk estimation of steady-state occupancy for a threshold-startup queue"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Simulate the queue until the probabilities converge.
    Simulate(SimulateArgs),
    /// Print the state transition table.
    Graph(GraphArgs),
}

/// Queue model parameters shared by every subcommand.
///
/// Flags override the values loaded from the configuration file.
#[derive(clap::Args, Debug, Default)]
pub struct QueueArgs {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// System capacity N [packets].
    #[arg(short = 'n', long)]
    pub capacity: Option<usize>,

    /// Mean arrival rate lambda [packets/sec].
    #[arg(short = 'l', long = "arrival-rate", visible_alias = "lambda")]
    pub arrival_rate: Option<f64>,

    /// Mean queue service rate mu [packets/sec].
    #[arg(short = 'm', long = "service-rate", visible_alias = "mu")]
    pub service_rate: Option<f64>,

    /// Service initiation threshold K [packets].
    #[arg(short = 'k', long)]
    pub threshold: Option<usize>,
}

/// Arguments for the `simulate` subcommand.
#[derive(clap::Args, Debug, Default)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub queue: QueueArgs,

    /// Events per simulation generation.
    #[arg(short, long = "events-per-generation")]
    pub events: Option<u32>,

    /// Maximum generations simulated.
    #[arg(short = 'g', long = "max-generations")]
    pub max_generations: Option<u32>,

    /// Tolerance [%].
    #[arg(short, long)]
    pub tolerance: Option<f64>,

    /// Print the probability table after every generation.
    #[arg(long)]
    pub trace: bool,

    /// Override RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Path for a JSON copy of the results.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

/// Arguments for the `graph` subcommand.
#[derive(clap::Args, Debug, Default)]
pub struct GraphArgs {
    #[command(flatten)]
    pub queue: QueueArgs,
}
