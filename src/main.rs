mod cli;
mod config;
mod convert;
mod graph_cmd;
mod logging;
mod report;
mod simulate_cmd;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ergosim_chain::ChainError;

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Simulate(args) => simulate_cmd::run(args),
        Command::Graph(args) => graph_cmd::run(args),
    }
}

/// Exit status 2 for rejected queue or simulation parameters, 1 otherwise.
fn exit_status(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ChainError>().is_some() {
        2
    } else {
        1
    }
}
