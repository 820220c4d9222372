//! Conversion from TOML config structs and CLI overrides to library config types.

use std::path::Path;

use anyhow::{Context, Result};

use ergosim_chain::{QueueConfig, SimulationConfig};

use crate::cli::{QueueArgs, SimulateArgs};
use crate::config::{ErgosimConfig, QueueToml, SimulationToml};

/// Loads the TOML configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ErgosimConfig> {
    let Some(path) = path else {
        return Ok(ErgosimConfig::default());
    };
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

/// Builds a validated [`QueueConfig`], with CLI flags taking precedence.
pub fn build_queue_config(queue: &QueueToml, args: &QueueArgs) -> Result<QueueConfig> {
    let cfg = QueueConfig::new(args.capacity.unwrap_or(queue.capacity))
        .with_threshold(args.threshold.unwrap_or(queue.threshold))
        .with_arrival_rate(args.arrival_rate.unwrap_or(queue.arrival_rate))
        .with_service_rate(args.service_rate.unwrap_or(queue.service_rate));
    cfg.validate().context("invalid queue parameters")?;
    Ok(cfg)
}

/// Builds a validated [`SimulationConfig`], with CLI flags taking precedence.
///
/// The tolerance is given in percent on both surfaces.
pub fn build_simulation_config(
    sim: &SimulationToml,
    args: &SimulateArgs,
) -> Result<SimulationConfig> {
    let tolerance_pct = args.tolerance.unwrap_or(sim.tolerance);
    let cfg = SimulationConfig::new()
        .with_events_per_generation(args.events.unwrap_or(sim.events_per_generation))
        .with_max_generations(args.max_generations.unwrap_or(sim.max_generations))
        .with_tolerance(tolerance_pct / 100.0);
    cfg.validate().context("invalid simulation parameters")?;
    Ok(cfg)
}
