//! Simulate command: run the walk to convergence and report the results.

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span};

use ergosim_chain::{ConvergenceMonitor, NoopReporter, QueueMetrics};

use crate::cli::SimulateArgs;
use crate::convert;
use crate::report::{self, JsonReport, TraceTable};

/// Run a single simulation and print the report to stdout.
pub fn run(args: SimulateArgs) -> Result<()> {
    let _cmd = info_span!("simulate").entered();

    // 1. Resolve parameters: TOML file first, then CLI overrides
    let config = convert::load_config(args.queue.config.as_deref())?;
    let queue = convert::build_queue_config(&config.queue, &args.queue)?;
    let sim = convert::build_simulation_config(&config.simulation, &args)?;
    let trace = args.trace || config.simulation.trace;
    let seed = args.seed.or(config.seed);

    // 2. Create seeded RNG
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    // 3. Build the chain before printing anything
    let monitor = ConvergenceMonitor::new(&queue, sim.clone()).context("failed to build chain")?;
    info!(
        states = monitor.graph().len(),
        capacity = queue.capacity(),
        threshold = queue.threshold(),
        ?seed,
        "chain built"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    report::write_header(&mut out, &queue, &sim, trace)?;
    report::write_table_header(&mut out, &queue)?;

    // 4. Walk until converged or out of generations
    let outcome = if trace {
        let mut table = TraceTable::new(&mut out);
        let outcome = monitor.run(&mut rng, &mut table);
        table.finish().context("failed to write trace table")?;
        outcome
    } else {
        monitor.run(&mut rng, &mut NoopReporter)
    };
    info!(
        generations = outcome.generations,
        events = outcome.events,
        converged = outcome.converged,
        "simulation finished"
    );

    // 5. Aggregate and report
    let metrics = QueueMetrics::from_outcome(&outcome, &queue);
    report::write_summary(&mut out, &queue, &outcome, &metrics)?;
    out.flush()?;

    if let Some(path) = args.json {
        let json = JsonReport::new(&queue, &sim, seed, &outcome, &metrics).to_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write JSON report: {}", path.display()))?;
        info!(path = %path.display(), "JSON report written");
    }

    Ok(())
}
