//! Text and JSON rendering of simulation results.

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use ergosim_chain::{
    GenerationReporter, GenerationSnapshot, QueueConfig, QueueMetrics, SimulationConfig,
    SimulationOutcome,
};

/// Writes the model and simulation parameter blocks.
pub fn write_header(
    out: &mut impl Write,
    queue: &QueueConfig,
    sim: &SimulationConfig,
    trace: bool,
) -> io::Result<()> {
    writeln!(out, "Model:")?;
    writeln!(out, "------")?;
    writeln!(out, "\tMarkovian queue with service initiation threshold")?;
    writeln!(out)?;
    writeln!(out, "Model parameters:")?;
    writeln!(out, "-----------------")?;
    writeln!(
        out,
        "\tArrivals   : lambda = {:.3} packets/sec",
        queue.arrival_rate()
    )?;
    writeln!(
        out,
        "\tService    : mu = {:.3} packets/sec",
        queue.service_rate()
    )?;
    writeln!(out, "\tQueue limit: N = {} packets", queue.capacity())?;
    writeln!(out, "\tThreshold  : K = {} packets", queue.threshold())?;
    writeln!(out)?;
    writeln!(out, "Simulation parameters:")?;
    writeln!(out, "----------------------")?;
    writeln!(
        out,
        "\tEvents per generation: {}",
        sim.events_per_generation()
    )?;
    writeln!(out, "\tMax generations      : {}", sim.max_generations())?;
    writeln!(
        out,
        "\tTolerance            : {:.3}%",
        100.0 * sim.tolerance()
    )?;
    writeln!(
        out,
        "\tTrace mode           : {}",
        if trace { "ON" } else { "OFF" }
    )?;
    writeln!(out)
}

/// Writes the column headings of the probability table.
///
/// Ordinary columns are `P_o(0)..P_o(N)`; buffering columns are
/// `P_b(1)..P_b(K-1)`.
pub fn write_table_header(out: &mut impl Write, queue: &QueueConfig) -> io::Result<()> {
    let n = queue.capacity();
    writeln!(out, "Results:")?;
    writeln!(out, "--------")?;
    writeln!(out, "Gen\tEps [%]\tErgodic probabilities [%]")?;
    write!(out, "\t\tOrdinary states")?;
    if queue.has_buffering() {
        write!(out, "{}Buffering states", "\t".repeat(n))?;
    }
    writeln!(out)?;
    write!(out, "\t")?;
    for i in 0..=n {
        write!(out, "\tP_o({i})")?;
    }
    for i in 1..queue.state_count() - n {
        write!(out, "\tP_b({i})")?;
    }
    writeln!(out)
}

fn write_row(
    out: &mut impl Write,
    label: &str,
    max_relative_change: f64,
    probabilities: &[f64],
) -> io::Result<()> {
    write!(out, "{label}\t{:.3}", 100.0 * max_relative_change)?;
    for p in probabilities {
        write!(out, "\t{:.3}", 100.0 * p)?;
    }
    writeln!(out)
}

/// Per-generation table rows, written as the simulation runs.
///
/// The first write error is kept and returned by [`TraceTable::finish`];
/// later generations are skipped.
pub struct TraceTable<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TraceTable<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Returns the writer, or the first error seen while tracing.
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }
}

impl<W: Write> GenerationReporter for TraceTable<W> {
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) {
        if self.error.is_some() {
            return;
        }
        let label = snapshot.generation.to_string();
        if let Err(e) = write_row(
            &mut self.out,
            &label,
            snapshot.max_relative_change,
            snapshot.probabilities,
        ) {
            self.error = Some(e);
        }
    }
}

fn fmt_optional(value: Option<f64>, scale: f64) -> String {
    match value {
        Some(v) => format!("{:.3}", v / scale),
        None => "undefined".to_string(),
    }
}

/// Writes the final probability row, run statistics and queue measures.
pub fn write_summary(
    out: &mut impl Write,
    queue: &QueueConfig,
    outcome: &SimulationOutcome,
    metrics: &QueueMetrics,
) -> io::Result<()> {
    writeln!(out)?;
    write_row(
        out,
        "Final",
        outcome.max_relative_change,
        &outcome.probabilities,
    )?;
    writeln!(out)?;

    let tconv = outcome.virtual_time(queue.arrival_rate());
    writeln!(out, "Simulation statistics:")?;
    writeln!(out, "----------------------")?;
    writeln!(out, "\tGenerations simulated   : {}", outcome.generations)?;
    writeln!(out, "\tEvents simulated        : {}", outcome.events)?;
    writeln!(
        out,
        "\tTotal arrivals          : {} packets",
        outcome.total_arrivals
    )?;
    writeln!(
        out,
        "\tVirtual convergence time: {} sec",
        fmt_optional(tconv, 1.0)
    )?;
    writeln!(
        out,
        "\t                          {} min",
        fmt_optional(tconv, 60.0)
    )?;
    writeln!(
        out,
        "\t                          {} h",
        fmt_optional(tconv, 3600.0)
    )?;
    writeln!(
        out,
        "\tResult tolerance        : {:.3} %{}",
        100.0 * outcome.max_relative_change,
        if outcome.converged {
            ""
        } else {
            " (not converged)"
        }
    )?;
    writeln!(out)?;

    writeln!(out, "Model statistics:")?;
    writeln!(out, "-----------------")?;
    writeln!(
        out,
        "\tOverflow probability: P_bl = {:.3} %",
        100.0 * metrics.overflow_probability
    )?;
    writeln!(
        out,
        "\tMean queue size     : E_N = {:.3} packets",
        metrics.mean_occupancy
    )?;
    writeln!(
        out,
        "\tThroughput          : gamma = {:.3} packets/sec",
        metrics.throughput
    )?;
    writeln!(
        out,
        "\tMean packet sojourn : T_d = {} sec",
        fmt_optional(metrics.mean_sojourn_time, 1.0)
    )
}

/// Machine-readable copy of a finished run.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub queue: QueueSummary,
    pub simulation: SimulationSummary,
    pub probabilities: Vec<f64>,
    pub metrics: MetricsSummary,
}

#[derive(Debug, Serialize)]
pub struct QueueSummary {
    pub capacity: usize,
    pub threshold: usize,
    pub arrival_rate: f64,
    pub service_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct SimulationSummary {
    pub seed: Option<u64>,
    pub events_per_generation: u32,
    pub max_generations: u32,
    pub tolerance: f64,
    pub generations: u32,
    pub events: u64,
    pub total_arrivals: u64,
    pub max_relative_change: f64,
    pub converged: bool,
    /// `None` serialises as `null` when the arrival rate is zero.
    pub virtual_time_sec: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MetricsSummary {
    pub overflow_probability: f64,
    pub mean_occupancy: f64,
    pub throughput: f64,
    pub mean_sojourn_time: Option<f64>,
}

impl JsonReport {
    pub fn new(
        queue: &QueueConfig,
        sim: &SimulationConfig,
        seed: Option<u64>,
        outcome: &SimulationOutcome,
        metrics: &QueueMetrics,
    ) -> Self {
        Self {
            queue: QueueSummary {
                capacity: queue.capacity(),
                threshold: queue.threshold(),
                arrival_rate: queue.arrival_rate(),
                service_rate: queue.service_rate(),
            },
            simulation: SimulationSummary {
                seed,
                events_per_generation: sim.events_per_generation(),
                max_generations: sim.max_generations(),
                tolerance: sim.tolerance(),
                generations: outcome.generations,
                events: outcome.events,
                total_arrivals: outcome.total_arrivals,
                max_relative_change: outcome.max_relative_change,
                converged: outcome.converged,
                virtual_time_sec: outcome.virtual_time(queue.arrival_rate()),
            },
            probabilities: outcome.probabilities.clone(),
            metrics: MetricsSummary {
                overflow_probability: metrics.overflow_probability,
                mean_occupancy: metrics.mean_occupancy,
                throughput: metrics.throughput,
                mean_sojourn_time: metrics.mean_sojourn_time,
            },
        }
    }

    /// Serialises the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialise JSON report")
    }
}
