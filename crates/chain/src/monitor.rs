//! Generation accounting and the convergence stopping rule.
//!
//! The walk is one continuous trajectory. Generations only partition it for
//! bookkeeping: after every `E` events the per-generation arrival counts are
//! folded into running totals, every state's probability is re-estimated, and
//! the largest relative change across states is compared against the
//! tolerance.
//!
//! The stopping rule is a relative-stability heuristic. Falling below the
//! tolerance means the estimates stopped moving much between generations, not
//! that they are within any confidence bound of the true distribution.

use tracing::{debug, info, warn};

use crate::config::{QueueConfig, SimulationConfig};
use crate::error::ChainError;
use crate::graph::StateGraph;
use crate::walk::{Event, UniformSource, Walker};

/// Immutable view of the estimates at the end of one generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSnapshot<'a> {
    /// 1-based generation number.
    pub generation: u32,
    /// Largest relative change across states (fraction).
    pub max_relative_change: f64,
    /// Number of states that have not received an arrival yet.
    pub unvisited_states: usize,
    /// Estimated probabilities in state index order.
    pub probabilities: &'a [f64],
}

/// Receives a snapshot after every generation.
pub trait GenerationReporter {
    /// Called once per completed generation.
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>);
}

impl<F> GenerationReporter for F
where
    F: FnMut(&GenerationSnapshot<'_>),
{
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) {
        self(snapshot)
    }
}

/// Reporter that ignores every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl GenerationReporter for NoopReporter {
    fn on_generation(&mut self, _snapshot: &GenerationSnapshot<'_>) {}
}

/// Final state of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// Generations simulated.
    pub generations: u32,
    /// Walker steps taken.
    pub events: u64,
    /// Arrivals counted, including the seeded initial arrival.
    pub total_arrivals: u64,
    /// Largest relative change measured in the last generation (fraction).
    pub max_relative_change: f64,
    /// Whether the tolerance was met before the generation cap.
    pub converged: bool,
    /// Final probability estimates in state index order.
    pub probabilities: Vec<f64>,
}

impl SimulationOutcome {
    /// Simulated time implied by the arrival count, `total_arrivals / λ`, in seconds.
    ///
    /// Returns `None` when `arrival_rate` is zero.
    pub fn virtual_time(&self, arrival_rate: f64) -> Option<f64> {
        let t = self.total_arrivals as f64 / arrival_rate;
        t.is_finite().then_some(t)
    }
}

/// Drives the walker generation by generation and decides when to stop.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    graph: StateGraph,
    walker: Walker,
    config: SimulationConfig,
    generation: u32,
    events: u64,
    total_arrivals: u64,
    max_relative_change: f64,
    unvisited_states: usize,
    scratch: Vec<f64>,
}

impl ConvergenceMonitor {
    /// Validates both configurations, builds the graph and seeds the walk.
    ///
    /// The walk starts as if one packet has already arrived into the empty
    /// system: that arrival is credited to state 0 and the cursor sits on
    /// the state it leads to.
    ///
    /// # Errors
    ///
    /// Returns the first validation error from either configuration.
    pub fn new(queue: &QueueConfig, config: SimulationConfig) -> Result<Self, ChainError> {
        config.validate()?;
        let mut graph = StateGraph::build(queue)?;

        graph.state_mut(0).seed_arrival();
        let walker = Walker::new(graph.state(0).next_on_arrival());
        let n_states = graph.len();

        Ok(Self {
            graph,
            walker,
            config,
            generation: 0,
            events: 0,
            total_arrivals: 1,
            max_relative_change: f64::INFINITY,
            unvisited_states: n_states - 1,
            scratch: vec![0.0; n_states],
        })
    }

    /// Returns the state graph with its current counters.
    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    /// Index of the walker's current state.
    pub fn cursor(&self) -> usize {
        self.walker.cursor()
    }

    /// Generations completed so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Arrivals counted so far, including the seeded one.
    pub fn total_arrivals(&self) -> u64 {
        self.total_arrivals
    }

    /// Largest relative change from the last generation, infinite before the first.
    pub fn max_relative_change(&self) -> f64 {
        self.max_relative_change
    }

    /// Whether the last generation met the tolerance.
    pub fn is_converged(&self) -> bool {
        self.max_relative_change < self.config.tolerance()
    }

    /// Whether the run should stop: converged or out of generations.
    pub fn is_finished(&self) -> bool {
        self.is_converged() || self.generation >= self.config.max_generations()
    }

    /// Runs one generation of `E` events, then settles the counters.
    pub fn run_generation(&mut self, rng: &mut impl UniformSource) -> GenerationSnapshot<'_> {
        let mut arrivals = 0u64;
        for _ in 0..self.config.events_per_generation() {
            if self.walker.step(&mut self.graph, rng) == Event::Arrival {
                arrivals += 1;
            }
        }
        self.events += u64::from(self.config.events_per_generation());
        self.total_arrivals += arrivals;
        self.settle();
        self.generation += 1;

        debug!(
            generation = self.generation,
            arrivals,
            max_relative_change = self.max_relative_change,
            unvisited = self.unvisited_states,
            "generation settled"
        );

        self.graph.probabilities_into(&mut self.scratch);
        GenerationSnapshot {
            generation: self.generation,
            max_relative_change: self.max_relative_change,
            unvisited_states: self.unvisited_states,
            probabilities: &self.scratch,
        }
    }

    fn settle(&mut self) {
        let total = self.total_arrivals;
        let mut max_change = 0.0f64;
        let mut unvisited = 0;
        for state in self.graph.states_mut() {
            match state.settle(total) {
                Some(change) => max_change = max_change.max(change),
                None => unvisited += 1,
            }
        }
        if unvisited > 0 {
            max_change = max_change.max(self.config.tolerance() + 1.0);
        }
        self.max_relative_change = max_change;
        self.unvisited_states = unvisited;
    }

    /// Runs generations until the tolerance is met or the cap is reached.
    ///
    /// Reaching the cap is a normal termination; the outcome then carries
    /// `converged = false` and the last measured relative change.
    #[tracing::instrument(skip_all, fields(states = self.graph.len()))]
    pub fn run(
        mut self,
        rng: &mut impl UniformSource,
        reporter: &mut impl GenerationReporter,
    ) -> SimulationOutcome {
        loop {
            let snapshot = self.run_generation(rng);
            reporter.on_generation(&snapshot);
            if self.is_finished() {
                break;
            }
        }

        let converged = self.is_converged();
        if converged {
            info!(
                generations = self.generation,
                max_relative_change = self.max_relative_change,
                "converged"
            );
        } else {
            warn!(
                generations = self.generation,
                max_relative_change = self.max_relative_change,
                tolerance = self.config.tolerance(),
                "generation cap reached before convergence"
            );
        }

        SimulationOutcome {
            generations: self.generation,
            events: self.events,
            total_arrivals: self.total_arrivals,
            max_relative_change: self.max_relative_change,
            converged,
            probabilities: self.graph.probabilities(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::ScriptedDraws;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn queue(n: usize, k: usize, lambda: f64, mu: f64) -> QueueConfig {
        QueueConfig::new(n)
            .with_threshold(k)
            .with_arrival_rate(lambda)
            .with_service_rate(mu)
    }

    #[derive(Default)]
    struct Recorder {
        generations: Vec<u32>,
        widths: Vec<usize>,
    }

    impl GenerationReporter for Recorder {
        fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) {
            self.generations.push(snapshot.generation);
            self.widths.push(snapshot.probabilities.len());
        }
    }

    #[test]
    fn initial_seeding() {
        let m = ConvergenceMonitor::new(&queue(3, 0, 1.0, 1.0), SimulationConfig::new()).unwrap();
        assert_eq!(m.total_arrivals(), 1);
        assert_eq!(m.graph().state(0).total_visits(), 1);
        assert_eq!(m.cursor(), 1);
        assert_eq!(m.generation(), 0);
        assert!(!m.is_converged());
    }

    #[test]
    fn initial_cursor_enters_buffering_chain() {
        let m = ConvergenceMonitor::new(&queue(4, 3, 1.0, 1.0), SimulationConfig::new()).unwrap();
        assert_eq!(m.cursor(), 5);
    }

    #[test]
    fn rejects_invalid_simulation_config() {
        let sim = SimulationConfig::new().with_events_per_generation(0);
        assert!(matches!(
            ConvergenceMonitor::new(&queue(2, 0, 1.0, 1.0), sim),
            Err(ChainError::InvalidEventsPerGeneration { events: 0 })
        ));
    }

    #[test]
    fn rejects_invalid_queue_config() {
        assert!(matches!(
            ConvergenceMonitor::new(&queue(2, 0, 0.0, 0.0), SimulationConfig::new()),
            Err(ChainError::UndefinedUpProbability)
        ));
    }

    #[test]
    fn scripted_first_generation() {
        // N = 2, K = 0, λ = μ: up-probability 0.5.
        // Cursor starts at 1. Draws: 0.1 (arrive 1->2), 0.1 (arrive 2->2),
        // 0.9 (serve 2->1), 0.9 (serve 1->0), then state 0 arrives without a draw.
        let sim = SimulationConfig::new()
            .with_events_per_generation(5)
            .with_max_generations(1);
        let mut m = ConvergenceMonitor::new(&queue(2, 0, 1.0, 1.0), sim).unwrap();
        let mut draws = ScriptedDraws::new(vec![0.1, 0.1, 0.9, 0.9]);

        let snap = m.run_generation(&mut draws);
        assert_eq!(snap.generation, 1);
        assert_eq!(snap.unvisited_states, 0);
        // Arrivals: state 1 once, state 2 once, state 0 once; plus the seed on 0.
        let expected = [2.0 / 4.0, 1.0 / 4.0, 1.0 / 4.0];
        for (p, e) in snap.probabilities.iter().zip(expected) {
            assert!((p - e).abs() < 1e-12);
        }
        // Relative change from the 1.0 baseline: max is |0.25 - 1| / 1.
        assert!((snap.max_relative_change - 0.75).abs() < 1e-12);

        assert_eq!(m.total_arrivals(), 4);
        assert_eq!(m.cursor(), 1);
        assert_eq!(draws.consumed(), 4);
        assert!(m.graph().states().iter().all(|s| s.generation_visits() == 0));
    }

    #[test]
    fn unvisited_state_blocks_convergence() {
        // λ = 0: only state 0 ever receives arrivals.
        let sim = SimulationConfig::new()
            .with_events_per_generation(10)
            .with_max_generations(3)
            .with_tolerance(0.5);
        let mut m = ConvergenceMonitor::new(&queue(2, 0, 0.0, 1.0), sim).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let snap = m.run_generation(&mut rng);
        assert_eq!(snap.unvisited_states, 2);
        assert!(snap.max_relative_change >= 1.5);
        assert!(!m.is_converged());
    }

    #[test]
    fn stops_at_generation_cap() {
        let sim = SimulationConfig::new()
            .with_events_per_generation(10)
            .with_max_generations(4)
            .with_tolerance(0.0);
        let m = ConvergenceMonitor::new(&queue(3, 0, 1.0, 1.0), sim).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut recorder = Recorder::default();
        let outcome = m.run(&mut rng, &mut recorder);
        assert_eq!(recorder.generations, vec![1, 2, 3, 4]);
        assert!(recorder.widths.iter().all(|&w| w == 4));
        assert_eq!(outcome.generations, 4);
        assert_eq!(outcome.events, 40);
        assert!(!outcome.converged);
    }

    #[test]
    fn total_visits_monotone_and_generation_reset() {
        let sim = SimulationConfig::new()
            .with_events_per_generation(200)
            .with_max_generations(20);
        let mut m = ConvergenceMonitor::new(&queue(4, 2, 1.0, 1.5), sim).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut prev: Vec<u64> = m.graph().states().iter().map(|s| s.total_visits()).collect();
        for _ in 0..10 {
            m.run_generation(&mut rng);
            let now: Vec<u64> = m.graph().states().iter().map(|s| s.total_visits()).collect();
            for (a, b) in prev.iter().zip(&now) {
                assert!(b >= a);
            }
            assert!(m.graph().states().iter().all(|s| s.generation_visits() == 0));
            prev = now;
        }
        let visits: u64 = prev.iter().sum();
        assert_eq!(visits, m.total_arrivals());
    }

    #[test]
    fn virtual_time() {
        let outcome = SimulationOutcome {
            generations: 1,
            events: 10,
            total_arrivals: 50,
            max_relative_change: 0.0,
            converged: true,
            probabilities: vec![1.0],
        };
        assert_eq!(outcome.virtual_time(2.0), Some(25.0));
        assert_eq!(outcome.virtual_time(0.0), None);
    }

    #[test]
    fn noop_reporter_runs() {
        let sim = SimulationConfig::new()
            .with_events_per_generation(100)
            .with_max_generations(2);
        let m = ConvergenceMonitor::new(&queue(2, 0, 1.0, 1.0), sim).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = m.run(&mut rng, &mut NoopReporter);
        assert!(outcome.generations <= 2);
        assert_eq!(outcome.probabilities.len(), 3);
    }
}
