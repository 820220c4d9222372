//! Structural and reproducibility properties of the walk.

use ergosim_chain::{
    ConvergenceMonitor, GenerationReporter, GenerationSnapshot, NoopReporter, QueueConfig,
    ScriptedDraws, SimulationConfig, StateGraph, StateKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn queue(n: usize, k: usize) -> QueueConfig {
    QueueConfig::new(n)
        .with_threshold(k)
        .with_arrival_rate(1.5)
        .with_service_rate(1.0)
}

/// Collects the probability sum and range checks for every generation.
#[derive(Default)]
struct Checker {
    generations: u32,
    sums: Vec<f64>,
    out_of_range: usize,
}

impl GenerationReporter for Checker {
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) {
        self.generations = snapshot.generation;
        self.sums.push(snapshot.probabilities.iter().sum());
        self.out_of_range += snapshot
            .probabilities
            .iter()
            .filter(|p| !(0.0..=1.0).contains(*p))
            .count();
    }
}

#[test]
fn topology_is_a_pure_function_of_parameters() {
    for n in 1..5 {
        for k in 0..=n {
            let a = StateGraph::build(&queue(n, k)).unwrap();
            let b = StateGraph::build(&queue(n, k)).unwrap();
            assert_eq!(a.transitions(), b.transitions(), "N={n}, K={k}");
        }
    }
}

#[test]
fn buffering_states_never_serve() {
    let g = StateGraph::build(&queue(6, 4)).unwrap();
    for t in g.transitions() {
        match t.kind {
            StateKind::Buffering | StateKind::ServiceInit | StateKind::Empty => {
                assert_eq!(t.up_probability, 1.0);
                assert_eq!(t.next_on_service, None);
            }
            StateKind::Ordinary | StateKind::Full => {
                assert!(t.next_on_service.is_some());
            }
        }
    }
}

#[test]
fn probabilities_stay_in_unit_interval_and_sum_to_one() {
    let sim = SimulationConfig::new()
        .with_events_per_generation(2000)
        .with_max_generations(40)
        .with_tolerance(0.0);
    let monitor = ConvergenceMonitor::new(&queue(4, 3), sim).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let mut checker = Checker::default();

    let outcome = monitor.run(&mut rng, &mut checker);

    assert_eq!(checker.generations, 40);
    assert_eq!(checker.out_of_range, 0);
    for sum in &checker.sums {
        assert!((sum - 1.0).abs() <= 0.05, "sum = {sum}");
    }
    let total: f64 = outcome.probabilities.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn replayed_draws_reproduce_counters_exactly() {
    let mut rng = StdRng::seed_from_u64(314);
    let script: Vec<f64> = (0..997).map(|_| rng.random()).collect();
    let sim = SimulationConfig::new()
        .with_events_per_generation(300)
        .with_max_generations(25);

    let mut a = ConvergenceMonitor::new(&queue(5, 2), sim.clone()).unwrap();
    let mut b = ConvergenceMonitor::new(&queue(5, 2), sim).unwrap();
    let mut draws_a = ScriptedDraws::new(script.clone());
    let mut draws_b = ScriptedDraws::new(script);

    for _ in 0..25 {
        let pa: Vec<f64> = a.run_generation(&mut draws_a).probabilities.to_vec();
        let pb: Vec<f64> = b.run_generation(&mut draws_b).probabilities.to_vec();
        assert_eq!(pa, pb);
        assert_eq!(a.graph().states(), b.graph().states());
        assert_eq!(a.cursor(), b.cursor());
    }
    assert_eq!(draws_a.consumed(), draws_b.consumed());
    assert_eq!(a.total_arrivals(), b.total_arrivals());
}

#[test]
fn same_seed_same_outcome() {
    let sim = SimulationConfig::new()
        .with_events_per_generation(1000)
        .with_max_generations(30);

    let run = |seed| {
        let monitor = ConvergenceMonitor::new(&queue(3, 2), sim.clone()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        monitor.run(&mut rng, &mut NoopReporter)
    };

    assert_eq!(run(8), run(8));
}

#[test]
fn convergence_stops_early_with_loose_tolerance() {
    let sim = SimulationConfig::new()
        .with_events_per_generation(5000)
        .with_max_generations(1000)
        .with_tolerance(0.5);
    let monitor = ConvergenceMonitor::new(&queue(2, 0), sim).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let outcome = monitor.run(&mut rng, &mut NoopReporter);

    assert!(outcome.converged);
    assert!(outcome.generations < 1000);
    assert!(outcome.max_relative_change < 0.5);
}
