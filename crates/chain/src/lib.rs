//! Ergodic occupancy of a threshold-startup service queue, estimated by a
//! single random walk.
//!
//! The queue holds at most `N` packets. When it overflows, service stops and
//! packets accumulate in a buffering chain; after `K` further arrivals
//! service restarts at occupancy `K`. Instead of solving the balance
//! equations, a single cursor walks the chain event by event and the
//! fraction of arrivals seen in each state estimates its steady-state
//! probability.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌──────────────┐     ┌──────────────────┐     ┌─────────────┐
//!  │    graph     │────▶│     walk     │────▶│     monitor      │────▶│   metrics   │
//!  │ (build arena)│     │ (one event)  │◀────│ (generations,    │     │ (P_bl, E_N, │
//!  └──────────────┘     └──────────────┘     │  convergence)    │     │  γ, T_d)    │
//!                                            └──────────────────┘     └─────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use ergosim_chain::{ConvergenceMonitor, NoopReporter, QueueConfig, QueueMetrics, SimulationConfig};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let queue = QueueConfig::new(1)
//!     .with_threshold(1)
//!     .with_arrival_rate(1.0)
//!     .with_service_rate(1.0);
//! let sim = SimulationConfig::new()
//!     .with_events_per_generation(1000)
//!     .with_max_generations(100)
//!     .with_tolerance(0.01);
//!
//! let monitor = ConvergenceMonitor::new(&queue, sim).unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//! let outcome = monitor.run(&mut rng, &mut NoopReporter);
//! let metrics = QueueMetrics::from_outcome(&outcome, &queue);
//!
//! assert_eq!(outcome.probabilities.len(), 2);
//! assert!(metrics.throughput > 0.0);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod monitor;
pub mod state;
pub mod walk;

pub use config::{MAX_TOTAL_EVENTS, QueueConfig, SimulationConfig};
pub use error::ChainError;
pub use graph::{StateGraph, Transition};
pub use metrics::QueueMetrics;
pub use monitor::{
    ConvergenceMonitor, GenerationReporter, GenerationSnapshot, NoopReporter, SimulationOutcome,
};
pub use state::{Exits, State, StateKind};
pub use walk::{Event, ScriptedDraws, UniformSource, Walker};
