//! Error types for the ergosim-chain crate.

/// Error type for all fallible operations in the ergosim-chain crate.
///
/// Every variant is a configuration problem detected before the first event
/// is simulated. Running out of generations without converging is not an
/// error; see [`SimulationOutcome::converged`](crate::SimulationOutcome::converged).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainError {
    /// Returned when the queue capacity is zero.
    #[error("invalid capacity: {capacity} (must be >= 1)")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// Returned when the service-initiation threshold is larger than the capacity.
    #[error("threshold {threshold} exceeds capacity {capacity}")]
    ThresholdExceedsCapacity {
        /// The rejected threshold.
        threshold: usize,
        /// The configured capacity.
        capacity: usize,
    },

    /// Returned when an arrival or service rate is negative or non-finite.
    #[error("invalid {name}: {value} (must be finite and >= 0)")]
    InvalidRate {
        /// Which rate was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Returned when both rates are zero, leaving `λ / (λ + μ)` undefined.
    #[error("up-probability is undefined: arrival and service rates are both zero")]
    UndefinedUpProbability,

    /// Returned when a generation would contain no events.
    #[error("invalid events per generation: {events} (must be >= 1)")]
    InvalidEventsPerGeneration {
        /// The rejected event count.
        events: u32,
    },

    /// Returned when the generation cap is zero.
    #[error("invalid max generations: {generations} (must be >= 1)")]
    InvalidMaxGenerations {
        /// The rejected generation cap.
        generations: u32,
    },

    /// Returned when `max_generations * events_per_generation` exceeds the event budget.
    #[error(
        "event budget overflow: {max_generations} generations x {events_per_generation} events exceeds {limit}"
    )]
    EventBudgetOverflow {
        /// Configured generation cap.
        max_generations: u32,
        /// Configured events per generation.
        events_per_generation: u32,
        /// Largest permitted total event count.
        limit: u64,
    },

    /// Returned when the convergence tolerance is negative or non-finite.
    #[error("invalid tolerance: {value} (must be finite and >= 0)")]
    InvalidTolerance {
        /// The rejected tolerance (as a fraction).
        value: f64,
    },
}
