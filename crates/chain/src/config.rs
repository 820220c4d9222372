//! Configuration for the queue model and the simulation run.

use crate::error::ChainError;

/// Largest total event count a run may be configured for.
///
/// Matches the range of a signed 32-bit event counter.
pub const MAX_TOTAL_EVENTS: u64 = i32::MAX as u64;

/// Parameters of the queueing model.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use ergosim_chain::QueueConfig;
///
/// let config = QueueConfig::new(5)
///     .with_threshold(3)
///     .with_arrival_rate(2.0)
///     .with_service_rate(3.0);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.state_count(), 8);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct QueueConfig {
    capacity: usize,
    threshold: usize,
    arrival_rate: f64,
    service_rate: f64,
}

impl QueueConfig {
    /// Creates a new configuration with the given capacity `N`.
    ///
    /// Defaults: `threshold = 0`, `arrival_rate = 1.0`, `service_rate = 1.0`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            threshold: 0,
            arrival_rate: 1.0,
            service_rate: 1.0,
        }
    }

    /// Sets the service-initiation threshold `K`.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the mean arrival rate `λ` (packets per second).
    pub fn with_arrival_rate(mut self, rate: f64) -> Self {
        self.arrival_rate = rate;
        self
    }

    /// Sets the mean service rate `μ` (packets per second).
    pub fn with_service_rate(mut self, rate: f64) -> Self {
        self.service_rate = rate;
        self
    }

    // --- Accessors ---

    /// Returns the system capacity `N`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the service-initiation threshold `K`.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the arrival rate `λ`.
    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    /// Returns the service rate `μ`.
    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    /// Returns `true` when the model has a buffering chain and a
    /// service-initiation state (`K >= 2`).
    pub fn has_buffering(&self) -> bool {
        self.threshold >= 2
    }

    /// Number of states in the graph: `N + max(K, 1)`.
    ///
    /// `K = 0` and `K = 1` share the same layout: the empty state, the
    /// ordinary states and the full state, with no buffering chain.
    pub fn state_count(&self) -> usize {
        self.capacity + self.threshold.max(1)
    }

    /// Number of packets represented by the state at `index`.
    ///
    /// Ordinary and full states count their index; buffering and
    /// service-initiation states count buffered packets, `index - N`.
    pub fn packets_in_state(&self, index: usize) -> usize {
        if index > self.capacity {
            index - self.capacity
        } else {
            index
        }
    }

    /// Probability that the next event in an ordinary or full state is an arrival.
    ///
    /// Returns `None` when `λ + μ = 0`.
    pub fn up_probability(&self) -> Option<f64> {
        let total = self.arrival_rate + self.service_rate;
        if total > 0.0 {
            Some(self.arrival_rate / total)
        } else {
            None
        }
    }

    /// Validates this configuration.
    ///
    /// Checks that the capacity is at least 1, the threshold does not exceed
    /// the capacity, both rates are finite and non-negative, and at least one
    /// rate is positive.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.capacity < 1 {
            return Err(ChainError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        if self.threshold > self.capacity {
            return Err(ChainError::ThresholdExceedsCapacity {
                threshold: self.threshold,
                capacity: self.capacity,
            });
        }
        Self::validate_rate(self.arrival_rate, "arrival rate")?;
        Self::validate_rate(self.service_rate, "service rate")?;
        if self.up_probability().is_none() {
            return Err(ChainError::UndefinedUpProbability);
        }
        Ok(())
    }

    fn validate_rate(value: f64, name: &'static str) -> Result<(), ChainError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ChainError::InvalidRate { name, value });
        }
        Ok(())
    }
}

/// Parameters controlling generation length and the stopping rule.
///
/// # Example
///
/// ```
/// use ergosim_chain::SimulationConfig;
///
/// let config = SimulationConfig::new()
///     .with_events_per_generation(5000)
///     .with_max_generations(200)
///     .with_tolerance(0.005);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    events_per_generation: u32,
    max_generations: u32,
    tolerance: f64,
}

impl SimulationConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `events_per_generation = 1000`, `max_generations = 100`,
    /// `tolerance = 0.01` (1%).
    pub fn new() -> Self {
        Self {
            events_per_generation: 1000,
            max_generations: 100,
            tolerance: 0.01,
        }
    }

    /// Sets the number of walker steps per generation `E`.
    pub fn with_events_per_generation(mut self, events: u32) -> Self {
        self.events_per_generation = events;
        self
    }

    /// Sets the generation cap `G`.
    pub fn with_max_generations(mut self, generations: u32) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the relative-change tolerance `ε` as a fraction (0.01 = 1%).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    // --- Accessors ---

    /// Returns the number of walker steps per generation.
    pub fn events_per_generation(&self) -> u32 {
        self.events_per_generation
    }

    /// Returns the generation cap.
    pub fn max_generations(&self) -> u32 {
        self.max_generations
    }

    /// Returns the relative-change tolerance as a fraction.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Validates this configuration.
    ///
    /// Rejects empty generations, a zero generation cap, an event budget
    /// above [`MAX_TOTAL_EVENTS`], and negative or non-finite tolerances.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.events_per_generation < 1 {
            return Err(ChainError::InvalidEventsPerGeneration {
                events: self.events_per_generation,
            });
        }
        if self.max_generations < 1 {
            return Err(ChainError::InvalidMaxGenerations {
                generations: self.max_generations,
            });
        }
        let budget = u64::from(self.max_generations) * u64::from(self.events_per_generation);
        if budget > MAX_TOTAL_EVENTS {
            return Err(ChainError::EventBudgetOverflow {
                max_generations: self.max_generations,
                events_per_generation: self.events_per_generation,
                limit: MAX_TOTAL_EVENTS,
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ChainError::InvalidTolerance {
                value: self.tolerance,
            });
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
