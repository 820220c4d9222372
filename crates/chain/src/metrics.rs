//! Queue performance measures derived from the ergodic probabilities.

use crate::config::QueueConfig;
use crate::monitor::SimulationOutcome;

/// Performance measures of the queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueMetrics {
    /// Probability of the full state, `P_bl = p[N]`.
    pub overflow_probability: f64,
    /// Mean number of packets, `E_N`.
    pub mean_occupancy: f64,
    /// Admitted arrival rate, `γ = λ (1 - P_bl)`.
    pub throughput: f64,
    /// Mean packet sojourn time `T_d = E_N / γ` (Little's law).
    ///
    /// `None` when the throughput is zero.
    pub mean_sojourn_time: Option<f64>,
}

impl QueueMetrics {
    /// Computes the measures from a probability vector in state index order.
    ///
    /// Ordinary and full states contribute `i * p[i]` to the mean occupancy;
    /// buffering and service-initiation states contribute `(i - N) * p[i]`,
    /// counting buffered packets rather than the absolute index.
    ///
    /// # Panics
    ///
    /// Panics if `probabilities` is shorter than `N + 1`. Debug builds also
    /// panic when its length differs from [`QueueConfig::state_count`].
    pub fn from_probabilities(probabilities: &[f64], queue: &QueueConfig) -> Self {
        debug_assert_eq!(
            probabilities.len(),
            queue.state_count(),
            "one probability per state"
        );
        let overflow_probability = probabilities[queue.capacity()];

        let mean_occupancy: f64 = probabilities
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &p)| queue.packets_in_state(i) as f64 * p)
            .sum();

        let throughput = queue.arrival_rate() * (1.0 - overflow_probability);
        let mean_sojourn_time = if throughput > 0.0 {
            let t = mean_occupancy / throughput;
            t.is_finite().then_some(t)
        } else {
            None
        };

        Self {
            overflow_probability,
            mean_occupancy,
            throughput,
            mean_sojourn_time,
        }
    }

    /// Computes the measures from a finished simulation.
    pub fn from_outcome(outcome: &SimulationOutcome, queue: &QueueConfig) -> Self {
        Self::from_probabilities(&outcome.probabilities, queue)
    }
}
