//! Occupancy states of the combined queue and buffer.

/// Role of a state within the graph.
///
/// | Kind | Index | Arrival | Service |
/// |------|-------|---------|---------|
/// | Empty | `0` | `1` or `N + 1` | none |
/// | Ordinary | `1..N` | `i + 1` | `i - 1` |
/// | Full | `N` | `N` | `N - 1` |
/// | Buffering | `N+1..N+K-1` | `i + 1` | none |
/// | ServiceInit | `N + K - 1` | `K` | none |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// No packets in the system.
    Empty,
    /// Packets queued below capacity, service running.
    Ordinary,
    /// Queue at capacity; further arrivals are lost.
    Full,
    /// Packets accumulating while service is stopped.
    Buffering,
    /// Last buffering step; the next arrival restarts service at occupancy `K`.
    ServiceInit,
}

/// Outgoing transitions of a state.
///
/// A state either always moves on arrival, or chooses between an arrival
/// and a service completion. Both edges are present whenever a choice is
/// possible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exits {
    /// The next event is always an arrival.
    ArrivalOnly {
        /// Index reached on arrival.
        arrival: usize,
    },
    /// The next event is an arrival with probability `up_probability`.
    Both {
        /// Index reached on arrival.
        arrival: usize,
        /// Index reached on service completion.
        service: usize,
        /// Probability of an arrival, `λ / (λ + μ)`.
        up_probability: f64,
    },
}

/// One occupancy level together with its visit counters.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    kind: StateKind,
    exits: Exits,
    generation_visits: u64,
    total_visits: u64,
    last_probability: f64,
}

impl State {
    pub(crate) fn new(kind: StateKind, exits: Exits) -> Self {
        Self {
            kind,
            exits,
            generation_visits: 0,
            total_visits: 0,
            last_probability: 1.0,
        }
    }

    /// Returns the role of this state.
    pub fn kind(&self) -> StateKind {
        self.kind
    }

    /// Returns the outgoing transitions.
    pub fn exits(&self) -> Exits {
        self.exits
    }

    /// Probability that the next event here is an arrival.
    pub fn up_probability(&self) -> f64 {
        match self.exits {
            Exits::ArrivalOnly { .. } => 1.0,
            Exits::Both { up_probability, .. } => up_probability,
        }
    }

    /// Index reached on arrival.
    pub fn next_on_arrival(&self) -> usize {
        match self.exits {
            Exits::ArrivalOnly { arrival } | Exits::Both { arrival, .. } => arrival,
        }
    }

    /// Index reached on service completion, if service runs in this state.
    pub fn next_on_service(&self) -> Option<usize> {
        match self.exits {
            Exits::ArrivalOnly { .. } => None,
            Exits::Both { service, .. } => Some(service),
        }
    }

    /// Arrivals observed here during the current generation.
    pub fn generation_visits(&self) -> u64 {
        self.generation_visits
    }

    /// Arrivals observed here since the start of the run.
    pub fn total_visits(&self) -> u64 {
        self.total_visits
    }

    /// Cached estimate used as the convergence baseline.
    ///
    /// Starts at 1.0 and keeps that value until the state is first visited.
    pub fn last_probability(&self) -> f64 {
        self.last_probability
    }

    /// Estimated ergodic probability; 0 for a state never visited.
    pub fn probability(&self) -> f64 {
        if self.total_visits > 0 {
            self.last_probability
        } else {
            0.0
        }
    }

    pub(crate) fn record_arrival(&mut self) {
        self.generation_visits += 1;
    }

    /// Counts an arrival directly into the running total.
    pub(crate) fn seed_arrival(&mut self) {
        self.total_visits += 1;
    }

    /// Folds the generation count into the total and re-estimates the probability.
    ///
    /// Returns the relative change against the previous estimate, or `None`
    /// if the state is still unvisited.
    pub(crate) fn settle(&mut self, total_arrivals: u64) -> Option<f64> {
        self.total_visits += self.generation_visits;
        self.generation_visits = 0;
        if self.total_visits == 0 {
            return None;
        }
        let p = self.total_visits as f64 / total_arrivals as f64;
        let change = ((p - self.last_probability) / self.last_probability).abs();
        self.last_probability = p;
        Some(change)
    }
}
