//! State graph construction.

use crate::config::QueueConfig;
use crate::error::ChainError;
use crate::state::{Exits, State, StateKind};

/// One row of the transition table, without counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State index.
    pub index: usize,
    /// Role of the state.
    pub kind: StateKind,
    /// Probability of an arrival.
    pub up_probability: f64,
    /// Index reached on arrival.
    pub next_on_arrival: usize,
    /// Index reached on service completion.
    pub next_on_service: Option<usize>,
}

/// Arena of states indexed `0..N + max(K, 1)`.
///
/// The topology is fixed at construction; only the per-state counters
/// change while the walk runs.
#[derive(Debug, Clone)]
pub struct StateGraph {
    states: Vec<State>,
}

impl StateGraph {
    /// Builds the graph for a queue configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`QueueConfig::validate`].
    pub fn build(config: &QueueConfig) -> Result<Self, ChainError> {
        config.validate()?;
        let up_probability = config
            .up_probability()
            .ok_or(ChainError::UndefinedUpProbability)?;

        let n = config.capacity();
        let k = config.threshold();
        let mut states = Vec::with_capacity(config.state_count());

        let entry = if config.has_buffering() { n + 1 } else { 1 };
        states.push(State::new(
            StateKind::Empty,
            Exits::ArrivalOnly { arrival: entry },
        ));

        for i in 1..n {
            states.push(State::new(
                StateKind::Ordinary,
                Exits::Both {
                    arrival: i + 1,
                    service: i - 1,
                    up_probability,
                },
            ));
        }

        states.push(State::new(
            StateKind::Full,
            Exits::Both {
                arrival: n,
                service: n - 1,
                up_probability,
            },
        ));

        if config.has_buffering() {
            for i in n + 1..n + k - 1 {
                states.push(State::new(
                    StateKind::Buffering,
                    Exits::ArrivalOnly { arrival: i + 1 },
                ));
            }
            states.push(State::new(
                StateKind::ServiceInit,
                Exits::ArrivalOnly { arrival: k },
            ));
        }

        debug_assert_eq!(states.len(), config.state_count());
        Ok(Self { states })
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`: a valid graph holds at least the empty and full states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the state at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn state(&self, index: usize) -> &State {
        &self.states[index]
    }

    /// Returns all states in index order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub(crate) fn state_mut(&mut self, index: usize) -> &mut State {
        &mut self.states[index]
    }

    pub(crate) fn states_mut(&mut self) -> &mut [State] {
        &mut self.states
    }

    /// Topology as a comparable table, ignoring counters.
    pub fn transitions(&self) -> Vec<Transition> {
        self.states
            .iter()
            .enumerate()
            .map(|(index, s)| Transition {
                index,
                kind: s.kind(),
                up_probability: s.up_probability(),
                next_on_arrival: s.next_on_arrival(),
                next_on_service: s.next_on_service(),
            })
            .collect()
    }

    /// Current probability estimates in index order (0 for unvisited states).
    pub fn probabilities(&self) -> Vec<f64> {
        self.states.iter().map(State::probability).collect()
    }

    pub(crate) fn probabilities_into(&self, out: &mut [f64]) {
        for (o, s) in out.iter_mut().zip(&self.states) {
            *o = s.probability();
        }
    }
}
