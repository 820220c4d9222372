//! Single-cursor random walk over the state graph.

use crate::graph::StateGraph;
use crate::state::Exits;

/// Source of independent uniform draws in `[0, 1)`.
pub trait UniformSource {
    /// Returns the next draw.
    fn next_uniform(&mut self) -> f64;
}

impl<R: rand::Rng> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.random()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
///
/// An empty script always yields `0.0`.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: Vec<f64>,
    pos: usize,
}

impl ScriptedDraws {
    /// Creates a replay source over `draws`.
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, pos: 0 }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl UniformSource for ScriptedDraws {
    fn next_uniform(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let u = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        u
    }
}

/// Kind of event taken by one walker step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A packet arrived.
    Arrival,
    /// A packet completed service.
    Service,
}

/// The walk cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walker {
    cursor: usize,
}

impl Walker {
    /// Places the cursor at `start`.
    pub fn new(start: usize) -> Self {
        Self { cursor: start }
    }

    /// Index of the current state.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advances the cursor by one event.
    ///
    /// States that always move on arrival, or whose up-probability is 1.0,
    /// do not consume a draw. An arrival is credited to the state it leaves.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is outside `graph`.
    pub fn step(&mut self, graph: &mut StateGraph, rng: &mut impl UniformSource) -> Event {
        let state = graph.state_mut(self.cursor);
        let (event, next) = match state.exits() {
            Exits::ArrivalOnly { arrival } => (Event::Arrival, arrival),
            Exits::Both {
                arrival,
                service,
                up_probability,
            } => {
                if up_probability >= 1.0 || rng.next_uniform() < up_probability {
                    (Event::Arrival, arrival)
                } else {
                    (Event::Service, service)
                }
            }
        };
        if event == Event::Arrival {
            state.record_arrival();
        }
        self.cursor = next;
        event
    }
}
