//! Environment port - the MDP surface seen by the learning engines
//!
//! Model-free learners only need [`Environment`]; model-based solvers
//! additionally need read access to the transition table through
//! [`TransitionModel`].

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    types::{ActionId, StateId},
};

/// One possible consequence of taking an action in a state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Probability of this outcome, in `[0, 1]`
    pub probability: f64,
    /// State reached
    pub next_state: StateId,
    /// Reward received on the transition
    pub reward: f64,
    /// Whether the episode ends after the transition
    pub done: bool,
}

impl Outcome {
    pub fn new(probability: f64, next_state: StateId, reward: f64, done: bool) -> Self {
        Self {
            probability,
            next_state,
            reward,
            done,
        }
    }
}

/// Result of a single environment step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub next_state: StateId,
    pub reward: f64,
    pub done: bool,
}

/// A discrete, finite, episodic environment.
///
/// Implementations own their current position exclusively and change it only
/// through [`Environment::reset`] and [`Environment::step`].
pub trait Environment {
    /// Number of discrete states (rows of a value table).
    fn state_count(&self) -> usize;

    /// Number of discrete actions (columns of an action-value table).
    fn action_count(&self) -> usize;

    /// Move back to the start state and return it.
    fn reset(&mut self) -> Result<StateId>;

    /// Apply an action to the current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ActionOutOfRange`] when `action` is not in
    /// `[0, action_count)`. Actions are never clamped.
    fn step(&mut self, action: ActionId) -> Result<Step>;

    /// Current position, if the environment exposes it.
    ///
    /// Used only for rendering; engines never read it.
    fn position(&self) -> Option<StateId> {
        None
    }
}

/// Read-only access to the full transition table of an MDP.
pub trait TransitionModel {
    fn state_count(&self) -> usize;

    fn action_count(&self) -> usize;

    /// Ordered outcomes of taking `action` in `state`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StateOutOfRange`] or
    /// [`crate::Error::ActionOutOfRange`] for indices outside the table.
    fn outcomes(&self, state: StateId, action: ActionId) -> Result<&[Outcome]>;
}
