//! Explicit transition tables and an environment that samples from them

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Environment, Outcome, Step, TransitionModel},
    types::{ActionId, StateId},
};

/// Allowed deviation of a (state, action) probability sum from 1.0.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Check that a transition model is well formed.
///
/// Every (state, action) pair must have at least one outcome, probabilities
/// must be finite, lie in `[0, 1]` and sum to 1 within
/// [`PROBABILITY_TOLERANCE`], rewards must be finite and next states must be
/// in range.
pub fn validate_model<M: TransitionModel + ?Sized>(model: &M) -> Result<()> {
    let state_count = model.state_count();
    let action_count = model.action_count();
    if state_count == 0 || action_count == 0 {
        return Err(Error::InvalidModelShape {
            reason: format!(
                "model needs at least one state and one action (got {state_count} states, {action_count} actions)"
            ),
        });
    }

    for state in 0..state_count {
        for action in 0..action_count {
            let invalid = |reason: String| Error::InvalidTransitionModel {
                state,
                action,
                reason,
            };

            let outcomes = model.outcomes(state, action)?;
            if outcomes.is_empty() {
                return Err(invalid("no outcomes".to_string()));
            }

            let mut total = 0.0;
            for outcome in outcomes {
                if !outcome.probability.is_finite()
                    || !(0.0..=1.0).contains(&outcome.probability)
                {
                    return Err(invalid(format!(
                        "probability {} is not in [0, 1]",
                        outcome.probability
                    )));
                }
                if !outcome.reward.is_finite() {
                    return Err(invalid(format!("reward {} is not finite", outcome.reward)));
                }
                if outcome.next_state >= state_count {
                    return Err(invalid(format!(
                        "next state {} is out of range",
                        outcome.next_state
                    )));
                }
                total += outcome.probability;
            }

            if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(invalid(format!("probabilities sum to {total}, expected 1.0")));
            }
        }
    }

    Ok(())
}

/// Dense transition table indexed by `state * action_count + action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularModel {
    state_count: usize,
    action_count: usize,
    outcomes: Vec<Vec<Outcome>>,
}

impl TabularModel {
    /// Build a model from `transitions[state][action]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidModelShape`] when states list different numbers
    /// of actions, or any error from [`validate_model`].
    pub fn new(transitions: Vec<Vec<Vec<Outcome>>>) -> Result<Self> {
        let state_count = transitions.len();
        let action_count = transitions.first().map_or(0, Vec::len);

        if let Some((state, actions)) = transitions
            .iter()
            .enumerate()
            .find(|(_, actions)| actions.len() != action_count)
        {
            return Err(Error::InvalidModelShape {
                reason: format!(
                    "state {state} lists {} actions, expected {action_count}",
                    actions.len()
                ),
            });
        }

        let model = Self {
            state_count,
            action_count,
            outcomes: transitions.into_iter().flatten().collect(),
        };
        validate_model(&model)?;
        Ok(model)
    }

    fn check_state(&self, state: StateId) -> Result<()> {
        if state < self.state_count {
            Ok(())
        } else {
            Err(Error::StateOutOfRange {
                state,
                state_count: self.state_count,
            })
        }
    }

    fn check_action(&self, action: ActionId) -> Result<()> {
        if action < self.action_count {
            Ok(())
        } else {
            Err(Error::ActionOutOfRange {
                action,
                action_count: self.action_count,
            })
        }
    }
}

impl TransitionModel for TabularModel {
    fn state_count(&self) -> usize {
        self.state_count
    }

    fn action_count(&self) -> usize {
        self.action_count
    }

    fn outcomes(&self, state: StateId, action: ActionId) -> Result<&[Outcome]> {
        self.check_state(state)?;
        self.check_action(action)?;
        Ok(&self.outcomes[state * self.action_count + action])
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Episodic environment that samples transitions from a [`TabularModel`].
///
/// Outcomes are drawn from the categorical distribution of the current
/// (state, action) pair: the first outcome whose cumulative probability
/// exceeds a uniform draw is taken.
#[derive(Debug, Clone)]
pub struct ModelEnvironment {
    model: TabularModel,
    start_state: StateId,
    state: StateId,
    rng: StdRng,
    max_steps: Option<usize>,
    elapsed: usize,
}

impl ModelEnvironment {
    /// Create an environment that starts every episode in `start_state`.
    pub fn new(model: TabularModel, start_state: StateId) -> Result<Self> {
        model.check_state(start_state)?;
        Ok(Self {
            model,
            start_state,
            state: start_state,
            rng: build_rng(None),
            max_steps: None,
            elapsed: 0,
        })
    }

    /// Seed the outcome sampler for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Force `done` after this many steps in one episode.
    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn model(&self) -> &TabularModel {
        &self.model
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    fn sample(&mut self, action: ActionId) -> Result<Outcome> {
        let outcomes = self.model.outcomes(self.state, action)?;
        let ticket: f64 = self.rng.random();
        let mut cumulative = 0.0;
        for outcome in outcomes {
            cumulative += outcome.probability;
            if cumulative > ticket {
                return Ok(*outcome);
            }
        }
        // Rounding can leave the cumulative sum a hair below the draw.
        outcomes
            .last()
            .copied()
            .ok_or_else(|| Error::InvalidTransitionModel {
                state: self.state,
                action,
                reason: "no outcomes".to_string(),
            })
    }
}

impl Environment for ModelEnvironment {
    fn state_count(&self) -> usize {
        self.model.state_count
    }

    fn action_count(&self) -> usize {
        self.model.action_count
    }

    fn reset(&mut self) -> Result<StateId> {
        self.state = self.start_state;
        self.elapsed = 0;
        Ok(self.state)
    }

    fn step(&mut self, action: ActionId) -> Result<Step> {
        self.model.check_action(action)?;
        let outcome = self.sample(action)?;
        self.state = outcome.next_state;
        self.elapsed += 1;

        let truncated = self.max_steps.is_some_and(|limit| self.elapsed >= limit);
        Ok(Step {
            next_state: outcome.next_state,
            reward: outcome.reward,
            done: outcome.done || truncated,
        })
    }

    fn position(&self) -> Option<StateId> {
        Some(self.state)
    }
}

impl TransitionModel for ModelEnvironment {
    fn state_count(&self) -> usize {
        self.model.state_count
    }

    fn action_count(&self) -> usize {
        self.model.action_count
    }

    fn outcomes(&self, state: StateId, action: ActionId) -> Result<&[Outcome]> {
        self.model.outcomes(state, action)
    }
}
