//! Dense action-value table for tabular Q-learning

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    policy::argmax,
    types::{ActionId, StateId},
};

/// Q-table mapping (state, action) pairs to Q-values
///
/// Stored row-major: one row of `action_count` values per state. Every entry
/// starts at 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    state_count: usize,
    action_count: usize,
    q_values: Vec<f64>,
}

impl QTable {
    /// Create a zero-initialised Q-table
    pub fn new(state_count: usize, action_count: usize) -> Result<Self> {
        if state_count == 0 || action_count == 0 {
            return Err(Error::InvalidModelShape {
                reason: format!(
                    "Q-table needs at least one state and one action (got {state_count}x{action_count})"
                ),
            });
        }
        Ok(Self {
            state_count,
            action_count,
            q_values: vec![0.0; state_count * action_count],
        })
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    fn index(&self, state: StateId, action: ActionId) -> Result<usize> {
        if state >= self.state_count {
            return Err(Error::StateOutOfRange {
                state,
                state_count: self.state_count,
            });
        }
        if action >= self.action_count {
            return Err(Error::ActionOutOfRange {
                action,
                action_count: self.action_count,
            });
        }
        Ok(state * self.action_count + action)
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: StateId, action: ActionId) -> Result<f64> {
        Ok(self.q_values[self.index(state, action)?])
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: StateId, action: ActionId, value: f64) -> Result<()> {
        let idx = self.index(state, action)?;
        self.q_values[idx] = value;
        Ok(())
    }

    /// All action values of one state
    pub fn row(&self, state: StateId) -> Result<&[f64]> {
        let start = self.index(state, 0)?;
        Ok(&self.q_values[start..start + self.action_count])
    }

    /// Get maximum Q-value in a state
    pub fn max_q(&self, state: StateId) -> Result<f64> {
        Ok(self
            .row(state)?
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max))
    }

    /// Select greedy action (highest Q-value, lowest index on ties)
    pub fn greedy_action(&self, state: StateId) -> Result<ActionId> {
        let row = self.row(state)?;
        Ok(argmax(row).unwrap_or_default())
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// The bootstrap term is taken from `next_state` whether or not it is
    /// terminal; terminal rows are never updated, so they stay at zero.
    /// Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteValue`] if the reward or the updated value is
    /// NaN or infinite; the table is left unchanged in that case.
    pub fn q_learning_update(
        &mut self,
        state: StateId,
        action: ActionId,
        reward: f64,
        next_state: StateId,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Result<f64> {
        if !reward.is_finite() {
            return Err(Error::NonFiniteValue {
                quantity: "reward",
                value: reward,
                state,
            });
        }

        let idx = self.index(state, action)?;
        let current_q = self.q_values[idx];
        let max_next_q = self.max_q(next_state)?;
        let td_target = reward + discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + learning_rate * td_error;

        if !new_q.is_finite() {
            return Err(Error::NonFiniteValue {
                quantity: "action value",
                value: new_q,
                state,
            });
        }

        self.q_values[idx] = new_q;
        Ok(new_q)
    }

    /// Rows of the table, one per state
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.q_values.chunks(self.action_count)
    }

    /// Whether every entry is exactly zero
    pub fn is_zero(&self) -> bool {
        self.q_values.iter().all(|q| *q == 0.0)
    }
}
