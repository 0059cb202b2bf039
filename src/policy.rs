//! Greedy policy extraction from value tables
//!
//! Every maximisation in this crate goes through [`argmax`], so ties always
//! resolve to the lowest action index.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::TransitionModel,
    q_learning::QTable,
    types::{ActionId, StateId},
    value_iteration::StateValues,
};

/// Index of the largest value, preferring the lowest index on ties.
///
/// Returns `None` for an empty slice.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Expected one-step value of every action in `state` under `values`:
/// `Σ p * (r + gamma * V[s'])` per action.
pub fn action_values<M: TransitionModel + ?Sized>(
    model: &M,
    values: &StateValues,
    gamma: f64,
    state: StateId,
) -> Result<Vec<f64>> {
    (0..model.action_count())
        .map(|action| {
            let outcomes = model.outcomes(state, action)?;
            let mut total = 0.0;
            for outcome in outcomes {
                total +=
                    outcome.probability * (outcome.reward + gamma * values.get(outcome.next_state)?);
            }
            Ok(total)
        })
        .collect()
}

/// Greedy action for `state` under an action-value table.
pub fn greedy_action(q_table: &QTable, state: StateId) -> Result<ActionId> {
    q_table.greedy_action(state)
}

/// Greedy action for `state` by one-step lookahead through the model.
pub fn lookahead_action<M: TransitionModel + ?Sized>(
    model: &M,
    values: &StateValues,
    gamma: f64,
    state: StateId,
) -> Result<ActionId> {
    let candidates = action_values(model, values, gamma, state)?;
    argmax(&candidates).ok_or_else(|| Error::InvalidModelShape {
        reason: "model has no actions".to_string(),
    })
}

/// Deterministic state → action mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    actions: Vec<ActionId>,
    action_count: usize,
}

impl Policy {
    /// Build a policy from explicit actions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionOutOfRange`] if any action is `>= action_count`.
    pub fn new(actions: Vec<ActionId>, action_count: usize) -> Result<Self> {
        if let Some(&action) = actions.iter().find(|&&a| a >= action_count) {
            return Err(Error::ActionOutOfRange {
                action,
                action_count,
            });
        }
        Ok(Self {
            actions,
            action_count,
        })
    }

    /// Greedy policy over a Q table.
    pub fn from_q_table(q_table: &QTable) -> Result<Self> {
        let actions = (0..q_table.state_count())
            .map(|state| q_table.greedy_action(state))
            .collect::<Result<Vec<_>>>()?;
        Self::new(actions, q_table.action_count())
    }

    /// Greedy policy by one-step lookahead over state values.
    pub fn from_state_values<M: TransitionModel + ?Sized>(
        model: &M,
        values: &StateValues,
        gamma: f64,
    ) -> Result<Self> {
        let actions = (0..model.state_count())
            .map(|state| lookahead_action(model, values, gamma, state))
            .collect::<Result<Vec<_>>>()?;
        Self::new(actions, model.action_count())
    }

    /// Action chosen in `state`.
    pub fn action(&self, state: StateId) -> Result<ActionId> {
        self.actions
            .get(state)
            .copied()
            .ok_or(Error::StateOutOfRange {
                state,
                state_count: self.actions.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    pub fn as_slice(&self) -> &[ActionId] {
        &self.actions
    }
}

impl Index<StateId> for Policy {
    type Output = ActionId;

    fn index(&self, state: StateId) -> &Self::Output {
        &self.actions[state]
    }
}
