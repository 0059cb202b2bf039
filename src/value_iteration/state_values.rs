//! Dense state-value table

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, types::StateId};

/// One value per state, all starting at 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateValues(Vec<f64>);

impl StateValues {
    pub fn zeros(state_count: usize) -> Self {
        Self(vec![0.0; state_count])
    }

    /// Wrap existing values, rejecting NaN and infinities.
    pub fn from_vec(values: Vec<f64>) -> Result<Self> {
        if let Some((state, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::NonFiniteValue {
                quantity: "state value",
                value,
                state,
            });
        }
        Ok(Self(values))
    }

    pub fn get(&self, state: StateId) -> Result<f64> {
        self.0.get(state).copied().ok_or(Error::StateOutOfRange {
            state,
            state_count: self.0.len(),
        })
    }

    pub fn set(&mut self, state: StateId, value: f64) -> Result<()> {
        let state_count = self.0.len();
        let slot = self
            .0
            .get_mut(state)
            .ok_or(Error::StateOutOfRange { state, state_count })?;
        *slot = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl Index<StateId> for StateValues {
    type Output = f64;

    fn index(&self, state: StateId) -> &Self::Output {
        &self.0[state]
    }
}

impl From<StateValues> for Vec<f64> {
    fn from(values: StateValues) -> Self {
        values.0
    }
}
