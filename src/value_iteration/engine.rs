//! Value-iteration solver

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    environment::validate_model,
    policy::{Policy, action_values},
    ports::{Observer, TransitionModel, observer::notify_all},
    value_iteration::state_values::StateValues,
};

/// Value-iteration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueIterationConfig {
    /// Discount factor γ
    pub gamma: f64,

    /// Convergence threshold on the largest per-state change in a sweep
    pub theta: f64,

    /// Stop after this many sweeps even if not converged
    pub max_sweeps: Option<usize>,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            gamma: 0.95,
            theta: 0.1,
            max_sweeps: None,
        }
    }
}

impl ValueIterationConfig {
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: Option<usize>) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::config(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if !(self.theta > 0.0 && self.theta.is_finite()) {
            return Err(Error::config(format!(
                "theta must be a positive number, got {}",
                self.theta
            )));
        }
        if self.max_sweeps == Some(0) {
            return Err(Error::config("max_sweeps must be at least 1"));
        }
        Ok(())
    }
}

/// Result of a value-iteration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueIterationOutcome {
    /// State values after the last sweep
    pub values: StateValues,

    /// Greedy policy recomputed from `values`
    pub policy: Policy,

    /// Number of sweeps performed
    pub sweeps: usize,

    /// Largest per-state change of each sweep
    pub deltas: Vec<f64>,

    /// False when `max_sweeps` stopped the run before `delta < theta`
    pub converged: bool,
}

/// Value-iteration engine
pub struct ValueIterationEngine {
    config: ValueIterationConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl ValueIterationEngine {
    /// Create an engine, rejecting invalid parameters up front.
    pub fn new(config: ValueIterationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the engine
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &ValueIterationConfig {
        &self.config
    }

    /// Sweep until convergence (or `max_sweeps`) and extract the policy.
    ///
    /// Values are updated in place, so later states in a sweep already see
    /// the new values of earlier ones.
    ///
    /// # Errors
    ///
    /// Returns a model validation error before any sweep when the transition
    /// table is malformed, or [`Error::NonFiniteValue`] if a value overflows.
    pub fn solve<M: TransitionModel + ?Sized>(
        &mut self,
        model: &M,
    ) -> Result<ValueIterationOutcome> {
        let gamma = self.config.gamma;
        let theta = self.config.theta;
        validate_model(model)?;

        let mut values = StateValues::zeros(model.state_count());
        let mut deltas: Vec<f64> = Vec::new();
        let mut converged = false;

        notify_all(&mut self.observers, |o| o.on_training_start(0))?;

        loop {
            if self
                .config
                .max_sweeps
                .is_some_and(|limit| deltas.len() >= limit)
            {
                warn!(
                    sweeps = deltas.len(),
                    last_delta = deltas.last().copied(),
                    theta,
                    "value iteration stopped before converging"
                );
                break;
            }

            let sweep = deltas.len();
            let last_delta = deltas.last().copied();
            notify_all(&mut self.observers, |o| o.on_sweep(sweep, last_delta, &values))?;

            let mut delta: f64 = 0.0;
            for state in 0..model.state_count() {
                let previous = values.get(state)?;
                let best = action_values(model, &values, gamma, state)?
                    .into_iter()
                    .fold(f64::NEG_INFINITY, f64::max);
                if !best.is_finite() {
                    return Err(Error::NonFiniteValue {
                        quantity: "state value",
                        value: best,
                        state,
                    });
                }
                values.set(state, best)?;
                delta = delta.max((best - previous).abs());
            }

            deltas.push(delta);
            debug!(sweep, delta, "value iteration sweep finished");

            if delta < theta {
                converged = true;
                break;
            }
        }

        notify_all(&mut self.observers, |o| o.on_training_end())?;

        let policy = Policy::from_state_values(model, &values, gamma)?;
        info!(sweeps = deltas.len(), converged, "value iteration finished");

        Ok(ValueIterationOutcome {
            values,
            policy,
            sweeps: deltas.len(),
            deltas,
            converged,
        })
    }
}

/// Solve `model` with a fresh engine.
pub fn solve<M: TransitionModel + ?Sized>(
    model: &M,
    config: ValueIterationConfig,
) -> Result<ValueIterationOutcome> {
    ValueIterationEngine::new(config)?.solve(model)
}
