//! Observer port - abstraction for training and evaluation events
//!
//! This port lets progress bars, metrics, JSONL export and rendering hook into
//! the engines without the engines knowing about any of them.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::renderer::ValueView,
    types::{ActionId, StateId},
    value_iteration::StateValues,
};

/// A single environment transition as seen by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Episode index (0-based)
    pub episode: usize,
    /// Step index within the episode (0-based)
    pub step: usize,
    pub state: StateId,
    pub action: ActionId,
    pub reward: f64,
    pub next_state: StateId,
    pub done: bool,
}

/// Summary of a finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode index (0-based)
    pub episode: usize,
    /// Number of steps taken
    pub steps: usize,
    /// Reward of the last transition
    pub final_reward: f64,
    /// Undiscounted sum of rewards
    pub total_return: f64,
    /// Exploration rate in effect during the episode (Q-learning only)
    pub epsilon: Option<f64>,
}

/// Observer trait for monitoring training, solving and evaluation
///
/// # Event Sequence
///
/// Episodic runs (Q-learning, evaluation):
/// 1. `on_training_start(total_episodes)`
/// 2. For each episode:
///    - `on_episode_start(episode, start_state, values)`
///    - `on_step(record, values)` for each step, after any table update
///    - `on_episode_end(summary)`
/// 3. `on_training_end()`
///
/// Value iteration calls `on_training_start(0)`, then `on_sweep` once per
/// sweep (before the sweep runs, mirroring a live display of the table being
/// improved), then `on_training_end()`.
///
/// # Examples
///
/// ```no_run
/// use tabular_rl::ports::{EpisodeSummary, Observer};
///
/// struct SuccessCounter {
///     successes: usize,
/// }
///
/// impl Observer for SuccessCounter {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> tabular_rl::Result<()> {
///         if summary.final_reward > 0.0 {
///             self.successes += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first episode or sweep.
    ///
    /// `total_episodes` is zero for runs that are not episode based.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after the environment has been reset for a new episode.
    fn on_episode_start(
        &mut self,
        _episode: usize,
        _start_state: StateId,
        _values: ValueView<'_>,
    ) -> Result<()> {
        Ok(())
    }

    /// Called after each environment step.
    ///
    /// For Q-learning, `values` already contains the update for this step.
    fn on_step(&mut self, _record: &StepRecord, _values: ValueView<'_>) -> Result<()> {
        Ok(())
    }

    /// Called when an episode terminates.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called at the start of each value-iteration sweep.
    ///
    /// `sweep` is 0-based; `last_delta` is the delta of the previous sweep, or
    /// `None` before the first one.
    fn on_sweep(
        &mut self,
        _sweep: usize,
        _last_delta: Option<f64>,
        _values: &StateValues,
    ) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode or sweep.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Deliver one event to every observer, stopping at the first error.
pub(crate) fn notify_all<F>(observers: &mut [Box<dyn Observer>], mut event: F) -> Result<()>
where
    F: FnMut(&mut dyn Observer) -> Result<()>,
{
    for observer in observers.iter_mut() {
        event(observer.as_mut())?;
    }
    Ok(())
}
