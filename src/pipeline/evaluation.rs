//! Policy replay
//!
//! Follows a fixed policy from reset to termination, either for a fixed
//! number of episodes (headless runs and tests) or forever (live viewing).

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Error, Result,
    policy::Policy,
    ports::{Environment, EpisodeSummary, Observer, StepRecord, ValueView, observer::notify_all},
};

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of evaluation episodes for finite runs
    pub episodes: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { episodes: 100 }
    }
}

impl EvaluationConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.episodes < 1 {
            return Err(Error::config("evaluation episodes must be at least 1"));
        }
        Ok(())
    }
}

/// Result of a finite evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// One summary per episode, in order
    pub episodes: Vec<EpisodeSummary>,
}

impl EvaluationReport {
    /// Reward of the last transition of every episode
    pub fn final_rewards(&self) -> Vec<f64> {
        self.episodes.iter().map(|e| e.final_reward).collect()
    }

    /// Episodes that ended with a positive reward
    pub fn successes(&self) -> usize {
        self.episodes
            .iter()
            .filter(|e| e.final_reward > 0.0)
            .count()
    }

    pub fn success_rate(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            self.successes() as f64 / self.episodes.len() as f64
        }
    }

    /// Average episode length
    pub fn mean_steps(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            self.episodes.iter().map(|e| e.steps).sum::<usize>() as f64
                / self.episodes.len() as f64
        }
    }
}

/// Replays a fixed policy in an environment
pub struct EvaluationPipeline {
    config: EvaluationConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl EvaluationPipeline {
    /// Create a new evaluation pipeline
    pub fn new(config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run the configured number of episodes and collect their summaries.
    ///
    /// `values` is only handed to observers (for display); it never affects
    /// the actions taken.
    pub fn run_episodes<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        policy: &Policy,
        values: ValueView<'_>,
    ) -> Result<EvaluationReport> {
        check_policy(env, policy)?;
        let total = self.config.episodes;
        notify_all(&mut self.observers, |o| o.on_training_start(total))?;

        let mut episodes = Vec::with_capacity(total);
        for episode in 0..total {
            episodes.push(self.run_episode(episode, env, policy, values)?);
        }

        notify_all(&mut self.observers, |o| o.on_training_end())?;
        Ok(EvaluationReport { episodes })
    }

    /// Replay episodes until an error occurs.
    ///
    /// Observers see every episode end; attach a [`RewardLogObserver`] to
    /// print rewards. Each reward is also logged at info level.
    ///
    /// [`RewardLogObserver`]: crate::pipeline::RewardLogObserver
    pub fn run_forever<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        policy: &Policy,
        values: ValueView<'_>,
    ) -> Result<Infallible> {
        check_policy(env, policy)?;
        notify_all(&mut self.observers, |o| o.on_training_start(0))?;

        let mut episode = 0;
        loop {
            let summary = self.run_episode(episode, env, policy, values)?;
            info!(episode, reward = summary.final_reward, "evaluation episode finished");
            episode += 1;
        }
    }

    /// Follow `policy` from a fresh reset until the environment reports `done`.
    pub fn run_episode<E: Environment + ?Sized>(
        &mut self,
        episode: usize,
        env: &mut E,
        policy: &Policy,
        values: ValueView<'_>,
    ) -> Result<EpisodeSummary> {
        let mut state = env.reset()?;
        notify_all(&mut self.observers, |o| o.on_episode_start(episode, state, values))?;

        let mut steps = 0;
        let mut final_reward = 0.0;
        let mut total_return = 0.0;

        loop {
            let action = policy.action(state)?;
            let step = env.step(action)?;

            let record = StepRecord {
                episode,
                step: steps,
                state,
                action,
                reward: step.reward,
                next_state: step.next_state,
                done: step.done,
            };
            notify_all(&mut self.observers, |o| o.on_step(&record, values))?;

            steps += 1;
            final_reward = step.reward;
            total_return += step.reward;
            state = step.next_state;

            if step.done {
                break;
            }
        }

        let summary = EpisodeSummary {
            episode,
            steps,
            final_reward,
            total_return,
            epsilon: None,
        };
        notify_all(&mut self.observers, |o| o.on_episode_end(&summary))?;
        Ok(summary)
    }
}

fn check_policy<E: Environment + ?Sized>(env: &E, policy: &Policy) -> Result<()> {
    if policy.len() != env.state_count() {
        return Err(Error::PolicyShapeMismatch {
            policy_len: policy.len(),
            state_count: env.state_count(),
        });
    }
    if let Some(&action) = policy
        .as_slice()
        .iter()
        .find(|&&a| a >= env.action_count())
    {
        return Err(Error::ActionOutOfRange {
            action,
            action_count: env.action_count(),
        });
    }
    Ok(())
}

/// Evaluate `policy` for `episodes` episodes without observers.
pub fn evaluate<E: Environment + ?Sized>(
    env: &mut E,
    policy: &Policy,
    episodes: usize,
) -> Result<EvaluationReport> {
    EvaluationPipeline::new(EvaluationConfig::default().with_episodes(episodes))?.run_episodes(
        env,
        policy,
        ValueView::Policy(policy),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        environment::{FrozenLake, LakeMap},
        types::Action,
    };

    #[test]
    fn test_rejects_policy_of_wrong_length() {
        let mut lake = FrozenLake::new(LakeMap::named("4x4").unwrap(), false).unwrap();
        let policy = Policy::new(vec![0; 3], 4).unwrap();
        assert!(matches!(
            evaluate(&mut lake, &policy, 1),
            Err(Error::PolicyShapeMismatch {
                policy_len: 3,
                state_count: 16
            })
        ));
    }

    #[test]
    fn test_rejects_zero_episodes() {
        assert!(EvaluationPipeline::new(EvaluationConfig::default().with_episodes(0)).is_err());
    }

    #[test]
    fn test_reports_final_step_reward() {
        // S F G: walking right twice reaches the goal.
        let map = LakeMap::parse(&["SFG"]).unwrap();
        let mut lake = FrozenLake::new(map, false).unwrap();
        let right = Action::Right.index();
        let policy = Policy::new(vec![right; 3], 4).unwrap();

        let report = evaluate(&mut lake, &policy, 3).unwrap();
        assert_eq!(report.final_rewards(), vec![1.0, 1.0, 1.0]);
        assert_eq!(report.successes(), 3);
        assert_eq!(report.mean_steps(), 2.0);
    }

    #[test]
    fn test_hole_ends_with_zero_reward() {
        let map = LakeMap::parse(&["SHG"]).unwrap();
        let mut lake = FrozenLake::new(map, false).unwrap();
        let policy = Policy::new(vec![Action::Right.index(); 3], 4).unwrap();

        let report = evaluate(&mut lake, &policy, 1).unwrap();
        assert_eq!(report.episodes[0].steps, 1);
        assert_eq!(report.episodes[0].final_reward, 0.0);
        assert_eq!(report.success_rate(), 0.0);
    }
}
