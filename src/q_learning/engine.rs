//! Q-learning training engine
//!
//! The engine owns its Q-table for the duration of a run and interacts with
//! the environment only through [`Environment::reset`] and
//! [`Environment::step`].

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error, Result,
    policy::Policy,
    ports::{
        Environment, EpisodeSummary, Observer, StepRecord, ValueView, observer::notify_all,
    },
    q_learning::q_table::QTable,
    types::{ActionId, StateId},
};

/// Q-learning hyperparameters
///
/// Defaults reproduce the classic Frozen Lake settings: 500 episodes,
/// ε = 0.9 decayed by 0.95 every 100 episodes down to 0.01, γ = 0.95 and a
/// learning rate of 0.81.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Number of training episodes
    pub episodes: usize,

    /// Initial exploration probability
    pub epsilon: f64,

    /// Multiplicative decay applied to ε every `decay_interval` episodes
    pub epsilon_decay: f64,

    /// Lower bound for ε
    pub min_epsilon: f64,

    /// Discount factor γ
    pub gamma: f64,

    /// Step size α
    pub learning_rate: f64,

    /// Completed episodes between two ε decays
    pub decay_interval: usize,

    /// Random seed for exploration
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            epsilon: 0.9,
            epsilon_decay: 0.95,
            min_epsilon: 0.01,
            gamma: 0.95,
            learning_rate: 0.81,
            decay_interval: 100,
            seed: None,
        }
    }
}

impl QLearningConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_epsilon_decay(mut self, epsilon_decay: f64) -> Self {
        self.epsilon_decay = epsilon_decay;
        self
    }

    pub fn with_min_epsilon(mut self, min_epsilon: f64) -> Self {
        self.min_epsilon = min_epsilon;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_decay_interval(mut self, decay_interval: usize) -> Self {
        self.decay_interval = decay_interval;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every hyperparameter against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.episodes < 1 {
            return Err(Error::config("episodes must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::config(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::config(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            )));
        }
        if !(self.min_epsilon >= 0.0 && self.min_epsilon.is_finite()) {
            return Err(Error::config(format!(
                "min_epsilon must be a non-negative number, got {}",
                self.min_epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::config(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::config(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.decay_interval < 1 {
            return Err(Error::config("decay_interval must be at least 1"));
        }
        Ok(())
    }
}

/// Result of a Q-learning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningOutcome {
    /// Action values after every update of the run
    pub q_table: QTable,

    /// Greedy policy over the final table
    pub policy: Policy,

    /// Per-episode statistics, in order
    pub episodes: Vec<EpisodeSummary>,

    /// Exploration rate after the last decay
    pub final_epsilon: f64,
}

impl QLearningOutcome {
    /// Fraction of training episodes whose last reward was positive
    pub fn success_rate(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            let successes = self
                .episodes
                .iter()
                .filter(|e| e.final_reward > 0.0)
                .count();
            successes as f64 / self.episodes.len() as f64
        }
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning engine (off-policy TD control)
pub struct QLearningEngine {
    config: QLearningConfig,
    rng: StdRng,
    observers: Vec<Box<dyn Observer>>,
}

impl QLearningEngine {
    /// Create an engine, rejecting invalid hyperparameters up front.
    pub fn new(config: QLearningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: build_rng(config.seed),
            config,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the engine
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// ε-greedy action selection
    fn select_action(&mut self, q_table: &QTable, state: StateId, epsilon: f64) -> Result<ActionId> {
        if self.rng.random::<f64>() < epsilon {
            // Explore: uniform random action
            Ok(self.rng.random_range(0..q_table.action_count()))
        } else {
            // Exploit: greedy action based on Q-values
            q_table.greedy_action(state)
        }
    }

    /// Run the configured number of episodes against `env`.
    pub fn train<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<QLearningOutcome> {
        let config = self.config.clone();
        let state_count = env.state_count();
        let mut q_table = QTable::new(state_count, env.action_count())?;
        let mut epsilon = config.epsilon;
        let mut episodes = Vec::with_capacity(config.episodes);

        notify_all(&mut self.observers, |o| o.on_training_start(config.episodes))?;

        for episode in 0..config.episodes {
            let mut state = check_state(env.reset()?, state_count)?;
            notify_all(&mut self.observers, |o| {
                o.on_episode_start(episode, state, ValueView::ActionValues(&q_table))
            })?;

            let mut steps = 0;
            let mut final_reward = 0.0;
            let mut total_return = 0.0;

            loop {
                let action = self.select_action(&q_table, state, epsilon)?;
                let step = env.step(action)?;
                let next_state = check_state(step.next_state, state_count)?;

                q_table.q_learning_update(
                    state,
                    action,
                    step.reward,
                    next_state,
                    config.learning_rate,
                    config.gamma,
                )?;

                let record = StepRecord {
                    episode,
                    step: steps,
                    state,
                    action,
                    reward: step.reward,
                    next_state,
                    done: step.done,
                };
                notify_all(&mut self.observers, |o| {
                    o.on_step(&record, ValueView::ActionValues(&q_table))
                })?;

                steps += 1;
                final_reward = step.reward;
                total_return += step.reward;
                state = next_state;

                if step.done {
                    break;
                }
            }

            let summary = EpisodeSummary {
                episode,
                steps,
                final_reward,
                total_return,
                epsilon: Some(epsilon),
            };
            notify_all(&mut self.observers, |o| o.on_episode_end(&summary))?;
            episodes.push(summary);

            debug!(episode, steps, final_reward, epsilon, "q-learning episode finished");

            if (episode + 1) % config.decay_interval == 0 {
                epsilon = (epsilon * config.epsilon_decay).max(config.min_epsilon);
            }
        }

        notify_all(&mut self.observers, |o| o.on_training_end())?;

        let policy = Policy::from_q_table(&q_table)?;
        let outcome = QLearningOutcome {
            q_table,
            policy,
            episodes,
            final_epsilon: epsilon,
        };
        info!(
            episodes = config.episodes,
            final_epsilon = epsilon,
            success_rate = outcome.success_rate(),
            "q-learning finished"
        );
        Ok(outcome)
    }
}

fn check_state(state: StateId, state_count: usize) -> Result<StateId> {
    if state < state_count {
        Ok(state)
    } else {
        Err(Error::StateOutOfRange { state, state_count })
    }
}

/// Train a fresh engine on `env` with `config`.
pub fn train<E: Environment + ?Sized>(env: &mut E, config: QLearningConfig) -> Result<QLearningOutcome> {
    QLearningEngine::new(config)?.train(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        environment::{ModelEnvironment, TabularModel},
        ports::Outcome,
    };

    fn one_step_model(reward: f64) -> ModelEnvironment {
        let model = TabularModel::new(vec![
            vec![
                vec![Outcome::new(1.0, 0, 0.0, false)],
                vec![Outcome::new(1.0, 1, reward, true)],
            ],
            vec![
                vec![Outcome::new(1.0, 1, 0.0, true)],
                vec![Outcome::new(1.0, 1, 0.0, true)],
            ],
        ])
        .unwrap();
        ModelEnvironment::new(model, 0).unwrap().with_seed(0)
    }

    #[test]
    fn test_config_validation() {
        let base = QLearningConfig::default();
        assert!(base.validate().is_ok());
        assert!(base.clone().with_episodes(0).validate().is_err());
        assert!(base.clone().with_epsilon(1.5).validate().is_err());
        assert!(base.clone().with_epsilon(-0.1).validate().is_err());
        assert!(base.clone().with_epsilon_decay(0.0).validate().is_err());
        assert!(base.clone().with_epsilon_decay(1.1).validate().is_err());
        assert!(base.clone().with_min_epsilon(-0.01).validate().is_err());
        assert!(base.clone().with_gamma(1.01).validate().is_err());
        assert!(base.clone().with_gamma(f64::NAN).validate().is_err());
        assert!(base.clone().with_learning_rate(0.0).validate().is_err());
        assert!(base.clone().with_decay_interval(0).validate().is_err());
    }

    #[test]
    fn test_engine_rejects_invalid_config_before_training() {
        let result = QLearningEngine::new(QLearningConfig::default().with_episodes(0));
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_epsilon_decays_every_interval() {
        let mut env = one_step_model(1.0);
        let config = QLearningConfig::default()
            .with_episodes(250)
            .with_epsilon(0.8)
            .with_epsilon_decay(0.5)
            .with_min_epsilon(0.25)
            .with_seed(3);
        let outcome = train(&mut env, config).unwrap();

        assert_eq!(outcome.episodes[0].epsilon, Some(0.8));
        assert_eq!(outcome.episodes[99].epsilon, Some(0.8));
        assert_eq!(outcome.episodes[100].epsilon, Some(0.4));
        assert_eq!(outcome.episodes[200].epsilon, Some(0.25));
        assert_eq!(outcome.final_epsilon, 0.25);
    }

    #[test]
    fn test_learns_rewarding_action() {
        let mut env = one_step_model(1.0);
        let config = QLearningConfig::default()
            .with_episodes(200)
            .with_epsilon(1.0)
            .with_seed(9);
        let outcome = train(&mut env, config).unwrap();

        assert_eq!(outcome.policy.action(0).unwrap(), 1);
        assert!(outcome.q_table.get(0, 1).unwrap() > outcome.q_table.get(0, 0).unwrap());
        // Terminal rows never receive updates.
        assert_eq!(outcome.q_table.row(1).unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn test_nan_reward_surfaces_as_error() {
        struct NanEnv;

        impl Environment for NanEnv {
            fn state_count(&self) -> usize {
                1
            }

            fn action_count(&self) -> usize {
                1
            }

            fn reset(&mut self) -> Result<StateId> {
                Ok(0)
            }

            fn step(&mut self, _action: ActionId) -> Result<crate::ports::Step> {
                Ok(crate::ports::Step {
                    next_state: 0,
                    reward: f64::NAN,
                    done: true,
                })
            }
        }

        let err = train(&mut NanEnv, QLearningConfig::default().with_seed(1)).unwrap_err();
        assert!(matches!(err, Error::NonFiniteValue { .. }));
    }

    #[test]
    fn test_out_of_range_state_from_environment() {
        struct LostEnv;

        impl Environment for LostEnv {
            fn state_count(&self) -> usize {
                2
            }

            fn action_count(&self) -> usize {
                1
            }

            fn reset(&mut self) -> Result<StateId> {
                Ok(0)
            }

            fn step(&mut self, _action: ActionId) -> Result<crate::ports::Step> {
                Ok(crate::ports::Step {
                    next_state: 5,
                    reward: 0.0,
                    done: true,
                })
            }
        }

        let err = train(&mut LostEnv, QLearningConfig::default().with_seed(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::StateOutOfRange {
                state: 5,
                state_count: 2
            }
        ));
    }
}
