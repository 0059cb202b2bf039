//! Tabular Q-learning
//!
//! Q-learning is off-policy temporal difference control: the agent acts
//! ε-greedily but every update bootstraps from the greedy value of the next
//! state, so the table estimates the optimal action values Q*.
//!
//! ## Usage Example
//!
//! ```no_run
//! use tabular_rl::{
//!     environment::{FrozenLake, LakeMap},
//!     q_learning::{QLearningConfig, QLearningEngine},
//! };
//!
//! let mut lake = FrozenLake::new(LakeMap::named("4x4")?, false)?;
//! let config = QLearningConfig::default().with_episodes(2_000).with_seed(7);
//! let outcome = QLearningEngine::new(config)?.train(&mut lake)?;
//! println!("policy: {:?}", outcome.policy.as_slice());
//! # Ok::<(), tabular_rl::Error>(())
//! ```
//!
//! Training stops after the configured number of episodes; there is no
//! convergence test.

pub mod engine;
pub mod q_table;

pub use engine::{QLearningConfig, QLearningEngine, QLearningOutcome, train};
pub use q_table::QTable;
