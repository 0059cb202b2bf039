//! Tabular reinforcement learning on Frozen Lake
//!
//! This crate provides:
//! - The Frozen Lake grid world, deterministic or slippery, with its full
//!   transition table
//! - Q-learning (model-free) and value iteration (model-based) engines
//! - Greedy policy extraction from action values or state values
//! - Policy replay with observers for progress, metrics, JSONL export and
//!   rendering
//!
//! ```no_run
//! use tabular_rl::{
//!     environment::{FrozenLake, LakeMap},
//!     pipeline::evaluate,
//!     value_iteration::{ValueIterationConfig, solve},
//! };
//!
//! let mut lake = FrozenLake::new(LakeMap::named("4x4")?, true)?;
//! let outcome = solve(&lake, ValueIterationConfig::default().with_theta(1e-8))?;
//! let report = evaluate(&mut lake, &outcome.policy, 100)?;
//! println!("success rate {:.2}", report.success_rate());
//! # Ok::<(), tabular_rl::Error>(())
//! ```

pub mod adapters;
pub mod cli;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod q_learning;
pub mod types;
pub mod value_iteration;

pub use environment::{FrozenLake, LakeConfig, LakeMap};
pub use error::{Error, Result};
pub use policy::Policy;
pub use q_learning::{QLearningConfig, QTable};
pub use types::{Action, ActionId, StateId};
pub use value_iteration::{StateValues, ValueIterationConfig};
