//! Concrete environments
//!
//! - [`TabularModel`]: a validated, explicit transition table
//! - [`ModelEnvironment`]: an episodic environment that samples from a table
//! - [`FrozenLake`]: the grid world, built on top of the two above

pub mod frozen_lake;
pub mod map;
pub mod model;

pub use frozen_lake::{FrozenLake, LakeConfig};
pub use map::{LakeMap, Tile};
pub use model::{ModelEnvironment, PROBABILITY_TOLERANCE, TabularModel, validate_model};
