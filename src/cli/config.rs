//! Run configuration shared by CLI commands
//!
//! A run file is a JSON object with optional `lake`, `q_learning`,
//! `value_iteration` and `evaluation` sections. Missing sections and fields
//! take their defaults; command-line flags override whatever the file sets.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, environment::LakeConfig, pipeline::EvaluationConfig,
    q_learning::QLearningConfig, value_iteration::ValueIterationConfig,
};

/// Step limit applied by the CLI when neither the file nor the flags set one.
///
/// A greedy policy can walk into a wall forever on a deterministic lake.
pub const DEFAULT_STEP_LIMIT: usize = 200;

/// Complete configuration of one CLI run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub lake: LakeConfig,
    pub q_learning: QLearningConfig,
    pub value_iteration: ValueIterationConfig,
    pub evaluation: EvaluationConfig,
}

impl RunConfig {
    /// Read a run configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.lake.validate()?;
        self.q_learning.validate()?;
        self.value_iteration.validate()?;
        self.evaluation.validate()
    }
}
