//! Error types for the tabular-rl crate

use thiserror::Error;

/// Main error type for the tabular-rl crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("action {action} is out of range (environment has {action_count} actions)")]
    ActionOutOfRange { action: usize, action_count: usize },

    #[error("state {state} is out of range (environment has {state_count} states)")]
    StateOutOfRange { state: usize, state_count: usize },

    #[error("invalid transition model at state {state}, action {action}: {reason}")]
    InvalidTransitionModel {
        state: usize,
        action: usize,
        reason: String,
    },

    #[error("invalid transition model shape: {reason}")]
    InvalidModelShape { reason: String },

    #[error("non-finite {quantity} ({value}) at state {state}")]
    NonFiniteValue {
        quantity: &'static str,
        value: f64,
        state: usize,
    },

    #[error("invalid map: {reason}")]
    InvalidMap { reason: String },

    #[error("unknown map name '{name}'. Expected one of: {expected}")]
    UnknownMap { name: String, expected: String },

    #[error("policy covers {policy_len} states but environment has {state_count}")]
    PolicyShapeMismatch {
        policy_len: usize,
        state_count: usize,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
