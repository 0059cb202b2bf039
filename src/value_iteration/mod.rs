//! Value iteration
//!
//! Model-based dynamic programming: repeated Bellman optimality sweeps over
//! the full transition table until the largest per-state change in a sweep
//! drops below `theta`.
//!
//! With `gamma = 1` and a reachable reward cycle the sweeps need not
//! converge. Set [`ValueIterationConfig::max_sweeps`] to bound the run; the
//! outcome is then tagged `converged = false` instead of looping forever.

pub mod engine;
pub mod state_values;

pub use engine::{ValueIterationConfig, ValueIterationEngine, ValueIterationOutcome, solve};
pub use state_values::StateValues;
