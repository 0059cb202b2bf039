//! Command-line interface for the Frozen Lake solvers
//!
//! Commands resolve a [`config::RunConfig`] from an optional JSON file plus
//! flags, run one of the engines, print the greedy policy and replay it.

pub mod commands;
pub mod config;
pub mod output;
