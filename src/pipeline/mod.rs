//! Evaluation pipeline and observer implementations
//!
//! This module provides:
//! - Replaying a learned (or hand-written) policy
//! - Observers for progress bars, metrics, JSONL export and rendering

pub mod evaluation;
pub mod observers;

pub use evaluation::{EvaluationConfig, EvaluationPipeline, EvaluationReport, evaluate};
// Re-export observer implementations (adapters)
pub use observers::{
    EpisodeObservation, JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver,
    RenderObserver, RewardLogObserver,
};

pub use crate::ports::Observer;
