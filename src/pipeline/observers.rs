//! Observer implementations for training, solving and evaluation
//!
//! Observers allow composable data collection without coupling the engines to
//! specific output formats.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::{EpisodeSummary, Frame, Observer, Renderer, StepRecord, ValueView},
    types::StateId,
    value_iteration::StateValues,
};

/// Complete observation of one episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeObservation {
    #[serde(flatten)]
    pub summary: EpisodeSummary,
    /// Transitions of the episode, in order
    pub transitions: Vec<StepRecord>,
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    successes: usize,
    failures: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            successes: 0,
            failures: 0,
        }
    }

    fn message(&self) -> String {
        format!("goal:{} fail:{}", self.successes, self.failures)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = if total_episodes == 0 {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} sweep {pos} ({msg})")
                    .map_err(|e| crate::Error::ProgressBarTemplate {
                        message: e.to_string(),
                    })?,
            );
            pb
        } else {
            let pb = ProgressBar::new(total_episodes as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                    .map_err(|e| crate::Error::ProgressBarTemplate {
                        message: e.to_string(),
                    })?
                    .progress_chars("=>-"),
            );
            pb
        };
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if summary.final_reward > 0.0 {
            self.successes += 1;
        } else {
            self.failures += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_sweep(&mut self, sweep: usize, last_delta: Option<f64>, _values: &StateValues) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(sweep as u64);
            if let Some(delta) = last_delta {
                pb.set_message(format!("delta {delta:.6}"));
            }
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks episode statistics
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    episodes: usize,
    successes: usize,
    step_counts: Vec<usize>,
    total_return: f64,
    sweeps: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current success rate
    pub fn success_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.successes as f64 / self.episodes as f64
        }
    }

    /// Get average episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.step_counts.is_empty() {
            0.0
        } else {
            self.step_counts.iter().sum::<usize>() as f64 / self.step_counts.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes,
            successes: self.successes,
            success_rate: self.success_rate(),
            avg_episode_length: self.avg_episode_length(),
            mean_return: if self.episodes == 0 {
                0.0
            } else {
                self.total_return / self.episodes as f64
            },
            sweeps: self.sweeps,
        }
    }
}

/// Summary of collected metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub avg_episode_length: f64,
    pub mean_return: f64,
    pub sweeps: usize,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episodes += 1;
        if summary.final_reward > 0.0 {
            self.successes += 1;
        }
        self.step_counts.push(summary.steps);
        self.total_return += summary.total_return;
        Ok(())
    }

    fn on_sweep(&mut self, _sweep: usize, _last_delta: Option<f64>, _values: &StateValues) -> Result<()> {
        self.sweeps += 1;
        Ok(())
    }
}

/// JSONL observer - Exports episodes to JSON Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_steps: Vec<StepRecord>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| crate::Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            current_steps: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(
        &mut self,
        _episode: usize,
        _start_state: StateId,
        _values: ValueView<'_>,
    ) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, record: &StepRecord, _values: ValueView<'_>) -> Result<()> {
        self.current_steps.push(*record);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let observation = EpisodeObservation {
            summary: *summary,
            transitions: std::mem::take(&mut self.current_steps),
        };

        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Reward observer - writes one line per finished episode
///
/// Each line carries the final-step reward, which is what a live replay
/// reports to the user.
pub struct RewardLogObserver<W: Write + Send> {
    writer: W,
}

impl RewardLogObserver<io::Stdout> {
    /// Report to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> RewardLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Observer for RewardLogObserver<W> {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        writeln!(
            self.writer,
            "episode {:>4}: reward {} after {} steps",
            summary.episode, summary.final_reward, summary.steps
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Render observer - forwards every step and sweep to a [`Renderer`]
///
/// Reproduces a live display: a frame when an episode starts, one after each
/// step with the agent on its new cell, and one per value-iteration sweep.
pub struct RenderObserver<R: Renderer> {
    renderer: R,
}

impl<R: Renderer> RenderObserver<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn into_inner(self) -> R {
        self.renderer
    }
}

impl<R: Renderer> Observer for RenderObserver<R> {
    fn on_episode_start(
        &mut self,
        _episode: usize,
        start_state: StateId,
        values: ValueView<'_>,
    ) -> Result<()> {
        self.renderer.render(Frame::new(Some(start_state), values));
        Ok(())
    }

    fn on_step(&mut self, record: &StepRecord, values: ValueView<'_>) -> Result<()> {
        self.renderer
            .render(Frame::new(Some(record.next_state), values));
        Ok(())
    }

    fn on_sweep(&mut self, _sweep: usize, _last_delta: Option<f64>, values: &StateValues) -> Result<()> {
        self.renderer
            .render(Frame::new(None, ValueView::StateValues(values)));
        Ok(())
    }
}
