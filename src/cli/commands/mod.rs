//! CLI commands and the arguments they share

pub mod q_learning;
pub mod value_iteration;

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::to_writer_pretty;
use tracing::debug;

use crate::{
    adapters::{PacedRenderer, TextRenderer},
    cli::{
        config::{DEFAULT_STEP_LIMIT, RunConfig},
        output::{format_rate, print_episode_rewards, print_kv, print_subsection},
    },
    environment::FrozenLake,
    pipeline::{
        EvaluationConfig, EvaluationPipeline, EvaluationReport, RenderObserver, RewardLogObserver,
    },
    policy::Policy,
    ports::{Observer, ValueView},
};

/// Lake and run-file arguments
#[derive(Args, Debug, Clone, Default)]
pub struct LakeArgs {
    /// JSON run configuration; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Map name (4x4, 8x8) or rows separated by commas (e.g. SFFF,FHFH,FFFH,HFFG)
    #[arg(long, short = 'm')]
    pub map: Option<String>,

    /// Make moves slip to perpendicular directions
    #[arg(long)]
    pub slippery: bool,

    /// Force the end of an episode after this many steps
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Replay, display and export arguments
#[derive(Args, Debug, Clone, Default)]
pub struct ReplayArgs {
    /// Number of evaluation episodes after learning
    #[arg(long, short = 'e')]
    pub evaluate: Option<usize>,

    /// Skip the evaluation run
    #[arg(long, conflicts_with_all = ["evaluate", "watch"])]
    pub skip_evaluation: bool,

    /// Replay the learned policy until interrupted, rendering every step
    #[arg(long)]
    pub watch: bool,

    /// Render the grid on every step and sweep
    #[arg(long)]
    pub render: bool,

    /// Pause after each rendered frame, in milliseconds
    /// [default: 500 with --watch, 0 otherwise]
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Optional file for JSONL episode observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

/// Frame delay used by `--watch` unless `--delay-ms` is given
pub const WATCH_DELAY_MS: u64 = 500;

impl ReplayArgs {
    /// Pause applied after each rendered frame.
    pub fn frame_delay(&self) -> Duration {
        let default = if self.watch { WATCH_DELAY_MS } else { 0 };
        Duration::from_millis(self.delay_ms.unwrap_or(default))
    }
}

/// Load the run file (if any) and apply the lake flags on top of it.
pub(crate) fn load_run_config(args: &LakeArgs) -> Result<RunConfig> {
    let mut run = RunConfig::load_or_default(args.config.as_deref()).with_context(|| {
        format!(
            "failed to load run configuration {}",
            args.config.as_deref().unwrap_or(Path::new("")).display()
        )
    })?;

    if let Some(map) = &args.map {
        run.lake.map = map.clone();
    }
    if args.slippery {
        run.lake.slippery = true;
    }
    if args.max_steps.is_some() {
        run.lake.max_steps = args.max_steps;
    }
    if run.lake.max_steps.is_none() {
        run.lake.max_steps = Some(DEFAULT_STEP_LIMIT);
    }
    if let Some(seed) = args.seed {
        run.lake.seed = Some(seed.wrapping_add(1));
        run.q_learning.seed = Some(seed);
    }

    debug!(?run, "resolved run configuration");
    Ok(run)
}

pub(crate) fn build_lake(run: &RunConfig) -> Result<FrozenLake> {
    FrozenLake::from_config(&run.lake)
        .with_context(|| format!("invalid lake configuration (map {:?})", run.lake.map))
}

/// Observer drawing frames to stdout, paced by `delay`.
pub(crate) fn render_observer(
    renderer: TextRenderer<io::Stdout>,
    delay: Duration,
) -> Box<dyn Observer> {
    Box::new(RenderObserver::new(PacedRenderer::new(renderer, delay)))
}

/// Evaluation statistics written to summary files
#[derive(Debug, Clone, Serialize)]
pub(crate) struct EvaluationStats {
    pub episodes: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub mean_steps: f64,
    pub final_rewards: Vec<f64>,
}

impl From<&EvaluationReport> for EvaluationStats {
    fn from(report: &EvaluationReport) -> Self {
        Self {
            episodes: report.episodes.len(),
            successes: report.successes(),
            success_rate: report.success_rate(),
            mean_steps: report.mean_steps(),
            final_rewards: report.final_rewards(),
        }
    }
}

/// Replay `policy` as the replay flags ask.
///
/// Returns `None` when evaluation is skipped. With `--watch` this only
/// returns on error.
pub(crate) fn run_evaluation(
    lake: &mut FrozenLake,
    policy: &Policy,
    values: ValueView<'_>,
    renderer: TextRenderer<io::Stdout>,
    config: &EvaluationConfig,
    args: &ReplayArgs,
) -> Result<Option<EvaluationStats>> {
    if args.skip_evaluation {
        return Ok(None);
    }

    let mut config = config.clone();
    if let Some(episodes) = args.evaluate {
        config = config.with_episodes(episodes);
    }

    let mut pipeline = EvaluationPipeline::new(config)?;
    if args.render || args.watch {
        pipeline = pipeline.with_observer(render_observer(renderer, args.frame_delay()));
    }

    if args.watch {
        print_subsection("Watching policy (Ctrl-C to stop)");
        pipeline = pipeline.with_observer(Box::new(RewardLogObserver::stdout()));
        match pipeline.run_forever(lake, policy, values)? {}
    }

    let report = pipeline.run_episodes(lake, policy, values)?;

    print_subsection("Evaluation");
    if args.render {
        print_episode_rewards(&report.episodes);
    }
    print_kv("Episodes", &report.episodes.len().to_string());
    print_kv("Reached goal", &report.successes().to_string());
    print_kv("Success rate", &format_rate(report.success_rate()));
    print_kv("Mean steps", &format!("{:.2}", report.mean_steps()));

    Ok(Some(EvaluationStats::from(&report)))
}

/// Normalize a `--summary` argument into a JSON file path.
///
/// A trailing separator (or no file name) means a directory, in which case
/// `default_name` is used inside it; any other extension becomes `.json`.
pub(crate) fn sanitize_summary_path(raw: &Path, default_name: &str) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push(default_name);
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

/// Write `summary` as pretty JSON, creating parent directories.
pub(crate) fn write_summary<T: Serialize>(
    raw: &Path,
    default_name: &str,
    summary: &T,
) -> Result<PathBuf> {
    let path = sanitize_summary_path(raw, default_name);
    if path != raw {
        println!(
            "Summary path normalized: {} → {}",
            raw.display(),
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    to_writer_pretty(file, summary)
        .with_context(|| format!("failed to write summary {}", path.display()))?;

    print_kv("Summary", &path.display().to_string());
    Ok(path)
}
