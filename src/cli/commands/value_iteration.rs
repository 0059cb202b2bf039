//! Value-iteration command - solve the lake from its transition table

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::warn;

use crate::{
    adapters::TextRenderer,
    cli::{
        commands::{
            EvaluationStats, LakeArgs, ReplayArgs, build_lake, load_run_config, render_observer,
            run_evaluation, write_summary,
        },
        output::{policy_grid, print_kv, print_section, print_subsection},
    },
    environment::LakeConfig,
    pipeline::ProgressObserver,
    ports::{TransitionModel, ValueView},
    types::ActionId,
    value_iteration::{StateValues, ValueIterationConfig, ValueIterationEngine},
};

/// Summary file name used when `--summary` names a directory
pub const SUMMARY_FILE_NAME: &str = "value_iteration_summary.json";

#[derive(Parser, Debug)]
#[command(about = "Solve for the optimal policy with value iteration")]
pub struct ValueIterationArgs {
    #[command(flatten)]
    pub lake: LakeArgs,

    #[command(flatten)]
    pub replay: ReplayArgs,

    /// Discount factor
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Stop once the largest change in a sweep falls below this threshold
    #[arg(long)]
    pub theta: Option<f64>,

    /// Give up after this many sweeps
    #[arg(long)]
    pub max_sweeps: Option<usize>,
}

impl ValueIterationArgs {
    fn apply(&self, mut config: ValueIterationConfig) -> ValueIterationConfig {
        if let Some(gamma) = self.gamma {
            config.gamma = gamma;
        }
        if let Some(theta) = self.theta {
            config.theta = theta;
        }
        if self.max_sweeps.is_some() {
            config.max_sweeps = self.max_sweeps;
        }
        config
    }
}

#[derive(Debug, Serialize)]
struct SolverStats<'a> {
    sweeps: usize,
    converged: bool,
    deltas: &'a [f64],
}

#[derive(Debug, Serialize)]
struct ValueIterationSummaryFile<'a> {
    algorithm: &'static str,
    lake: &'a LakeConfig,
    config: &'a ValueIterationConfig,
    solver: SolverStats<'a>,
    evaluation: Option<EvaluationStats>,
    policy: &'a [ActionId],
    state_values: &'a StateValues,
}

pub fn execute(args: ValueIterationArgs) -> Result<()> {
    let run = load_run_config(&args.lake)?;
    let config = args.apply(run.value_iteration.clone());
    let mut lake = build_lake(&run)?;

    print_section("Value iteration on Frozen Lake");
    print_kv("Map", &run.lake.map);
    print_kv("Slippery", &run.lake.slippery.to_string());
    print_kv("States", &TransitionModel::state_count(&lake).to_string());
    print_kv("Gamma", &config.gamma.to_string());
    print_kv("Theta", &config.theta.to_string());

    let mut engine = ValueIterationEngine::new(config.clone())?;
    if args.replay.progress {
        engine = engine.with_observer(Box::new(ProgressObserver::new()));
    }
    if args.replay.render {
        let renderer = TextRenderer::stdout(lake.map().clone());
        engine = engine.with_observer(render_observer(renderer, args.replay.frame_delay()));
    }

    let outcome = engine.solve(&lake)?;
    if !outcome.converged {
        warn!(
            sweeps = outcome.sweeps,
            "reporting values from an unconverged run"
        );
    }

    print_subsection("Solver");
    print_kv("Sweeps", &outcome.sweeps.to_string());
    print_kv("Converged", &outcome.converged.to_string());
    if let Some(delta) = outcome.deltas.last() {
        print_kv("Last delta", &format!("{delta:.6}"));
    }
    print_kv(
        "Start value",
        &format!("{:.4}", outcome.values[lake.map().start_state()]),
    );

    print_subsection("Greedy policy");
    for row in policy_grid(lake.map(), &outcome.policy) {
        println!("  {row}");
    }

    let renderer = TextRenderer::stdout(lake.map().clone())
        .with_lookahead(lake.model().clone(), config.gamma);
    let evaluation = run_evaluation(
        &mut lake,
        &outcome.policy,
        ValueView::StateValues(&outcome.values),
        renderer,
        &run.evaluation,
        &args.replay,
    )?;

    if let Some(raw) = &args.replay.summary {
        let summary = ValueIterationSummaryFile {
            algorithm: "value-iteration",
            lake: &run.lake,
            config: &config,
            solver: SolverStats {
                sweeps: outcome.sweeps,
                converged: outcome.converged,
                deltas: &outcome.deltas,
            },
            evaluation,
            policy: outcome.policy.as_slice(),
            state_values: &outcome.values,
        };
        write_summary(raw, SUMMARY_FILE_NAME, &summary)?;
    }

    Ok(())
}
