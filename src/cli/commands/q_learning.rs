//! Q-learning command - learn action values by exploring the lake

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use crate::{
    adapters::TextRenderer,
    cli::{
        commands::{
            EvaluationStats, LakeArgs, ReplayArgs, build_lake, load_run_config, render_observer,
            run_evaluation, write_summary,
        },
        output::{format_rate, policy_grid, print_kv, print_section, print_subsection},
    },
    environment::LakeConfig,
    pipeline::{JsonlObserver, ProgressObserver},
    ports::{Environment, ValueView},
    q_learning::{QLearningConfig, QLearningEngine, QTable},
    types::ActionId,
};

/// Summary file name used when `--summary` names a directory
pub const SUMMARY_FILE_NAME: &str = "q_learning_summary.json";

#[derive(Parser, Debug)]
#[command(about = "Learn a policy with tabular Q-learning")]
pub struct QLearningArgs {
    #[command(flatten)]
    pub lake: LakeArgs,

    #[command(flatten)]
    pub replay: ReplayArgs,

    /// Number of training episodes
    #[arg(long, short = 'n')]
    pub episodes: Option<usize>,

    /// Initial exploration rate
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Multiplier applied to epsilon at every decay
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Lower bound for epsilon
    #[arg(long)]
    pub min_epsilon: Option<f64>,

    /// Episodes between epsilon decays
    #[arg(long)]
    pub decay_interval: Option<usize>,

    /// Discount factor
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Learning rate
    #[arg(long, alias = "lr")]
    pub learning_rate: Option<f64>,
}

impl QLearningArgs {
    fn apply(&self, mut config: QLearningConfig) -> QLearningConfig {
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(decay) = self.epsilon_decay {
            config.epsilon_decay = decay;
        }
        if let Some(min_epsilon) = self.min_epsilon {
            config.min_epsilon = min_epsilon;
        }
        if let Some(interval) = self.decay_interval {
            config.decay_interval = interval;
        }
        if let Some(gamma) = self.gamma {
            config.gamma = gamma;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        config
    }
}

#[derive(Debug, Serialize)]
struct TrainingStats {
    episodes: usize,
    successes: usize,
    success_rate: f64,
    final_epsilon: f64,
}

#[derive(Debug, Serialize)]
struct QLearningSummaryFile<'a> {
    algorithm: &'static str,
    lake: &'a LakeConfig,
    config: &'a QLearningConfig,
    training: TrainingStats,
    evaluation: Option<EvaluationStats>,
    policy: &'a [ActionId],
    q_values: &'a QTable,
}

pub fn execute(args: QLearningArgs) -> Result<()> {
    let run = load_run_config(&args.lake)?;
    let config = args.apply(run.q_learning.clone());
    let mut lake = build_lake(&run)?;

    print_section("Q-learning on Frozen Lake");
    print_kv("Map", &run.lake.map);
    print_kv("Slippery", &run.lake.slippery.to_string());
    print_kv("States", &Environment::state_count(&lake).to_string());
    print_kv("Episodes", &config.episodes.to_string());
    print_kv("Gamma", &config.gamma.to_string());
    print_kv("Learning rate", &config.learning_rate.to_string());
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut engine = QLearningEngine::new(config.clone())?;
    if args.replay.progress {
        engine = engine.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.replay.observations {
        engine = engine.with_observer(Box::new(JsonlObserver::new(path)?));
    }
    if args.replay.render {
        let renderer = TextRenderer::stdout(lake.map().clone());
        engine = engine.with_observer(render_observer(renderer, args.replay.frame_delay()));
    }

    let outcome = engine.train(&mut lake)?;
    let successes = outcome
        .episodes
        .iter()
        .filter(|e| e.final_reward > 0.0)
        .count();

    print_subsection("Training");
    print_kv("Reached goal", &successes.to_string());
    print_kv("Success rate", &format_rate(outcome.success_rate()));
    print_kv("Final epsilon", &format!("{:.4}", outcome.final_epsilon));

    print_subsection("Greedy policy");
    for row in policy_grid(lake.map(), &outcome.policy) {
        println!("  {row}");
    }

    let renderer = TextRenderer::stdout(lake.map().clone());
    let evaluation = run_evaluation(
        &mut lake,
        &outcome.policy,
        ValueView::ActionValues(&outcome.q_table),
        renderer,
        &run.evaluation,
        &args.replay,
    )?;

    if let Some(raw) = &args.replay.summary {
        let summary = QLearningSummaryFile {
            algorithm: "q-learning",
            lake: &run.lake,
            config: &config,
            training: TrainingStats {
                episodes: outcome.episodes.len(),
                successes,
                success_rate: outcome.success_rate(),
                final_epsilon: outcome.final_epsilon,
            },
            evaluation,
            policy: outcome.policy.as_slice(),
            q_values: &outcome.q_table,
        };
        write_summary(raw, SUMMARY_FILE_NAME, &summary)?;
    }

    Ok(())
}
