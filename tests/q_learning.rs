//! Integration tests for the Q-learning engine

mod common;

use common::{classic_lake, single_state_env};
use tabular_rl::{
    adapters::{NoopRenderer, RecordingRenderer},
    pipeline::{JsonlObserver, RenderObserver, evaluate},
    q_learning::{QLearningConfig, QLearningEngine, train},
    types::Action,
};

fn seeded_config(seed: u64) -> QLearningConfig {
    QLearningConfig::default()
        .with_episodes(300)
        .with_seed(seed)
}

#[test]
fn test_seeded_runs_are_bit_identical() {
    let run = || {
        let mut lake = classic_lake(true).with_seed(5).with_max_steps(Some(100));
        train(&mut lake, seeded_config(11)).unwrap()
    };
    let first = run();
    let second = run();

    assert_eq!(first.q_table, second.q_table);
    assert_eq!(first.episodes, second.episodes);
    assert_eq!(first.policy, second.policy);
    assert_eq!(first.final_epsilon, second.final_epsilon);
}

#[test]
fn test_zero_reward_single_state_keeps_q_at_zero() {
    let mut env = single_state_env();
    let outcome = train(&mut env, QLearningConfig::default().with_episodes(50).with_seed(1)).unwrap();

    assert!(outcome.q_table.is_zero());
    assert_eq!(outcome.policy.as_slice(), &[0]);
    assert!(outcome.episodes.iter().all(|e| e.steps == 1));
}

#[test]
fn test_policy_actions_are_in_range() {
    let mut lake = classic_lake(true).with_seed(2).with_max_steps(Some(100));
    let outcome = train(&mut lake, seeded_config(3)).unwrap();

    assert_eq!(outcome.policy.len(), 16);
    assert!(
        outcome
            .policy
            .as_slice()
            .iter()
            .all(|&a| a < Action::COUNT)
    );
}

#[test]
fn test_epsilon_decays_every_interval_down_to_floor() {
    let mut lake = classic_lake(false).with_max_steps(Some(100));
    let config = QLearningConfig::default()
        .with_episodes(250)
        .with_epsilon(0.8)
        .with_epsilon_decay(0.5)
        .with_min_epsilon(0.3)
        .with_seed(4);
    let outcome = train(&mut lake, config).unwrap();

    assert_eq!(outcome.episodes[0].epsilon, Some(0.8));
    assert_eq!(outcome.episodes[99].epsilon, Some(0.8));
    assert_eq!(outcome.episodes[100].epsilon, Some(0.4));
    assert_eq!(outcome.episodes[200].epsilon, Some(0.3));
    assert_eq!(outcome.final_epsilon, 0.3);
}

#[test]
fn test_learns_to_cross_deterministic_lake() {
    let mut lake = classic_lake(false).with_max_steps(Some(100));
    let config = QLearningConfig::default()
        .with_episodes(3000)
        .with_epsilon(1.0)
        .with_epsilon_decay(0.5)
        .with_min_epsilon(0.1)
        .with_seed(2024);
    let outcome = train(&mut lake, config).unwrap();

    let report = evaluate(&mut lake, &outcome.policy, 1).unwrap();
    assert_eq!(report.episodes[0].final_reward, 1.0);
    assert_eq!(report.episodes[0].steps, 6);
}

#[test]
fn test_renderer_does_not_change_learning() {
    let plain = {
        let mut lake = classic_lake(true).with_seed(9).with_max_steps(Some(100));
        train(&mut lake, seeded_config(21)).unwrap()
    };

    let recorder = RecordingRenderer::new();
    let rendered = {
        let mut lake = classic_lake(true).with_seed(9).with_max_steps(Some(100));
        QLearningEngine::new(seeded_config(21))
            .unwrap()
            .with_observer(Box::new(RenderObserver::new(recorder.clone())))
            .with_observer(Box::new(RenderObserver::new(NoopRenderer)))
            .train(&mut lake)
            .unwrap()
    };

    assert_eq!(plain.q_table, rendered.q_table);

    // One frame at every episode start plus one per step.
    let steps: usize = rendered.episodes.iter().map(|e| e.steps).sum();
    let frames = recorder.frames();
    assert_eq!(frames.len(), rendered.episodes.len() + steps);
    assert!(frames.iter().all(|f| f.is_action_value && f.state_count == 16));
}

#[test]
fn test_jsonl_observer_logs_every_episode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episodes.jsonl");

    let mut lake = classic_lake(false).with_max_steps(Some(50));
    let outcome = QLearningEngine::new(seeded_config(8).with_episodes(20))
        .unwrap()
        .with_observer(Box::new(JsonlObserver::new(&path).unwrap()))
        .train(&mut lake)
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 20);
    for (line, summary) in lines.iter().zip(&outcome.episodes) {
        assert_eq!(line["steps"], summary.steps);
        assert_eq!(line["transitions"].as_array().unwrap().len(), summary.steps);
    }
}
