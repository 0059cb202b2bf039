//! Integration tests for policy replay

mod common;

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use common::{OPEN_LAKE, classic_lake, open_lake, right_then_down_policy};
use tabular_rl::{
    Error,
    adapters::RecordingRenderer,
    environment::{FrozenLake, LakeConfig},
    pipeline::{
        EvaluationConfig, EvaluationPipeline, MetricsObserver, RenderObserver, RewardLogObserver,
        evaluate,
    },
    policy::Policy,
    ports::{Environment, EpisodeSummary, Observer, ValueView},
    q_learning::QTable,
    types::Action,
};

#[test]
fn test_manual_policy_crosses_open_lake_in_six_steps() {
    let mut lake = open_lake();
    let policy = right_then_down_policy();

    let report = evaluate(&mut lake, &policy, 1).unwrap();
    let episode = &report.episodes[0];
    assert_eq!(episode.steps, 6);
    assert_eq!(episode.final_reward, 1.0);
    assert_eq!(episode.total_return, 1.0);
    assert_eq!(lake.position(), Some(15));
}

#[test]
fn test_step_limit_ends_looping_policy() {
    // All-zero Q values pick "left", which bumps into the wall forever.
    let q_table = QTable::new(16, Action::COUNT).unwrap();
    let policy = Policy::from_q_table(&q_table).unwrap();
    let config = LakeConfig::default()
        .with_map(OPEN_LAKE)
        .with_max_steps(Some(10));
    let mut lake = FrozenLake::from_config(&config).unwrap();

    let report = evaluate(&mut lake, &policy, 2).unwrap();
    assert!(report.episodes.iter().all(|e| e.steps == 10));
    assert_eq!(report.final_rewards(), vec![0.0, 0.0]);
}

#[test]
fn test_renderer_sees_every_position() {
    let mut lake = open_lake();
    let policy = right_then_down_policy();
    let recorder = RecordingRenderer::new();

    let mut pipeline = EvaluationPipeline::new(EvaluationConfig::default().with_episodes(2))
        .unwrap()
        .with_observer(Box::new(RenderObserver::new(recorder.clone())));
    pipeline
        .run_episodes(&mut lake, &policy, ValueView::Policy(&policy))
        .unwrap();

    let agents: Vec<_> = recorder.frames().iter().map(|f| f.agent).collect();
    let one_episode = [0, 1, 2, 3, 7, 11, 15].map(Some);
    assert_eq!(agents.len(), 14);
    assert_eq!(&agents[..7], &one_episode);
    assert_eq!(&agents[7..], &one_episode);
}

#[test]
fn test_seeded_slippery_evaluation_repeats() {
    let run = || {
        let mut lake = classic_lake(true).with_seed(17).with_max_steps(Some(100));
        let policy = Policy::new(vec![Action::Down.index(); 16], Action::COUNT).unwrap();
        evaluate(&mut lake, &policy, 25).unwrap()
    };
    assert_eq!(run().episodes, run().episodes);
}

#[test]
fn test_wall_bumping_policy_fails_every_episode() {
    // Row 0 is SFFF: walking right ends against the east wall.
    let mut lake = classic_lake(false).with_max_steps(Some(8));
    let policy = Policy::new(vec![Action::Right.index(); 16], Action::COUNT).unwrap();

    let mut pipeline = EvaluationPipeline::new(EvaluationConfig::default().with_episodes(3))
        .unwrap()
        .with_observer(Box::new(MetricsObserver::new()));
    let report = pipeline
        .run_episodes(&mut lake, &policy, ValueView::Policy(&policy))
        .unwrap();

    assert_eq!(report.successes(), 0);
    assert_eq!(report.mean_steps(), 8.0);
}

#[test]
fn test_rejects_out_of_range_policy_action() {
    let mut lake = open_lake();
    let mut actions = vec![0; 16];
    actions[3] = 6;
    let policy = Policy::new(actions, 8).unwrap();

    assert!(matches!(
        evaluate(&mut lake, &policy, 1),
        Err(Error::ActionOutOfRange {
            action: 6,
            action_count: 4
        })
    ));
}

/// Writer whose bytes stay readable after the observer owning it is gone.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fails once `limit` episodes have finished, ending an endless replay.
struct StopAfter {
    limit: usize,
    finished: Arc<Mutex<usize>>,
}

impl Observer for StopAfter {
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> tabular_rl::Result<()> {
        let mut finished = self.finished.lock().unwrap();
        *finished += 1;
        if *finished >= self.limit {
            return Err(Error::Io {
                operation: "replay".to_string(),
                source: io::Error::new(io::ErrorKind::Interrupted, "stopped"),
            });
        }
        Ok(())
    }
}

#[test]
fn test_run_forever_reports_reward_of_every_episode() {
    let mut lake = open_lake();
    let policy = right_then_down_policy();
    let buffer = SharedBuffer::default();
    let finished = Arc::new(Mutex::new(0));

    let mut pipeline = EvaluationPipeline::new(EvaluationConfig::default())
        .unwrap()
        .with_observer(Box::new(RewardLogObserver::new(buffer.clone())))
        .with_observer(Box::new(StopAfter {
            limit: 4,
            finished: Arc::clone(&finished),
        }));

    let result = pipeline.run_forever(&mut lake, &policy, ValueView::Policy(&policy));
    assert!(matches!(result, Err(Error::Io { .. })));
    assert_eq!(*finished.lock().unwrap(), 4);

    let text = buffer.text();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    for (episode, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!("episode {episode:>4}: reward 1 after 6 steps"));
    }
}
