//! Frozen Lake grid world
//!
//! The agent starts on `S` and walks on frozen tiles `F` until it falls into a
//! hole `H` (reward 0) or reaches the goal `G` (reward 1). On a slippery lake
//! the intended move only happens a third of the time; otherwise the agent
//! slides to one of the two perpendicular directions.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    environment::{
        map::{LakeMap, Tile},
        model::{ModelEnvironment, TabularModel},
    },
    ports::{Environment, Outcome, Step, TransitionModel},
    types::{Action, ActionId, StateId},
};

/// Configuration for building a [`FrozenLake`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeConfig {
    /// Built-in map name (`4x4`, `8x8`) or inline rows separated by commas
    pub map: String,

    /// Whether moves slip to perpendicular directions
    pub slippery: bool,

    /// Force the end of an episode after this many steps
    pub max_steps: Option<usize>,

    /// Seed for the transition sampler
    pub seed: Option<u64>,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            map: "4x4".to_string(),
            slippery: false,
            max_steps: None,
            seed: None,
        }
    }
}

impl LakeConfig {
    pub fn with_map(mut self, map: impl Into<String>) -> Self {
        self.map = map.into();
        self
    }

    pub fn with_slippery(mut self, slippery: bool) -> Self {
        self.slippery = slippery;
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject a zero step limit.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == Some(0) {
            return Err(Error::config("max_steps must be at least 1"));
        }
        Ok(())
    }
}

/// The Frozen Lake environment.
#[derive(Debug, Clone)]
pub struct FrozenLake {
    map: LakeMap,
    slippery: bool,
    inner: ModelEnvironment,
}

impl FrozenLake {
    /// Build the lake and its transition table.
    pub fn new(map: LakeMap, slippery: bool) -> Result<Self> {
        let model = build_model(&map, slippery)?;
        let inner = ModelEnvironment::new(model, map.start_state())?;
        Ok(Self {
            map,
            slippery,
            inner,
        })
    }

    /// Build a lake from configuration.
    pub fn from_config(config: &LakeConfig) -> Result<Self> {
        config.validate()?;
        let map: LakeMap = config.map.parse()?;
        let mut lake = Self::new(map, config.slippery)?.with_max_steps(config.max_steps);
        if let Some(seed) = config.seed {
            lake = lake.with_seed(seed);
        }
        Ok(lake)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.inner = self.inner.with_seed(seed);
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.inner = self.inner.with_max_steps(max_steps);
        self
    }

    pub fn map(&self) -> &LakeMap {
        &self.map
    }

    pub fn is_slippery(&self) -> bool {
        self.slippery
    }

    pub fn model(&self) -> &TabularModel {
        self.inner.model()
    }
}

fn build_model(map: &LakeMap, slippery: bool) -> Result<TabularModel> {
    let mut transitions = Vec::with_capacity(map.state_count());

    for state in 0..map.state_count() {
        let tile = map.tile(state)?;
        let mut per_action = Vec::with_capacity(Action::COUNT);

        for action in Action::ALL {
            let outcomes = if tile.is_terminal() {
                vec![Outcome::new(1.0, state, 0.0, true)]
            } else if slippery {
                let [ccw, cw] = action.perpendicular();
                [ccw, action, cw]
                    .into_iter()
                    .map(|direction| move_outcome(map, state, direction, 1.0 / 3.0))
                    .collect::<Result<Vec<_>>>()?
            } else {
                vec![move_outcome(map, state, action, 1.0)?]
            };
            per_action.push(outcomes);
        }

        transitions.push(per_action);
    }

    TabularModel::new(transitions)
}

fn move_outcome(
    map: &LakeMap,
    state: StateId,
    direction: Action,
    probability: f64,
) -> Result<Outcome> {
    let next_state = map.neighbor(state, direction);
    let next_tile = map.tile(next_state)?;
    let reward = if next_tile == Tile::Goal {
        1.0
    } else {
        0.0
    };
    Ok(Outcome::new(
        probability,
        next_state,
        reward,
        next_tile.is_terminal(),
    ))
}

impl Environment for FrozenLake {
    fn state_count(&self) -> usize {
        self.map.state_count()
    }

    fn action_count(&self) -> usize {
        Action::COUNT
    }

    fn reset(&mut self) -> Result<StateId> {
        self.inner.reset()
    }

    fn step(&mut self, action: ActionId) -> Result<Step> {
        self.inner.step(action)
    }

    fn position(&self) -> Option<StateId> {
        Some(self.inner.state())
    }
}

impl TransitionModel for FrozenLake {
    fn state_count(&self) -> usize {
        self.map.state_count()
    }

    fn action_count(&self) -> usize {
        Action::COUNT
    }

    fn outcomes(&self, state: StateId, action: ActionId) -> Result<&[Outcome]> {
        self.inner.outcomes(state, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_lake_moves() {
        let mut lake = FrozenLake::new(LakeMap::named("4x4").unwrap(), false).unwrap();
        assert_eq!(lake.reset().unwrap(), 0);

        let step = lake.step(Action::Right.index()).unwrap();
        assert_eq!(step, Step {
            next_state: 1,
            reward: 0.0,
            done: false
        });

        let step = lake.step(Action::Down.index()).unwrap();
        assert_eq!(step.next_state, 5);
        assert!(step.done, "state 5 is a hole");
        assert_eq!(step.reward, 0.0);
    }

    #[test]
    fn test_goal_pays_one() {
        let map = LakeMap::parse(&["SG"]).unwrap();
        let mut lake = FrozenLake::new(map, false).unwrap();
        lake.reset().unwrap();
        let step = lake.step(Action::Right.index()).unwrap();
        assert_eq!(step.next_state, 1);
        assert_eq!(step.reward, 1.0);
        assert!(step.done);
    }

    #[test]
    fn test_terminal_states_absorb() {
        let lake = FrozenLake::new(LakeMap::named("4x4").unwrap(), true).unwrap();
        for action in 0..4 {
            let outcomes = lake.outcomes(15, action).unwrap();
            assert_eq!(outcomes, &[Outcome::new(1.0, 15, 0.0, true)]);
        }
    }

    #[test]
    fn test_slippery_outcomes_split_three_ways() {
        let lake = FrozenLake::new(LakeMap::named("4x4").unwrap(), true).unwrap();
        let outcomes = lake.outcomes(0, Action::Down.index()).unwrap();
        let next: Vec<_> = outcomes.iter().map(|o| o.next_state).collect();
        // left (wall), down, right
        assert_eq!(next, vec![0, 4, 1]);
        for outcome in outcomes {
            assert!((outcome.probability - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_from_config_applies_step_limit() {
        let config = LakeConfig::default()
            .with_map("SFFG")
            .with_max_steps(Some(2))
            .with_seed(5);
        let mut lake = FrozenLake::from_config(&config).unwrap();
        lake.reset().unwrap();
        assert!(!lake.step(Action::Left.index()).unwrap().done);
        assert!(lake.step(Action::Left.index()).unwrap().done);
    }

    #[test]
    fn test_config_rejects_zero_step_limit() {
        let config = LakeConfig::default().with_max_steps(Some(0));
        assert!(matches!(
            FrozenLake::from_config(&config),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
