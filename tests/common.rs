//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use tabular_rl::{
    environment::{FrozenLake, LakeMap, ModelEnvironment, TabularModel},
    policy::Policy,
    ports::Outcome,
    types::Action,
};

/// 4×4 lake without holes; the goal is six moves from the start.
pub const OPEN_LAKE: &str = "SFFF,FFFF,FFFF,FFFG";

pub fn open_lake() -> FrozenLake {
    let map: LakeMap = OPEN_LAKE.parse().unwrap();
    FrozenLake::new(map, false).unwrap()
}

pub fn classic_lake(slippery: bool) -> FrozenLake {
    FrozenLake::new(LakeMap::named("4x4").unwrap(), slippery).unwrap()
}

/// Right along the top row, then down the last column.
pub fn right_then_down_policy() -> Policy {
    let right = Action::Right.index();
    let down = Action::Down.index();
    let actions = (0..16)
        .map(|state| if state % 4 == 3 { down } else { right })
        .collect();
    Policy::new(actions, Action::COUNT).unwrap()
}

/// Two states; action 1 in state 0 earns 1 and moves to the absorbing state 1.
pub fn two_state_model() -> TabularModel {
    TabularModel::new(vec![
        vec![
            vec![Outcome::new(1.0, 0, 0.0, false)],
            vec![Outcome::new(1.0, 1, 1.0, true)],
        ],
        vec![
            vec![Outcome::new(1.0, 1, 0.0, true)],
            vec![Outcome::new(1.0, 1, 0.0, true)],
        ],
    ])
    .unwrap()
}

/// One state, one action, no reward, every step terminal.
pub fn single_state_env() -> ModelEnvironment {
    let model = TabularModel::new(vec![vec![vec![Outcome::new(1.0, 0, 0.0, true)]]]).unwrap();
    ModelEnvironment::new(model, 0).unwrap()
}
