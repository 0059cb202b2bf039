//! Identifier types shared by environments, engines and policies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a discrete state in `[0, state_count)`.
pub type StateId = usize;

/// Index of a discrete action in `[0, action_count)`.
pub type ActionId = usize;

/// Movement directions on a grid world.
///
/// The discriminant order (left, down, right, up) is the action index used by
/// every value table, so it must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Left = 0,
    Down = 1,
    Right = 2,
    Up = 3,
}

impl Action {
    /// All actions in index order.
    pub const ALL: [Action; 4] = [Action::Left, Action::Down, Action::Right, Action::Up];

    /// Number of grid actions.
    pub const COUNT: usize = 4;

    /// Convert an action index back into a direction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ActionOutOfRange`] for indices >= 4.
    pub fn from_index(index: ActionId) -> Result<Self, crate::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(crate::Error::ActionOutOfRange {
                action: index,
                action_count: Self::COUNT,
            })
    }

    /// Action index.
    pub fn index(self) -> ActionId {
        self as ActionId
    }

    /// Row and column offsets of the move.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Action::Left => (0, -1),
            Action::Down => (1, 0),
            Action::Right => (0, 1),
            Action::Up => (-1, 0),
        }
    }

    /// The two directions perpendicular to this one, in the order
    /// (counter-clockwise, clockwise) of the action ring.
    pub fn perpendicular(self) -> [Action; 2] {
        let idx = self.index();
        [
            Self::ALL[(idx + Self::COUNT - 1) % Self::COUNT],
            Self::ALL[(idx + 1) % Self::COUNT],
        ]
    }

    /// Single character arrow used by text renderers.
    pub fn arrow(self) -> char {
        match self {
            Action::Left => '←',
            Action::Down => '↓',
            Action::Right => '→',
            Action::Up => '↑',
        }
    }
}

impl From<Action> for ActionId {
    fn from(action: Action) -> Self {
        action.index()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Left => "left",
            Action::Down => "down",
            Action::Right => "right",
            Action::Up => "up",
        };
        f.write_str(name)
    }
}
