//! Renderer port - fire-and-forget display of value tables
//!
//! The engines never depend on a display surface. Whatever draws the grid
//! (terminal text, a window, nothing at all) implements [`Renderer`] and is
//! reached through an observer such as
//! [`RenderObserver`](crate::pipeline::RenderObserver).

use crate::{policy::Policy, q_learning::QTable, types::StateId, value_iteration::StateValues};

/// The value table being displayed.
#[derive(Debug, Clone, Copy)]
pub enum ValueView<'a> {
    /// Per state-action values from Q-learning
    ActionValues(&'a QTable),
    /// Per state values from value iteration
    StateValues(&'a StateValues),
    /// No value table, only the policy being followed
    Policy(&'a Policy),
}

impl ValueView<'_> {
    /// Whether the view holds action values (`Q`) rather than state values (`V`).
    pub fn is_action_value(&self) -> bool {
        matches!(self, ValueView::ActionValues(_))
    }

    pub fn state_count(&self) -> usize {
        match self {
            ValueView::ActionValues(q) => q.state_count(),
            ValueView::StateValues(v) => v.len(),
            ValueView::Policy(p) => p.len(),
        }
    }
}

/// Everything a renderer receives for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Where the agent currently stands, if known
    pub agent: Option<StateId>,
    pub values: ValueView<'a>,
}

impl<'a> Frame<'a> {
    pub fn new(agent: Option<StateId>, values: ValueView<'a>) -> Self {
        Self { agent, values }
    }
}

/// Display collaborator.
///
/// Rendering has no return value the engines consume. Replacing a renderer
/// with [`NoopRenderer`](crate::adapters::NoopRenderer) must not change any
/// learning result.
pub trait Renderer: Send {
    fn render(&mut self, frame: Frame<'_>);
}
