//! Plain-text grid renderer
//!
//! Draws the lake as a grid of cells. Each cell shows its tile, a `*` where
//! the agent stands and one of:
//! - the state value, preceded by the greedy arrow when a model is attached
//! - the greedy arrow followed by all action values (left, down, right, up)
//! - just the policy arrow

use std::io::{self, Write};

use tracing::warn;

use crate::{
    environment::{LakeMap, TabularModel},
    policy::lookahead_action,
    ports::{Frame, Renderer, ValueView},
    types::{Action, ActionId, StateId},
};

/// Renderer writing text frames to any writer (usually stdout).
pub struct TextRenderer<W: Write + Send> {
    map: LakeMap,
    writer: W,
    lookahead: Option<(TabularModel, f64)>,
}

impl TextRenderer<io::Stdout> {
    /// Render to standard output.
    pub fn stdout(map: LakeMap) -> Self {
        Self::new(map, io::stdout())
    }
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(map: LakeMap, writer: W) -> Self {
        Self {
            map,
            writer,
            lookahead: None,
        }
    }

    /// Show greedy arrows on state-value frames, found by one-step lookahead
    /// through `model` with discount `gamma`.
    pub fn with_lookahead(mut self, model: TabularModel, gamma: f64) -> Self {
        self.lookahead = Some((model, gamma));
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn cell_text(&self, state: StateId, values: ValueView<'_>) -> String {
        match values {
            ValueView::StateValues(v) => {
                let value = match v.get(state) {
                    Ok(value) => format!("{value:>6.2}"),
                    Err(_) => format!("{:>6}", "?"),
                };
                match &self.lookahead {
                    Some((model, gamma)) => {
                        let direction = lookahead_action(model, v, *gamma, state)
                            .map(arrow)
                            .unwrap_or('?');
                        format!("{direction} {value}")
                    }
                    None => value,
                }
            }
            ValueView::ActionValues(q) => match (q.greedy_action(state), q.row(state)) {
                (Ok(action), Ok(row)) => {
                    let values: Vec<String> = row.iter().map(|q| format!("{q:.2}")).collect();
                    format!("{} {}", arrow(action), values.join(" "))
                }
                _ => "?".to_string(),
            },
            ValueView::Policy(p) => match p.action(state) {
                Ok(action) => arrow(action).to_string(),
                Err(_) => "?".to_string(),
            },
        }
    }

    fn write_frame(&mut self, frame: Frame<'_>) -> io::Result<()> {
        let label = match frame.values {
            ValueView::ActionValues(_) => "Q",
            ValueView::StateValues(_) => "V",
            ValueView::Policy(_) => "policy",
        };

        let mut out = String::new();
        out.push_str(label);
        out.push('\n');
        for row in 0..self.map.rows() {
            for col in 0..self.map.cols() {
                let state = self.map.state_at(row, col);
                let tile = self.map.tile(state).map(|t| t.as_char()).unwrap_or('?');
                let marker = if frame.agent == Some(state) { '*' } else { ' ' };
                out.push_str(&format!(
                    "[{tile}{marker}{}] ",
                    self.cell_text(state, frame.values)
                ));
            }
            out.push('\n');
        }

        writeln!(self.writer, "{out}")?;
        self.writer.flush()
    }
}

fn arrow(action: ActionId) -> char {
    Action::from_index(action).map(Action::arrow).unwrap_or('?')
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render(&mut self, frame: Frame<'_>) {
        if let Err(err) = self.write_frame(frame) {
            warn!(%err, "failed to render frame");
        }
    }
}
