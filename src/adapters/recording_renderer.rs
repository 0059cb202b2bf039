//! In-memory renderer for tests.
//!
//! Records a small description of every frame instead of drawing it.

use std::sync::{Arc, Mutex};

use crate::{
    ports::{Frame, Renderer},
    types::StateId,
};

/// What a recorded frame showed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedFrame {
    pub agent: Option<StateId>,
    pub is_action_value: bool,
    pub state_count: usize,
}

/// Renderer that stores frame descriptions in shared memory.
///
/// Clones share the same frame list, so a test can keep one handle while an
/// observer owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<RecordedFrame>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all frames rendered so far.
    pub fn frames(&self) -> Vec<RecordedFrame> {
        self.frames
            .lock()
            .map(|frames| frames.clone())
            .unwrap_or_default()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: Frame<'_>) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(RecordedFrame {
                agent: frame.agent,
                is_action_value: frame.values.is_action_value(),
                state_count: frame.values.state_count(),
            });
        }
    }
}
