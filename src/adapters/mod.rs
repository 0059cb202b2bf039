//! Adapters implementing the renderer port.
//!
//! Display concerns live here so the engines stay headless. Pacing (sleeping
//! between frames) is confined to [`PacedRenderer`].

pub mod paced_renderer;
pub mod recording_renderer;
pub mod text_renderer;

pub use paced_renderer::PacedRenderer;
pub use recording_renderer::{RecordedFrame, RecordingRenderer};
pub use text_renderer::TextRenderer;

use crate::ports::{Frame, Renderer};

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&mut self, _frame: Frame<'_>) {}
}
