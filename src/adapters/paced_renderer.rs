//! Fixed-delay pacing around another renderer

use std::{thread, time::Duration};

use crate::ports::{Frame, Renderer};

/// Sleeps for a fixed delay after every frame of the wrapped renderer.
///
/// This is the only place in the crate that blocks; a zero delay behaves
/// like fast-forward.
#[derive(Debug, Clone)]
pub struct PacedRenderer<R: Renderer> {
    inner: R,
    delay: Duration,
}

impl<R: Renderer> PacedRenderer<R> {
    pub fn new(inner: R, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Renderer> Renderer for PacedRenderer<R> {
    fn render(&mut self, frame: Frame<'_>) {
        self.inner.render(frame);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::RecordingRenderer, policy::Policy, ports::ValueView};

    #[test]
    fn test_paced_renderer_forwards_frames() {
        let recorder = RecordingRenderer::new();
        let mut paced = PacedRenderer::new(recorder.clone(), Duration::from_millis(1));
        let policy = Policy::new(vec![0, 1], 4).unwrap();

        paced.render(Frame::new(Some(1), ValueView::Policy(&policy)));

        let frames = recorder.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].agent, Some(1));
    }
}
