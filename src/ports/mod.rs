//! Ports (trait boundaries) for external collaborators.
//!
//! The learning engines only see environments, observers and renderers through
//! these traits. Concrete environments live in [`crate::environment`] and
//! concrete observers/renderers in [`crate::pipeline`] and [`crate::adapters`].

pub mod environment;
pub mod observer;
pub mod renderer;

pub use environment::{Environment, Outcome, Step, TransitionModel};
pub use observer::{EpisodeSummary, Observer, StepRecord};
pub use renderer::{Frame, Renderer, ValueView};
