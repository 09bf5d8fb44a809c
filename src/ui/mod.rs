//! Visualizer session: state snapshots, reducer and driver

pub mod state;
pub mod visualizer;

pub use state::{
    reduce, render_target, Action, ChatMessage, ChatRole, RenderTarget, VisualizerState,
};
pub use visualizer::{Outcome, Visualizer};
