//! Room renders through a hosted image model
//!
//! A render sends the room photo, the floor texture and the wall texture
//! (in that order) with a text instruction, and gets back one inline image.

pub mod data_uri;
pub mod gemini;
pub mod generator;
pub mod options;
pub mod params;

pub use data_uri::{DataUri, ImageSource};
pub use gemini::GeminiImageClient;
pub use generator::ImageGenerator;
pub use options::{
    get_render_options, is_valid_render, render_instruction, visualize_tile_in_room,
    RenderOptions, RenderRequest,
};
pub use params::{Orientation, RenderParams, RenderVariant, RENDER_VARIANTS};
