pub mod config;
pub mod error;

pub use config::{config, set_config, ModelEndpoint, RenderDefaults, VisionConfig};
pub use error::{Result, VisionError};
