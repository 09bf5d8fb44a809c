//! Image generation seam

use crate::core::error::Result;
use crate::render::data_uri::{DataUri, ImageSource};
use async_trait::async_trait;

/// A hosted model that edits images from an instruction
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Send the input images in order, followed by the instruction
    ///
    /// Returns `None` when the model answered without an image.
    async fn generate(&self, images: &[ImageSource], instruction: &str)
        -> Result<Option<DataUri>>;
}
