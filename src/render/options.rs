//! Render requests: the three concurrent render options and single renders

use crate::core::error::{Result, VisionError};
use crate::render::data_uri::{DataUri, ImageSource};
use crate::render::generator::ImageGenerator;
use crate::render::params::{Orientation, RenderParams, RenderVariant, RENDER_VARIANTS};
use futures::future::join_all;
use serde::Serialize;

/// Inputs for a render: the room photo, both textures and optional overrides
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub room_photo: ImageSource,
    pub floor_texture: ImageSource,
    pub wall_texture: ImageSource,
    pub grout_width: Option<f32>,
    pub orientation: Option<Orientation>,
    pub tile_scale: Option<f32>,
}

impl RenderRequest {
    pub fn new(room_photo: ImageSource, floor_texture: ImageSource, wall_texture: ImageSource) -> Self {
        Self {
            room_photo,
            floor_texture,
            wall_texture,
            grout_width: None,
            orientation: None,
            tile_scale: None,
        }
    }

    /// Images in the order the model receives them
    pub fn images(&self) -> [ImageSource; 3] {
        [
            self.room_photo.clone(),
            self.floor_texture.clone(),
            self.wall_texture.clone(),
        ]
    }

    /// Parameters for one variant of this request
    pub fn variant_params(&self, variant: &RenderVariant) -> RenderParams {
        variant.params(self.grout_width, self.orientation, self.tile_scale)
    }

    /// Parameters for a single render, filling unset fields from `defaults`
    pub fn params_or(&self, defaults: RenderParams) -> RenderParams {
        RenderParams {
            grout_width: self.grout_width.unwrap_or(defaults.grout_width),
            orientation: self.orientation.unwrap_or(defaults.orientation),
            tile_scale: self.tile_scale.unwrap_or(defaults.tile_scale),
        }
    }
}

/// Instruction text sent after the three images
pub fn render_instruction(params: &RenderParams) -> String {
    format!(
        "The first image is a photo of a room. The second image is a floor tile texture \
         and the third image is a wall tile texture.\n\
         Apply the floor tile texture to the floor of the room with a grout width of {g}px, \
         a {o} tile orientation, and a tile scale of {s}.\n\
         Apply the wall tile texture to the walls of the room with a grout width of {g}px, \
         a {o} tile orientation, and a tile scale of {s}.\n\
         Keep the room's layout, furniture and lighting unchanged.",
        g = params.grout_width,
        o = params.orientation,
        s = params.tile_scale,
    )
}

/// A finished render is an inline image
pub fn is_valid_render(render: &str) -> bool {
    render.starts_with("data:image")
}

/// Render results in variant order; a failed variant is an empty string
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderOptions {
    pub options: Vec<String>,
}

impl RenderOptions {
    pub fn first_valid(&self) -> Option<&str> {
        self.options
            .iter()
            .map(String::as_str)
            .find(|r| is_valid_render(r))
    }

    pub fn valid(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .map(String::as_str)
            .filter(|r| is_valid_render(r))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Request all three render variants concurrently
///
/// Out-of-range overrides are rejected before any call is made. Variants
/// that fail or come back without an image contribute an empty string.
/// Only when every variant fails is the first error returned.
pub async fn get_render_options(
    generator: &dyn ImageGenerator,
    request: &RenderRequest,
) -> Result<RenderOptions> {
    let mut instructions = Vec::with_capacity(RENDER_VARIANTS.len());
    for variant in &RENDER_VARIANTS {
        let params = request.variant_params(variant);
        params.validate()?;
        instructions.push(render_instruction(&params));
    }

    let images = request.images();
    let images = &images;

    let calls = instructions
        .iter()
        .map(|instruction| async move { generator.generate(images, instruction).await });
    let results = join_all(calls).await;

    let mut options = Vec::with_capacity(results.len());
    let mut first_error = None;
    let mut failures = 0;
    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(Some(uri)) => options.push(uri.to_string()),
            Ok(None) => {
                tracing::warn!(variant = i, "render variant produced no image");
                options.push(String::new());
            }
            Err(e) => {
                tracing::warn!(variant = i, error = %e, "render variant failed");
                failures += 1;
                if first_error.is_none() {
                    first_error = Some(e);
                }
                options.push(String::new());
            }
        }
    }

    if failures == options.len() {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    let options = RenderOptions { options };
    tracing::info!(
        valid = options.valid().count(),
        total = options.len(),
        "render options ready"
    );
    Ok(options)
}

/// A single render with explicit parameters
pub async fn visualize_tile_in_room(
    generator: &dyn ImageGenerator,
    request: &RenderRequest,
    params: &RenderParams,
) -> Result<DataUri> {
    params.validate()?;
    let instruction = render_instruction(params);
    generator
        .generate(&request.images(), &instruction)
        .await?
        .ok_or_else(|| VisionError::ImageGenerationError("model returned no image".into()))
}
