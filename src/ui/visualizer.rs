//! Visualizer session driver
//!
//! Runs prompts through intent extraction and renders through the image
//! model, recording every step as an [`Action`] on the session state.

use crate::catalog::TileCatalog;
use crate::llm::IntentExtractor;
use crate::llm::ParsedPromptResult;
use crate::render::{get_render_options, ImageGenerator, ImageSource, RenderRequest};
use crate::ui::state::{
    reduce, render_target, Action, RenderTarget, VisualizerState, NO_ROOM_PHOTO, TILE_NOT_FOUND,
};
use std::sync::Arc;

/// How a prompt or render request ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The render now shown, as a data URI
    Rendered(String),
    /// User-facing reason nothing was rendered
    Failed(String),
}

pub struct Visualizer {
    extractor: IntentExtractor,
    generator: Arc<dyn ImageGenerator>,
    catalog: Arc<TileCatalog>,
    state: VisualizerState,
}

impl Visualizer {
    pub fn new(
        extractor: IntentExtractor,
        generator: Arc<dyn ImageGenerator>,
        catalog: Arc<TileCatalog>,
    ) -> Self {
        Self {
            extractor,
            generator,
            catalog,
            state: VisualizerState::new(),
        }
    }

    pub fn state(&self) -> &VisualizerState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state = reduce(&self.state, action);
    }

    pub fn upload_room_photo(&mut self, photo: ImageSource) {
        self.dispatch(Action::RoomPhotoUploaded(photo));
    }

    /// Pick a tile from the catalog; unknown ids are ignored
    pub fn select_tile(&mut self, id: &str) -> bool {
        match self.catalog.get(id) {
            Some(tile) => {
                let tile = tile.clone();
                self.dispatch(Action::TileSelected(tile));
                true
            }
            None => false,
        }
    }

    /// Parse a prompt and render the tiles it names
    pub async fn submit_prompt(&mut self, prompt: &str) -> Outcome {
        self.dispatch(Action::PromptSubmitted(prompt.to_string()));

        let intent = match self.extractor.parse_prompt(prompt).await {
            Ok(ParsedPromptResult::ParsedIntent(intent)) => intent,
            Ok(ParsedPromptResult::Error(message)) => {
                self.dispatch(Action::IntentFailed(message.clone()));
                return Outcome::Failed(message);
            }
            Err(e) => {
                tracing::warn!(error = %e, "prompt parsing failed");
                return self.render_failed(e.to_string());
            }
        };

        match render_target(&self.state, &intent.args) {
            Ok(target) => self.visualize(target).await,
            Err(message) => {
                self.dispatch(Action::IntentFailed(message.to_string()));
                Outcome::Failed(message.to_string())
            }
        }
    }

    /// Render the three options for a floor/wall pair and show the first good one
    pub async fn visualize(&mut self, target: RenderTarget) -> Outcome {
        self.dispatch(Action::RenderStarted);

        let Some(room_photo) = self.state.room_photo.clone() else {
            self.dispatch(Action::RenderCancelled(NO_ROOM_PHOTO.to_string()));
            return Outcome::Failed(NO_ROOM_PHOTO.to_string());
        };

        let (floor, wall) = match (
            self.catalog.get(&target.floor_tile_id),
            self.catalog.get(&target.wall_tile_id),
        ) {
            (Some(floor), Some(wall)) => (floor.clone(), wall.clone()),
            _ => return self.render_failed(TILE_NOT_FOUND.to_string()),
        };

        let textures = ImageSource::parse(&floor.image_url)
            .and_then(|f| ImageSource::parse(&wall.image_url).map(|w| (f, w)));
        let (floor_texture, wall_texture) = match textures {
            Ok(textures) => textures,
            Err(e) => return self.render_failed(e.to_string()),
        };

        let mut request = RenderRequest::new(room_photo, floor_texture, wall_texture);
        request.grout_width = target.grout_width;
        request.tile_scale = target.tile_scale;
        request.orientation = target.orientation;

        tracing::info!(floor = %floor.id, wall = %wall.id, "rendering room");
        match get_render_options(self.generator.as_ref(), &request).await {
            Ok(options) => {
                self.dispatch(Action::RenderSucceeded(options));
                match self.state.selected_render.clone() {
                    Some(render) => {
                        self.dispatch(Action::FloorTileSelected(floor.id));
                        self.dispatch(Action::WallTileSelected(wall.id));
                        Outcome::Rendered(render)
                    }
                    None => Outcome::Failed(self.state.error.clone().unwrap_or_default()),
                }
            }
            Err(e) => self.render_failed(e.to_string()),
        }
    }

    fn render_failed(&mut self, message: String) -> Outcome {
        self.dispatch(Action::RenderFailed(message.clone()));
        Outcome::Failed(message)
    }
}
