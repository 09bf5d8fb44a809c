//! Visualizer session state
//!
//! The session is a sequence of immutable snapshots. Every change goes
//! through [`reduce`], which never mutates its input.

use crate::catalog::{Tile, TileCategory};
use crate::llm::ApplyTexturesArgs;
use crate::render::{ImageSource, Orientation, RenderOptions};

pub const NEED_BOTH_TILES: &str = "Please select both a floor and a wall tile.";
pub const NO_ROOM_PHOTO: &str = "Please upload a photo of your room first.";
pub const TILE_NOT_FOUND: &str = "Selected tile not found.";
pub const NO_VALID_IMAGE: &str = "AI failed to generate a valid image. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    System,
}

impl ChatRole {
    fn id_prefix(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
}

/// One snapshot of the visualizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualizerState {
    pub room_photo: Option<ImageSource>,
    pub selected_floor: Option<String>,
    pub selected_wall: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub loading: bool,
    pub error: Option<String>,
    /// Results of the last render, in variant order
    pub render_options: RenderOptions,
    /// The render currently shown over the room photo
    pub selected_render: Option<String>,
}

impl VisualizerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content of the most recent user message
    pub fn current_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    fn push_message(&mut self, role: ChatRole, content: String) {
        // Messages are never removed, so the count keeps ids unique
        let id = format!("{}-{}", role.id_prefix(), self.messages.len() + 1);
        self.messages.push(ChatMessage { id, role, content });
    }

    /// Replace the last user message, or start one
    fn set_prompt(&mut self, content: String) {
        match self.messages.iter_mut().rev().find(|m| m.role == ChatRole::User) {
            Some(message) => message.content = content,
            None => self.push_message(ChatRole::User, content),
        }
    }

    fn fail(&mut self, message: String) {
        self.loading = false;
        self.push_message(ChatRole::System, format!("Error: {}", message));
        self.error = Some(message);
    }
}

/// Everything that can happen to a session
#[derive(Debug, Clone)]
pub enum Action {
    RoomPhotoUploaded(ImageSource),
    /// The prompt box was edited
    PromptEdited(String),
    PromptSubmitted(String),
    /// A tile was picked from the combined selector
    TileSelected(Tile),
    FloorTileSelected(String),
    WallTileSelected(String),
    /// The prompt could not be turned into an intent
    IntentFailed(String),
    RenderStarted,
    RenderSucceeded(RenderOptions),
    RenderFailed(String),
    /// A render that could not start; reported without a chat message
    RenderCancelled(String),
    /// Go back from the render to the room photo
    ResetView,
}

/// Apply one action to a snapshot
pub fn reduce(state: &VisualizerState, action: Action) -> VisualizerState {
    let mut next = state.clone();
    match action {
        Action::RoomPhotoUploaded(photo) => {
            next.room_photo = Some(photo);
            next.selected_render = None;
        }
        Action::PromptEdited(text) => next.set_prompt(text),
        Action::PromptSubmitted(text) => {
            next.push_message(ChatRole::User, text);
            next.loading = true;
            next.error = None;
        }
        Action::TileSelected(tile) => {
            match tile.category() {
                TileCategory::Floor => next.selected_floor = Some(tile.id.clone()),
                TileCategory::Wall => next.selected_wall = Some(tile.id.clone()),
                TileCategory::Unknown => {}
            }
            let prompt = match next.current_prompt() {
                Some(current) => format!("{} {}", current, tile.name),
                None => tile.name.clone(),
            };
            next.set_prompt(prompt.trim().to_string());
        }
        Action::FloorTileSelected(id) => next.selected_floor = Some(id),
        Action::WallTileSelected(id) => next.selected_wall = Some(id),
        Action::IntentFailed(message) => {
            next.loading = false;
            next.push_message(ChatRole::System, message.clone());
            next.error = Some(message);
        }
        Action::RenderStarted => {
            next.loading = true;
            next.error = None;
            next.selected_render = None;
        }
        Action::RenderSucceeded(options) => {
            let render = options.first_valid().map(str::to_string);
            next.render_options = options;
            match render {
                Some(render) => {
                    next.loading = false;
                    next.selected_render = Some(render);
                }
                None => next.fail(NO_VALID_IMAGE.to_string()),
            }
        }
        Action::RenderFailed(message) => next.fail(message),
        Action::RenderCancelled(message) => {
            next.loading = false;
            next.error = Some(message);
        }
        Action::ResetView => next.selected_render = None,
    }
    next
}

/// Tiles and overrides for one render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub floor_tile_id: String,
    pub wall_tile_id: String,
    pub grout_width: Option<f32>,
    pub tile_scale: Option<f32>,
    pub orientation: Option<Orientation>,
}

impl RenderTarget {
    pub fn new(floor_tile_id: impl Into<String>, wall_tile_id: impl Into<String>) -> Self {
        Self {
            floor_tile_id: floor_tile_id.into(),
            wall_tile_id: wall_tile_id.into(),
            grout_width: None,
            tile_scale: None,
            orientation: None,
        }
    }
}

/// Combine an intent with the current selection
///
/// Tiles named in the intent win over the selected ones. Numeric overrides
/// are clamped to the form's ranges.
pub fn render_target(
    state: &VisualizerState,
    args: &ApplyTexturesArgs,
) -> std::result::Result<RenderTarget, &'static str> {
    let floor = args
        .floor_tile_sku
        .clone()
        .or_else(|| state.selected_floor.clone());
    let wall = args
        .wall_tile_sku
        .clone()
        .or_else(|| state.selected_wall.clone());

    match (floor, wall) {
        (Some(floor), Some(wall)) => Ok(RenderTarget {
            floor_tile_id: floor,
            wall_tile_id: wall,
            grout_width: args.grout_width_mm.map(|v| (v as f32).clamp(0.0, 10.0)),
            tile_scale: args
                .scale_meters_per_repeat
                .map(|v| (v as f32).clamp(0.5, 2.0)),
            orientation: args.orientation_deg.map(Orientation::from_degrees),
        }),
        _ => Err(NEED_BOTH_TILES),
    }
}
