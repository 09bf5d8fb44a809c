//! Application configuration
//!
//! Values start from the defaults below, can be overridden by a TOML file,
//! and finally by environment variables (API keys never live in the file).

use crate::command::synonyms::{SynonymEntry, SynonymTable};
use crate::core::error::{Result, VisionError};
use crate::render::params::Orientation;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default endpoint for intent extraction
pub const DEFAULT_LLM_URL: &str = "https://api.anthropic.com/v1/messages";
/// Default model for intent extraction
pub const DEFAULT_LLM_MODEL: &str = "claude-3-haiku-20240307";
/// Default base URL for image generation (Gemini models endpoint)
pub const DEFAULT_IMAGE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Default image-capable model
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// A hosted model endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelEndpoint {
    pub api_url: String,
    pub model: String,
    /// Only ever populated from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Render parameters used when the user has not chosen any
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Grout width in pixels (0 to 10)
    pub grout_width: f32,
    /// Tile scale relative to the room (0.5 to 2)
    pub tile_scale: f32,
    pub orientation: Orientation,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            grout_width: 2.0,
            tile_scale: 1.0,
            orientation: Orientation::Horizontal,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Language model used for prompt intent extraction
    pub llm: ModelEndpoint,
    /// Image model used for renders
    pub image: ModelEndpoint,
    /// Upper bound on a single model call, in seconds
    pub request_timeout_secs: u64,
    /// Tile catalog file. The embedded catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Replaces the default synonym table when present
    pub synonyms: Option<Vec<SynonymEntry>>,
    pub render: RenderDefaults,
}

impl ModelEndpoint {
    fn new(api_url: &str, model: &str) -> Self {
        Self {
            api_url: api_url.into(),
            model: model.into(),
            api_key: None,
        }
    }

    /// Fill fields a partial config table left blank
    fn fill_blanks(&mut self, api_url: &str, model: &str) {
        if self.api_url.is_empty() {
            self.api_url = api_url.into();
        }
        if self.model.is_empty() {
            self.model = model.into();
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            llm: ModelEndpoint::new(DEFAULT_LLM_URL, DEFAULT_LLM_MODEL),
            image: ModelEndpoint::new(DEFAULT_IMAGE_URL, DEFAULT_IMAGE_MODEL),
            request_timeout_secs: 120,
            catalog_path: None,
            synonyms: None,
            render: RenderDefaults::default(),
        }
    }
}

impl VisionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| VisionError::ConfigError(e.to_string()))?;
        config.llm.fill_blanks(DEFAULT_LLM_URL, DEFAULT_LLM_MODEL);
        config.image.fill_blanks(DEFAULT_IMAGE_URL, DEFAULT_IMAGE_MODEL);
        Ok(config)
    }

    /// Load a config file, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Synonym table from the config, or the built-in one
    pub fn synonym_table(&self) -> SynonymTable {
        match &self.synonyms {
            Some(entries) => SynonymTable::from_entries(entries.clone()),
            None => SynonymTable::default(),
        }
    }

    /// Apply environment variable overrides
    ///
    /// LLM_API_KEY, LLM_API_URL, LLM_MODEL, IMAGE_API_KEY, IMAGE_API_URL,
    /// IMAGE_MODEL. The image key falls back to the LLM key only when the
    /// LLM is also served by Gemini.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = var("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Some(model) = var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = var("IMAGE_API_KEY") {
            self.image.api_key = Some(key);
        } else if self.image.api_key.is_none() && is_gemini_url(&self.llm.api_url) {
            self.image.api_key = self.llm.api_key.clone();
        }
        if let Some(url) = var("IMAGE_API_URL") {
            self.image.api_url = url;
        }
        if let Some(model) = var("IMAGE_MODEL") {
            self.image.model = model;
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(VisionError::ConfigError(
                "request_timeout_secs must be positive".into(),
            ));
        }

        if !(0.0..=10.0).contains(&self.render.grout_width) {
            return Err(VisionError::ConfigError(format!(
                "render.grout_width ({}) must be within 0..=10",
                self.render.grout_width
            )));
        }

        if !(0.5..=2.0).contains(&self.render.tile_scale) {
            return Err(VisionError::ConfigError(format!(
                "render.tile_scale ({}) must be within 0.5..=2",
                self.render.tile_scale
            )));
        }

        if self.llm.model.is_empty() || self.image.model.is_empty() {
            return Err(VisionError::ConfigError("model names must not be empty".into()));
        }

        if let Some(entries) = &self.synonyms {
            if entries.iter().any(|e| e.canonical.trim().is_empty()) {
                return Err(VisionError::ConfigError(
                    "synonym canonical keywords must not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

fn is_gemini_url(url: &str) -> bool {
    url.contains("generativelanguage.googleapis.com")
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<VisionConfig> = OnceLock::new();

/// Get the global config (initializes with defaults if not set)
pub fn config() -> &'static VisionConfig {
    CONFIG.get_or_init(VisionConfig::default)
}

/// Set the global config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: VisionConfig) -> std::result::Result<(), VisionConfig> {
    CONFIG.set(config)
}
