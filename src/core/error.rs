use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Tile not found: {0}")]
    TileNotFound(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    #[error("Image generation error: {0}")]
    ImageGenerationError(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VisionError>;
