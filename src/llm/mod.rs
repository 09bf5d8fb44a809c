//! Language-model side of prompt intent resolution

pub mod client;
pub mod context;
pub mod gemini;
pub mod parser;
pub mod tools;

pub use client::{ApiFormat, LlmClient};
pub use context::CatalogContext;
pub use parser::{
    apply_textures_tool, unmatched_tile_message, ApplyTexturesArgs, IntentExtractor, IntentKind,
    ParsedIntent, ParsedPromptResult, UNRECOGNIZED_PROMPT,
};
pub use tools::{ToolCallingModel, ToolInvocation, ToolSpec};
