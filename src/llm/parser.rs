//! Parse natural language tile requests into structured intents
//!
//! The LLM is offered a single tool, `apply_textures`. Its arguments are
//! decoded into a typed struct at this boundary, and any tile reference it
//! returns (SKU or name) is normalized to a canonical catalog id by the
//! tile resolver.

use crate::catalog::TileCatalog;
use crate::command::resolver::TileResolver;
use crate::command::synonyms::SynonymTable;
use crate::core::error::{Result, VisionError};
use crate::llm::context::CatalogContext;
use crate::llm::tools::{ToolCallingModel, ToolSpec};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Name of the only tool offered to the model
pub const APPLY_TEXTURES: &str = "apply_textures";

/// Returned when the model did not invoke the tool
pub const UNRECOGNIZED_PROMPT: &str =
    "I'm sorry, I couldn't understand that request. Could you please rephrase it?";

/// Arguments of the `apply_textures` operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTexturesArgs {
    /// SKU (or, from the model, possibly a name) of the floor tile
    #[serde(
        default,
        deserialize_with = "tile_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub floor_tile_sku: Option<String>,
    /// SKU (or, from the model, possibly a name) of the wall tile
    #[serde(
        default,
        deserialize_with = "tile_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub wall_tile_sku: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub grout_width_mm: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub orientation_deg: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub scale_meters_per_repeat: Option<f64>,
}

impl ApplyTexturesArgs {
    /// Decode and check raw tool arguments
    pub fn from_tool_arguments(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(VisionError::InvalidToolArguments(format!(
                "expected an object, got {}",
                value
            )));
        }

        let args: Self = serde_json::from_value(value.clone())
            .map_err(|e| VisionError::InvalidToolArguments(format!("{} - arguments: {}", e, value)))?;
        args.validate()?;
        Ok(args)
    }

    fn validate(&self) -> Result<()> {
        let checks = [
            ("groutWidthMm", self.grout_width_mm, false),
            ("orientationDeg", self.orientation_deg, true),
            ("scaleMetersPerRepeat", self.scale_meters_per_repeat, false),
        ];
        for (field, value, allow_negative) in checks {
            let Some(v) = value else { continue };
            if !v.is_finite() {
                return Err(VisionError::InvalidToolArguments(format!(
                    "{} must be finite",
                    field
                )));
            }
            if !allow_negative && v < 0.0 {
                return Err(VisionError::InvalidToolArguments(format!(
                    "{} must not be negative ({})",
                    field, v
                )));
            }
        }
        if self.scale_meters_per_repeat == Some(0.0) {
            return Err(VisionError::InvalidToolArguments(
                "scaleMetersPerRepeat must be positive".into(),
            ));
        }
        Ok(())
    }

    /// JSON schema offered to the model
    pub fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "floorTileSku": {
                    "type": "string",
                    "description": "The SKU of the tile to apply to the floor."
                },
                "wallTileSku": {
                    "type": "string",
                    "description": "The SKU of the tile to apply to the wall."
                },
                "groutWidthMm": {
                    "type": "number",
                    "description": "The width of the grout in millimeters."
                },
                "orientationDeg": {
                    "type": "number",
                    "description": "The orientation of the tiles in degrees."
                },
                "scaleMetersPerRepeat": {
                    "type": "number",
                    "description": "The scale of the tile pattern in meters per repeat."
                }
            }
        })
    }
}

/// A blank tile reference means the model left the surface unchanged
fn tile_reference<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Numbers sometimes come back quoted ("3", " 1.5 ")
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got \"{}\"", s)))
        }
    }
}

/// The `apply_textures` tool definition
pub fn apply_textures_tool() -> ToolSpec {
    ToolSpec {
        name: APPLY_TEXTURES.into(),
        description: "Apply tiles to room surfaces".into(),
        input_schema: ApplyTexturesArgs::schema(),
    }
}

/// Kind of visualization action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentKind {
    #[serde(rename = "apply_textures")]
    ApplyTextures,
}

/// A resolved intent; tile fields hold canonical catalog ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIntent {
    #[serde(rename = "type")]
    pub kind: IntentKind,
    pub args: ApplyTexturesArgs,
}

/// Outcome of prompt parsing
///
/// Serializes as `{"parsedIntent": {...}}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParsedPromptResult {
    ParsedIntent(ParsedIntent),
    /// User-facing message
    Error(String),
}

impl ParsedPromptResult {
    pub fn intent(&self) -> Option<&ParsedIntent> {
        match self {
            Self::ParsedIntent(intent) => Some(intent),
            Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::ParsedIntent(_) => None,
            Self::Error(message) => Some(message),
        }
    }
}

/// Message for a tile reference that matched nothing
pub fn unmatched_tile_message(text: &str) -> String {
    format!("I couldn't find a tile matching '{}'.", text)
}

/// Replace raw floor/wall references with canonical ids
///
/// Floor is resolved before wall; the first miss ends resolution and no
/// intent is returned.
pub fn resolve_tile_references(
    resolver: &TileResolver<'_>,
    mut args: ApplyTexturesArgs,
) -> ParsedPromptResult {
    for field in [&mut args.floor_tile_sku, &mut args.wall_tile_sku] {
        if let Some(text) = field.as_mut() {
            match resolver.find_tile(text) {
                Some(tile) => *text = tile.id.clone(),
                None => return ParsedPromptResult::Error(unmatched_tile_message(text)),
            }
        }
    }

    ParsedPromptResult::ParsedIntent(ParsedIntent {
        kind: IntentKind::ApplyTextures,
        args,
    })
}

/// Turns free-text prompts into resolved `apply_textures` intents
#[derive(Clone)]
pub struct IntentExtractor {
    model: Arc<dyn ToolCallingModel>,
    catalog: Arc<TileCatalog>,
    synonyms: Arc<SynonymTable>,
}

impl IntentExtractor {
    pub fn new(
        model: Arc<dyn ToolCallingModel>,
        catalog: Arc<TileCatalog>,
        synonyms: Arc<SynonymTable>,
    ) -> Self {
        Self {
            model,
            catalog,
            synonyms,
        }
    }

    /// Parse a prompt into an intent or a user-facing error
    ///
    /// `Err` is reserved for transport failures and malformed tool
    /// arguments; everything the user can fix by rephrasing comes back as
    /// `ParsedPromptResult::Error`.
    pub async fn parse_prompt(&self, prompt: &str) -> Result<ParsedPromptResult> {
        let context = CatalogContext::from_catalog(&self.catalog);
        let user_prompt = context.task_prompt(prompt);
        let tool = apply_textures_tool();

        let invocations = self
            .model
            .invoke_tools(PARSE_SYSTEM_PROMPT, &user_prompt, std::slice::from_ref(&tool))
            .await?;

        let Some(call) = invocations.into_iter().find(|c| c.name == APPLY_TEXTURES) else {
            tracing::info!(prompt = %prompt, "model made no apply_textures call");
            return Ok(ParsedPromptResult::Error(UNRECOGNIZED_PROMPT.into()));
        };

        let args = ApplyTexturesArgs::from_tool_arguments(&call.arguments)?;
        let resolver = TileResolver::new(&self.catalog, &self.synonyms);
        let result = resolve_tile_references(&resolver, args);

        match &result {
            ParsedPromptResult::ParsedIntent(intent) => tracing::info!(
                floor = ?intent.args.floor_tile_sku,
                wall = ?intent.args.wall_tile_sku,
                "prompt resolved"
            ),
            ParsedPromptResult::Error(message) => tracing::info!(%message, "prompt not resolved"),
        }

        Ok(result)
    }
}

/// System prompt for intent extraction
const PARSE_SYSTEM_PROMPT: &str = "You are an expert interior design assistant. Your goal is to understand the user's request and translate it into a structured command for our tile visualization tool.
Only call the 'apply_textures' tool. Leave out any field the user did not ask for.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Tile;

    fn catalog() -> TileCatalog {
        TileCatalog::from_tiles(vec![
            Tile::new("floor-calacatta-gold", "Calacatta Gold", "marble gold veins", ""),
            Tile::new("wall-carrara", "Carrara", "white marble", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_args_from_camel_case() {
        let args = ApplyTexturesArgs::from_tool_arguments(&json!({
            "floorTileSku": "floor-calacatta-gold",
            "groutWidthMm": 3,
            "orientationDeg": 45.0,
            "scaleMetersPerRepeat": "0.6"
        }))
        .unwrap();

        assert_eq!(args.floor_tile_sku.as_deref(), Some("floor-calacatta-gold"));
        assert_eq!(args.wall_tile_sku, None);
        assert_eq!(args.grout_width_mm, Some(3.0));
        assert_eq!(args.orientation_deg, Some(45.0));
        assert_eq!(args.scale_meters_per_repeat, Some(0.6));
    }

    #[test]
    fn test_args_reject_wrong_shape() {
        assert!(matches!(
            ApplyTexturesArgs::from_tool_arguments(&json!("floor")),
            Err(VisionError::InvalidToolArguments(_))
        ));
        assert!(matches!(
            ApplyTexturesArgs::from_tool_arguments(&json!({"floorTileSku": 12})),
            Err(VisionError::InvalidToolArguments(_))
        ));
        assert!(matches!(
            ApplyTexturesArgs::from_tool_arguments(&json!({"groutWidthMm": "wide"})),
            Err(VisionError::InvalidToolArguments(_))
        ));
    }

    #[test]
    fn test_args_reject_bad_ranges() {
        assert!(ApplyTexturesArgs::from_tool_arguments(&json!({"groutWidthMm": -2})).is_err());
        assert!(
            ApplyTexturesArgs::from_tool_arguments(&json!({"scaleMetersPerRepeat": 0})).is_err()
        );
        assert!(ApplyTexturesArgs::from_tool_arguments(&json!({"orientationDeg": -90})).is_ok());
    }

    #[test]
    fn test_args_null_and_blank_numbers() {
        let args = ApplyTexturesArgs::from_tool_arguments(&json!({
            "groutWidthMm": null,
            "orientationDeg": " "
        }))
        .unwrap();
        assert_eq!(args, ApplyTexturesArgs::default());
    }

    #[test]
    fn test_args_blank_tile_references() {
        let args = ApplyTexturesArgs::from_tool_arguments(&json!({
            "floorTileSku": "",
            "wallTileSku": "  ",
            "groutWidthMm": 2
        }))
        .unwrap();
        assert_eq!(args.floor_tile_sku, None);
        assert_eq!(args.wall_tile_sku, None);

        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);
        assert!(resolve_tile_references(&resolver, args).intent().is_some());
    }

    #[test]
    fn test_args_serialize_camel_case() {
        let args = ApplyTexturesArgs {
            wall_tile_sku: Some("wall-carrara".into()),
            grout_width_mm: Some(2.0),
            ..Default::default()
        };
        let value = serde_json::to_value(&args).unwrap();
        assert_eq!(value, json!({"wallTileSku": "wall-carrara", "groutWidthMm": 2.0}));
    }

    #[test]
    fn test_resolve_names_to_ids() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        let args = ApplyTexturesArgs {
            floor_tile_sku: Some("Calacatta Gold".into()),
            wall_tile_sku: Some("carrara".into()),
            grout_width_mm: Some(2.0),
            ..Default::default()
        };

        let result = resolve_tile_references(&resolver, args);
        let intent = result.intent().unwrap();
        assert_eq!(intent.kind, IntentKind::ApplyTextures);
        assert_eq!(intent.args.floor_tile_sku.as_deref(), Some("floor-calacatta-gold"));
        assert_eq!(intent.args.wall_tile_sku.as_deref(), Some("wall-carrara"));
        assert_eq!(intent.args.grout_width_mm, Some(2.0));
    }

    #[test]
    fn test_floor_miss_stops_before_wall() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        let args = ApplyTexturesArgs {
            floor_tile_sku: Some("Purple Velvet".into()),
            wall_tile_sku: Some("Also Missing".into()),
            ..Default::default()
        };

        let result = resolve_tile_references(&resolver, args);
        assert!(result.intent().is_none());
        assert_eq!(
            result.error(),
            Some("I couldn't find a tile matching 'Purple Velvet'.")
        );
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let catalog = catalog();
        let synonyms = SynonymTable::default();
        let resolver = TileResolver::new(&catalog, &synonyms);

        let result = resolve_tile_references(&resolver, ApplyTexturesArgs::default());
        assert_eq!(result.intent().unwrap().args, ApplyTexturesArgs::default());
    }

    #[test]
    fn test_result_wire_shape() {
        let ok = ParsedPromptResult::ParsedIntent(ParsedIntent {
            kind: IntentKind::ApplyTextures,
            args: ApplyTexturesArgs {
                floor_tile_sku: Some("floor-calacatta-gold".into()),
                ..Default::default()
            },
        });
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"parsedIntent": {"type": "apply_textures", "args": {"floorTileSku": "floor-calacatta-gold"}}})
        );

        let err = ParsedPromptResult::Error(UNRECOGNIZED_PROMPT.into());
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"error": UNRECOGNIZED_PROMPT})
        );
    }

    #[test]
    fn test_tool_definition() {
        let tool = apply_textures_tool();
        assert_eq!(tool.name, "apply_textures");
        assert_eq!(tool.input_schema["type"], "object");
        assert!(tool.input_schema["properties"]["scaleMetersPerRepeat"].is_object());
    }
}
