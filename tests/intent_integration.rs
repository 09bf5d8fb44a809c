//! Prompt parsing end to end with a scripted language model

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tile_vision::catalog::TileCatalog;
use tile_vision::command::SynonymTable;
use tile_vision::core::{Result, VisionError};
use tile_vision::llm::{
    IntentExtractor, IntentKind, ParsedPromptResult, ToolCallingModel, ToolInvocation, ToolSpec,
    UNRECOGNIZED_PROMPT,
};

enum Script {
    Calls(Vec<ToolInvocation>),
    Fail(&'static str),
}

/// Replies with a fixed script and records the prompts it was sent
struct ScriptedModel {
    script: Script,
    prompts: Mutex<Vec<String>>,
    tools: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            prompts: Mutex::new(Vec::new()),
            tools: Mutex::new(Vec::new()),
        })
    }

    fn calling(arguments: Value) -> Arc<Self> {
        Self::new(Script::Calls(vec![ToolInvocation::new("apply_textures", arguments)]))
    }
}

#[async_trait]
impl ToolCallingModel for ScriptedModel {
    async fn invoke_tools(
        &self,
        _system: &str,
        user: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolInvocation>> {
        self.prompts.lock().unwrap().push(user.to_string());
        self.tools
            .lock()
            .unwrap()
            .extend(tools.iter().map(|t| t.name.clone()));
        match &self.script {
            Script::Calls(calls) => Ok(calls.clone()),
            Script::Fail(message) => Err(VisionError::LlmError(message.to_string())),
        }
    }
}

fn extractor(model: Arc<ScriptedModel>) -> IntentExtractor {
    IntentExtractor::new(
        model,
        Arc::new(TileCatalog::embedded().unwrap()),
        Arc::new(SynonymTable::default()),
    )
}

#[tokio::test]
async fn test_names_resolve_to_skus() {
    let model = ScriptedModel::calling(json!({
        "floorTileSku": "Calacatta Gold",
        "wallTileSku": "carrara",
        "groutWidthMm": 3
    }));
    let result = extractor(model.clone())
        .parse_prompt("Calacatta Gold on the floor and Carrara on the walls, 3mm grout")
        .await
        .unwrap();

    let intent = result.intent().unwrap();
    assert_eq!(intent.kind, IntentKind::ApplyTextures);
    assert_eq!(intent.args.floor_tile_sku.as_deref(), Some("floor-calacatta-gold"));
    assert_eq!(intent.args.wall_tile_sku.as_deref(), Some("wall-carrara"));
    assert_eq!(intent.args.grout_width_mm, Some(3.0));
    assert_eq!(intent.args.orientation_deg, None);

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Calacatta Gold on the floor"));
    assert!(prompts[0].contains("- Calacatta Gold (SKU: floor-calacatta-gold)"));
    assert_eq!(*model.tools.lock().unwrap(), vec!["apply_textures".to_string()]);
}

#[tokio::test]
async fn test_synonym_reference() {
    let model = ScriptedModel::calling(json!({ "floorTileSku": "oak" }));
    let result = extractor(model).parse_prompt("oak floors please").await.unwrap();
    let intent = result.intent().unwrap();
    assert_eq!(intent.args.floor_tile_sku.as_deref(), Some("floor-walnut-plank"));
    assert_eq!(intent.args.wall_tile_sku, None);
}

#[tokio::test]
async fn test_no_tool_call_asks_to_rephrase() {
    let model = ScriptedModel::new(Script::Calls(vec![]));
    let result = extractor(model).parse_prompt("hello there").await.unwrap();
    assert_eq!(result, ParsedPromptResult::Error(UNRECOGNIZED_PROMPT.into()));

    let model = ScriptedModel::new(Script::Calls(vec![ToolInvocation::new(
        "something_else",
        json!({}),
    )]));
    let result = extractor(model).parse_prompt("hello there").await.unwrap();
    assert_eq!(result.error(), Some(UNRECOGNIZED_PROMPT));
}

#[tokio::test]
async fn test_unknown_tile_is_reported() {
    let model = ScriptedModel::calling(json!({
        "floorTileSku": "Unicorn Onyx",
        "wallTileSku": "carrara"
    }));
    let result = extractor(model).parse_prompt("unicorn onyx floor").await.unwrap();
    assert_eq!(
        result.error(),
        Some("I couldn't find a tile matching 'Unicorn Onyx'.")
    );
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let model = ScriptedModel::new(Script::Fail("connection reset"));
    let err = extractor(model).parse_prompt("marble floor").await.unwrap_err();
    assert!(matches!(err, VisionError::LlmError(_)));
}

#[tokio::test]
async fn test_malformed_arguments_are_typed_errors() {
    let model = ScriptedModel::calling(json!("floor-calacatta-gold"));
    let err = extractor(model).parse_prompt("marble floor").await.unwrap_err();
    assert!(matches!(err, VisionError::InvalidToolArguments(_)));
}

#[tokio::test]
async fn test_result_wire_format() {
    let model = ScriptedModel::calling(json!({ "wallTileSku": "wall-zellige-green" }));
    let result = extractor(model).parse_prompt("green zellige walls").await.unwrap();
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "parsedIntent": {
                "type": "apply_textures",
                "args": { "wallTileSku": "wall-zellige-green" }
            }
        })
    );
}
