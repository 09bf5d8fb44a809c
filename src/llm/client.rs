//! Async LLM client for prompt intent extraction
//!
//! A model-agnostic HTTP client that offers tools to hosted LLMs and
//! returns the invocations they make. Supports Anthropic, OpenAI-compatible
//! (DeepSeek, OpenAI, etc) and Gemini APIs.

use crate::core::config::VisionConfig;
use crate::core::error::{Result, VisionError};
use crate::llm::gemini::{
    self, Content, FunctionDeclaration, GeminiTool, GenerateContentRequest, Part,
};
use crate::llm::tools::{ToolCallingModel, ToolInvocation, ToolSpec};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
    Gemini,
}

/// Async LLM client for making tool-calling API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self::with_http_client(Client::new(), api_key, api_url, model)
    }

    fn with_http_client(client: Client, api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client,
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("generativelanguage.googleapis.com") {
            ApiFormat::Gemini
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    /// Create a client from the `llm` section of the config
    ///
    /// Requires an API key (LLM_API_KEY).
    pub fn from_config(config: &VisionConfig) -> Result<Self> {
        let api_key = config
            .llm
            .api_key
            .clone()
            .ok_or_else(|| VisionError::LlmError("LLM_API_KEY not set".into()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VisionError::LlmError(e.to_string()))?;

        Ok(Self::with_http_client(
            client,
            api_key,
            config.llm.api_url.clone(),
            config.llm.model.clone(),
        ))
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn invoke_anthropic(
        &self,
        system: &str,
        user: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolInvocation>> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
            tools: tools
                .iter()
                .map(|t| AnthropicTool {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    input_schema: t.input_schema.clone(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| VisionError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VisionError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| VisionError::LlmError(e.to_string()))?;

        Ok(completion
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { name, input } => Some(ToolInvocation::new(name, input)),
                _ => None,
            })
            .collect())
    }

    async fn invoke_openai(
        &self,
        system: &str,
        user: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolInvocation>> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
            tools: tools
                .iter()
                .map(|t| OpenAITool {
                    kind: "function".into(),
                    function: OpenAIFunction {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.input_schema.clone(),
                    },
                })
                .collect(),
            tool_choice: "auto".into(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| VisionError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VisionError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| VisionError::LlmError(e.to_string()))?;

        let calls = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.tool_calls)
            .unwrap_or_default();

        calls
            .into_iter()
            .map(|call| {
                // Arguments arrive as a JSON-encoded string
                let arguments: Value =
                    serde_json::from_str(&call.function.arguments).map_err(|e| {
                        VisionError::InvalidToolArguments(format!(
                            "{}: {} - arguments: {}",
                            call.function.name, e, call.function.arguments
                        ))
                    })?;
                Ok(ToolInvocation::new(call.function.name, arguments))
            })
            .collect()
    }

    async fn invoke_gemini(
        &self,
        system: &str,
        user: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolInvocation>> {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::system(system)),
            contents: vec![Content::user(vec![Part::text(user)])],
            tools: vec![GeminiTool {
                function_declarations: tools
                    .iter()
                    .map(|t| FunctionDeclaration {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.input_schema.clone(),
                    })
                    .collect(),
            }],
            generation_config: None,
        };

        let response = gemini::generate_content(
            &self.client,
            &self.api_url,
            &self.model,
            &self.api_key,
            &request,
            VisionError::LlmError,
        )
        .await?;

        Ok(response
            .parts()
            .iter()
            .filter_map(|p| p.function_call.as_ref())
            .map(|call| ToolInvocation::new(call.name.clone(), call.args.clone()))
            .collect())
    }
}

#[async_trait]
impl ToolCallingModel for LlmClient {
    async fn invoke_tools(
        &self,
        system: &str,
        user: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolInvocation>> {
        tracing::debug!(model = %self.model, format = ?self.api_format, "invoking LLM with tools");
        let invocations = match self.api_format {
            ApiFormat::Anthropic => self.invoke_anthropic(system, user, tools).await?,
            ApiFormat::OpenAI => self.invoke_openai(system, user, tools).await?,
            ApiFormat::Gemini => self.invoke_gemini(system, user, tools).await?,
        };
        tracing::debug!(count = invocations.len(), "LLM returned tool invocations");
        Ok(invocations)
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
    tools: Vec<AnthropicTool>,
}

#[derive(Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse {
        name: String,
        input: Value,
    },
    /// Text and any other block kinds
    #[serde(other)]
    Other,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    tools: Vec<OpenAITool>,
    tool_choice: String,
}

#[derive(Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    kind: String,
    function: OpenAIFunction,
}

#[derive(Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Deserialize)]
struct OpenAIToolCall {
    function: OpenAIFunctionCall,
}

#[derive(Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
