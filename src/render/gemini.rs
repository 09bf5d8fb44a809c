//! Gemini image generation client

use crate::core::config::VisionConfig;
use crate::core::error::{Result, VisionError};
use crate::llm::gemini::{self, Content, GenerateContentRequest, GenerationConfig, Part};
use crate::render::data_uri::{DataUri, ImageSource};
use crate::render::generator::ImageGenerator;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Posts `generateContent` requests to an image-capable Gemini model
pub struct GeminiImageClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiImageClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    /// Create a client from the `image` section of the config
    ///
    /// Requires IMAGE_API_KEY (or LLM_API_KEY when the LLM is Gemini).
    pub fn from_config(config: &VisionConfig) -> Result<Self> {
        let api_key = config.image.api_key.clone().ok_or_else(|| {
            VisionError::ImageGenerationError("IMAGE_API_KEY not set".into())
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VisionError::ImageGenerationError(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.image.api_url.clone(),
            model: config.image.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Download a remote image so it can be sent inline
    async fn fetch(&self, url: &str) -> Result<DataUri> {
        tracing::debug!(%url, "fetching remote image");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VisionError::ImageGenerationError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VisionError::ImageGenerationError(format!(
                "failed to fetch {} ({})",
                url, status
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| VisionError::ImageGenerationError(e.to_string()))?;

        match content_type {
            Some(mime) if mime.starts_with("image/") => Ok(DataUri::from_bytes(&mime, &bytes)),
            _ => DataUri::from_image_bytes(&bytes),
        }
    }

    async fn inline_part(&self, source: &ImageSource) -> Result<Part> {
        let uri = match source {
            ImageSource::Inline(uri) => uri.clone(),
            ImageSource::Remote(url) => self.fetch(url).await?,
        };
        Ok(Part::inline(&uri.mime_type, &uri.data))
    }
}

/// Build the request body: image parts in order, then the instruction
pub(crate) fn image_request(parts: Vec<Part>, instruction: &str) -> GenerateContentRequest {
    let mut parts = parts;
    parts.push(Part::text(instruction));
    GenerateContentRequest {
        system_instruction: None,
        contents: vec![Content::user(parts)],
        tools: Vec::new(),
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["TEXT".into(), "IMAGE".into()],
        }),
    }
}

/// First inline image of the response, if any
pub(crate) fn first_image(response: &gemini::GenerateContentResponse) -> Option<DataUri> {
    response
        .parts()
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .map(|d| DataUri::new(d.mime_type.clone(), d.data.clone()))
        .find(|uri| uri.is_image() && !uri.data.is_empty())
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    async fn generate(
        &self,
        images: &[ImageSource],
        instruction: &str,
    ) -> Result<Option<DataUri>> {
        let mut parts = Vec::with_capacity(images.len() + 1);
        for source in images {
            parts.push(self.inline_part(source).await?);
        }
        let request = image_request(parts, instruction);

        let response = gemini::generate_content(
            &self.client,
            &self.base_url,
            &self.model,
            &self.api_key,
            &request,
            VisionError::ImageGenerationError,
        )
        .await?;

        let image = first_image(&response);
        if image.is_none() {
            let finish = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            tracing::warn!(model = %self.model, finish_reason = finish, "model returned no image");
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_request_layout() {
        let request = image_request(
            vec![Part::inline("image/jpeg", "ROOM"), Part::inline("image/png", "FLOOR")],
            "apply the tiles",
        );
        let value = serde_json::to_value(&request).unwrap();
        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["data"], "ROOM");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[2]["text"], "apply the tiles");
        assert_eq!(value["generationConfig"]["responseModalities"], json!(["TEXT", "IMAGE"]));
    }

    #[test]
    fn test_first_image_skips_text() {
        let response: gemini::GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here is your room"},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBOR"}}
                ]}
            }]
        }))
        .unwrap();
        let image = first_image(&response).unwrap();
        assert_eq!(image.to_string(), "data:image/png;base64,iVBOR");
    }

    #[test]
    fn test_first_image_none_for_text_only() {
        let response: gemini::GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "I can't do that"}]}, "finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert!(first_image(&response).is_none());
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = VisionConfig::default();
        assert!(GeminiImageClient::from_config(&config).is_err());

        let mut config = VisionConfig::default();
        config.image.api_key = Some("key".into());
        let client = GeminiImageClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gemini-2.5-flash-image-preview");
    }
}
