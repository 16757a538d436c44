//! Stability AI image provider.
//!
//! Uses the v1 REST `text-to-image` endpoint of an SDXL engine and returns
//! the first artifact as base64 PNG data.

use super::{
    decode_error, status_error, transport_error, GeneratedImage, ImageParams, ImageProvider,
    ProviderError,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    pub api_key: String,
    pub engine: String,
    /// API root without the version segment, e.g. `https://api.stability.ai`.
    pub base_url: String,
    pub timeout: Duration,
}

pub struct StabilityImageProvider {
    config: StabilityConfig,
    client: Client,
}

impl StabilityImageProvider {
    pub fn new(config: StabilityConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Stability AI API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}

#[async_trait]
impl ImageProvider for StabilityImageProvider {
    fn name(&self) -> &'static str {
        "stability"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<GeneratedImage, ProviderError> {
        let request = TextToImageRequest {
            text_prompts: vec![TextPrompt {
                text: prompt.to_string(),
                weight: 1.0,
            }],
            cfg_scale: params.cfg_scale,
            height: params.height,
            width: params.width,
            samples: params.samples,
            steps: params.steps,
            style_preset: params.style_preset.clone(),
        };

        let url = format!(
            "{}/v1/generation/{}/text-to-image",
            self.base(),
            self.config.engine
        );

        tracing::debug!(
            engine = %self.config.engine,
            prompt_len = prompt.len(),
            "Sending request to Stability AI"
        );

        let response = self
            .client
            .traced_post(&url)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // Stability error bodies are `{ id, name, message }`; prefer the message.
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(status_error("Stability AI", status, &detail));
        }

        let body: TextToImageResponse = response
            .json()
            .await
            .map_err(decode_error)?;

        body.into_image()
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let url = format!("{}/v1/engines/list", self.base());

        let response = self
            .client
            .traced_get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

// ============================================================================
// Stability API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TextToImageRequest {
    text_prompts: Vec<TextPrompt>,
    cfg_scale: f32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    style_preset: Option<String>,
}

#[derive(Debug, Serialize)]
struct TextPrompt {
    text: String,
    weight: f32,
}

#[derive(Debug, Deserialize)]
struct TextToImageResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    #[serde(default)]
    base64: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl TextToImageResponse {
    fn into_image(self) -> Result<GeneratedImage, ProviderError> {
        let artifact = self.artifacts.into_iter().next().ok_or_else(|| {
            ProviderError::EmptyResponse("Invalid response from Stability AI".to_string())
        })?;

        if artifact.finish_reason.as_deref() == Some("CONTENT_FILTERED") {
            return Err(ProviderError::ContentFiltered);
        }

        let base64 = artifact
            .base64
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                ProviderError::EmptyResponse("Stability AI artifact had no image data".to_string())
            })?;

        Ok(GeneratedImage {
            base64,
            seed: artifact.seed,
        })
    }
}
