//! AI provider abstractions and implementations.
//!
//! Text comes from Gemini and images from Stability AI; both sit behind
//! traits so the story service can be exercised against mocks.

pub mod gemini;
pub mod mock;
pub mod stability;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::EmptyResponse(_) => "empty_response",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// Result of a text generation call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Sampling parameters for text generation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Top-p sampling.
    pub top_p: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,
}

/// Rendering parameters for image generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub samples: u32,
    pub style_preset: Option<String>,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            cfg_scale: 7.0,
            width: 1024,
            height: 1024,
            steps: 30,
            samples: 1,
            style_preset: Some("cinematic".to_string()),
        }
    }
}

/// A single rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Base64-encoded PNG bytes.
    pub base64: String,
    pub seed: Option<u64>,
}

impl GeneratedImage {
    /// Inline `data:` URL the browser can render directly.
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.base64)
    }
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Whether credentials are present. Does not touch the network.
    fn is_configured(&self) -> bool;

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Trait for image generation providers (e.g., Stability AI).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<GeneratedImage, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Map a non-success HTTP status to a provider error.
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: &str) -> ProviderError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited;
    }
    ProviderError::ApiError(format!("{} API error {}: {}", provider, status, body))
}

/// Transport failure. The request URL is stripped because it can carry
/// credentials.
pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    ProviderError::NetworkError(e.without_url().to_string())
}

/// Body that could not be decoded. The request URL is stripped as above.
pub(crate) fn decode_error(e: reqwest::Error) -> ProviderError {
    ProviderError::ApiError(format!("Failed to parse response: {}", e.without_url()))
}
