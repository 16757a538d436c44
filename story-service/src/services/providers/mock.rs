//! Mock provider implementations for testing.

use super::{
    FinishReason, GeneratedImage, GenerationParams, ImageParams, ImageProvider, ProviderError,
    ProviderResponse, TextProvider,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Mock text provider for testing.
///
/// Replies are chosen by the first registered needle contained in the prompt;
/// otherwise the prompt is echoed back. Every prompt is recorded.
pub struct MockTextProvider {
    enabled: bool,
    replies: Vec<(String, Result<String, ProviderError>)>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            replies: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies.push((needle.into(), Ok(reply.into())));
        self
    }

    pub fn with_failure(mut self, needle: impl Into<String>, error: ProviderError) -> Self {
        self.replies.push((needle.into(), Err(error)));
        self
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        self.enabled
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let reply = self
            .replies
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Ok(format!("Mock response for: {}", prompt)))?;

        Ok(ProviderResponse {
            output_tokens: reply.len() as i32 / 4,
            text: reply,
            input_tokens: prompt.len() as i32 / 4,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }
}

/// Mock image provider for testing.
///
/// Fails any prompt containing one of the registered needles; otherwise
/// returns a tiny payload whose seed is the call number.
pub struct MockImageProvider {
    enabled: bool,
    fail_on: Vec<String>,
    calls: AtomicU64,
}

impl MockImageProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            fail_on: Vec::new(),
            calls: AtomicU64::new(0),
        }
    }

    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on.push(needle.into());
        self
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &ImageParams,
    ) -> Result<GeneratedImage, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock image provider not enabled".to_string(),
            ));
        }

        if self.fail_on.iter().any(|needle| prompt.contains(needle.as_str())) {
            return Err(ProviderError::ApiError("Mock image failure".to_string()));
        }

        Ok(GeneratedImage {
            base64: "bW9jaw==".to_string(),
            seed: Some(call),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock image provider not enabled".to_string(),
            ))
        }
    }
}
