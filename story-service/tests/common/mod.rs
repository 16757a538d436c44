#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use serde_json::Value;
use service_core::config::Config;
use std::sync::Arc;
use story_service::config::{GeminiSettings, ProviderSettings, StabilitySettings, StoryConfig};
use story_service::services::providers::mock::{MockImageProvider, MockTextProvider};
use story_service::services::providers::ImageProvider;
use story_service::services::StoryService;
use story_service::startup::AppState;

pub const STORY_TEXT: &str = "Rain hammered the observatory roof.\n\n\
    Professor Vale found the telescope pointed at an empty patch of sky.\n\n\
    By dawn, the patch was no longer empty.";

pub fn test_config() -> StoryConfig {
    StoryConfig {
        common: Config {
            port: 0,
            environment: "test".to_string(),
        },
        gemini: GeminiSettings {
            api_key: Some("test-gemini-key".to_string()),
            model: "gemini-1.5-flash".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        },
        stability: StabilitySettings {
            api_key: None,
            engine: "stable-diffusion-xl-1024-v1-0".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        },
        providers: ProviderSettings { timeout_secs: 5 },
        frontend_url: "http://localhost:3000".to_string(),
    }
}

pub fn story_text_provider() -> MockTextProvider {
    MockTextProvider::new(true)
        .with_reply("brief, engaging summary", "A scientist chases a vanishing star.")
        .with_reply("Write a creative", STORY_TEXT)
        .with_reply("Edit instructions", "  Thunder rolled over the observatory.  ")
}

pub fn state_with(text: MockTextProvider, images: Option<MockImageProvider>) -> AppState {
    let images = images.map(|p| Arc::new(p) as Arc<dyn ImageProvider>);
    AppState::new(test_config(), StoryService::new(Arc::new(text), images))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
