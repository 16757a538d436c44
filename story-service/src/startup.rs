//! Application startup and lifecycle management.

use crate::config::StoryConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::stability::{StabilityConfig, StabilityImageProvider};
use crate::services::providers::{ImageProvider, ProviderError, TextProvider};
use crate::services::StoryService;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Story payloads can carry whole stories and inline images.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: StoryConfig,
    pub story: Arc<StoryService>,
}

impl AppState {
    pub fn new(config: StoryConfig, story: StoryService) -> Self {
        Self {
            config,
            story: Arc::new(story),
        }
    }

    /// Wire the real providers described by `config`.
    pub fn from_config(config: StoryConfig) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(config.providers.timeout_secs);

        let text_provider: Arc<dyn TextProvider> = Arc::new(
            GeminiTextProvider::new(GeminiConfig {
                api_key: config.gemini.api_key.clone().unwrap_or_default(),
                model: config.gemini.model.clone(),
                base_url: config.gemini.base_url.clone(),
                timeout,
            })
            .map_err(provider_init_error)?,
        );

        if text_provider.is_configured() {
            tracing::info!(model = %config.gemini.model, "Initialized Gemini text provider");
        } else {
            tracing::warn!("GEMINI_API_KEY not set; story generation will fail");
        }

        let image_provider: Option<Arc<dyn ImageProvider>> = match &config.stability.api_key {
            Some(api_key) => {
                let provider = StabilityImageProvider::new(StabilityConfig {
                    api_key: api_key.clone(),
                    engine: config.stability.engine.clone(),
                    base_url: config.stability.base_url.clone(),
                    timeout,
                })
                .map_err(provider_init_error)?;
                tracing::info!(
                    engine = %config.stability.engine,
                    "Initialized Stability AI image provider"
                );
                Some(Arc::new(provider) as Arc<dyn ImageProvider>)
            }
            None => {
                tracing::warn!("STABILITY_API_KEY not set; image generation is disabled");
                None
            }
        };

        Ok(Self::new(
            config,
            StoryService::new(text_provider, image_provider),
        ))
    }
}

fn provider_init_error(e: ProviderError) -> AppError {
    AppError::ConfigError(anyhow::anyhow!("Failed to initialize provider: {}", e))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/ready", get(handlers::readiness_check))
        .route("/api/generate-story", post(handlers::generate_story))
        .route("/api/generate-images", post(handlers::generate_images))
        .route("/api/edit-story", post(handlers::edit_story))
        .route("/metrics", get(handlers::metrics_endpoint))
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with real providers from `config`.
    pub async fn build(config: StoryConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(config)?;
        Self::build_with_state(state).await
    }

    /// Bind a listener for an already-assembled state (port 0 = random port).
    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Story service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
