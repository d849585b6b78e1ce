//! HTTP surface: router, shared state and the listener loop.

use crate::ai::{GeminiHttpClient, ImageProvider};
use crate::models::Config;
use crate::relay::{RelayError, RelayHandler};
use crate::Result;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::Method,
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const GENERATE_PATH: &str = "/api/generate";

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayHandler>,
}

impl AppState {
    pub fn new(relay: RelayHandler) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }

    /// Wires the Gemini client when `GEMINI_API_KEY` is set.
    pub fn from_config(config: &Config) -> Self {
        let provider = config.gemini_api_key.as_ref().map(|key| {
            info!("Image provider: Gemini (model: {})", config.gemini_model);
            Arc::new(
                GeminiHttpClient::new(
                    key.clone(),
                    config.gemini_model.clone(),
                    config.request_timeout,
                )
                .with_base_url(config.gemini_base_url.clone()),
            ) as Arc<dyn ImageProvider>
        });
        if provider.is_none() {
            warn!("GEMINI_API_KEY not set; generation requests will fail with 500");
        }

        Self::new(RelayHandler::new(provider))
    }
}

/// Builds the router. Every method reaches the relay on the generate path so
/// that rejections carry the JSON error body.
pub fn create_app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(GENERATE_PATH, any(generate_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn generate_handler(
    State(state): State<AppState>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    // Body rejections only apply to POST; other methods still get the JSON 405.
    let body = match body {
        Ok(body) => body,
        Err(_) if method != Method::POST => Bytes::new(),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            return RelayError::UnreadableBody {
                status: rejection.status(),
                message: rejection.body_text(),
            }
            .into_response();
        }
    };

    match state.relay.handle(&method, &body).await {
        Ok(image) => image.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
    .into_response()
}

/// Binds `config.bind_addr` and serves until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let app = create_app(AppState::from_config(config), config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Relay listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
