//! dish2recipe HTTP server
//!
//! JSON API in front of the identify → recipes pipeline, plus static hosting
//! for the Yew frontend. This is the only layer that turns pipeline errors
//! into user-facing messages.

mod error;
mod handlers;

pub use error::{ApiError, ErrorBody};
pub use handlers::{AnalyzeResponse, ConfigResponse, RecipesRequest, RecipesResponse};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use llm_bridge::{ModelBackend, ModelSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Largest accepted image upload
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Read-only state shared by all requests
#[derive(Debug, Clone)]
pub struct AppState {
    pub backend: Arc<dyn ModelBackend>,
    pub settings: ModelSettings,
    /// Key found in the server environment at startup, if any
    pub env_api_key: Option<String>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        settings: ModelSettings,
        env_api_key: Option<String>,
    ) -> Self {
        Self {
            backend,
            settings,
            env_api_key,
        }
    }
}

/// Build the application router
///
/// # Arguments
/// * `state` - Shared backend and settings
/// * `static_dir` - Built frontend to serve for non-API paths, if any
pub fn build_router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/config", get(handlers::get_config))
        .route("/api/analyze", post(handlers::analyze_image))
        .route("/api/recipes", post(handlers::recipes_from_ingredients))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => {
            let index = dir.join("index.html");
            api.fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index)))
        }
        None => api,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
