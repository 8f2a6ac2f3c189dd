//! dish2recipe server
//!
//! Serves the JSON API and, optionally, the built Yew frontend.

use anyhow::{Context, Result};
use clap::Parser;
use dish2recipe_server::{build_router, AppState};
use llm_bridge::config::api_key_from_env;
use llm_bridge::{GeminiBackend, ModelSettings};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dish2recipe-server")]
#[command(about = "Identify a dish from a photo and suggest recipes", long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "DISH2RECIPE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "DISH2RECIPE_PORT", default_value = "3000")]
    port: u16,

    /// Directory with the built frontend (trunk dist)
    #[arg(long, env = "DISH2RECIPE_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let settings = ModelSettings::from_env();
    let backend = GeminiBackend::new(&settings)?;
    let env_api_key = api_key_from_env();

    if env_api_key.is_none() {
        tracing::warn!("No GOOGLE_API_KEY set; users must supply a key in the UI");
    }
    tracing::info!(
        vision_model = %settings.vision_model,
        text_model = %settings.text_model,
        language = %settings.language,
        "Model settings loaded"
    );

    let state = Arc::new(AppState::new(Arc::new(backend), settings, env_api_key));
    let app = build_router(state, args.static_dir);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
