//! Request handlers

use crate::error::ApiError;
use crate::{AppState, MAX_IMAGE_BYTES};
use axum::{
    extract::{Multipart, State},
    Json,
};
use core_pipeline::{FoodIdentification, Language, RecipeSet, UploadedImage};
use llm_bridge::{ConfigProvider, MissingCredentialError, ModelClient, Orchestrator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// A key is configured server-side, so the UI may leave its field empty
    pub server_key_configured: bool,
    pub languages: Vec<String>,
    /// Used when a request does not name a language
    pub default_language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub identification: FoodIdentification,
    pub recipes: RecipeSet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipesRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipesResponse {
    pub recipes: RecipeSet,
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        server_key_configured: state.env_api_key.is_some(),
        languages: Language::ALL.iter().map(|l| l.code().to_string()).collect(),
        default_language: state.settings.language.code().to_string(),
    })
}

/// Identify the dish in an uploaded photo and suggest recipes
///
/// Multipart fields: `image` (required), `api_key`, `language`.
pub async fn analyze_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut image: Option<(Vec<u8>, Option<String>)> = None;
    let mut api_key: Option<String> = None;
    let mut language: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let content_type = field.content_type().map(String::from);
                let data = field.bytes().await?;
                if data.len() > MAX_IMAGE_BYTES {
                    return Err(ApiError::InvalidInput(format!(
                        "Image too large. Maximum size is {} bytes",
                        MAX_IMAGE_BYTES
                    )));
                }
                image = Some((data.to_vec(), content_type));
            }
            "api_key" => api_key = Some(field.text().await?),
            "language" => language = Some(field.text().await?),
            _ => {}
        }
    }

    let (bytes, content_type) =
        image.ok_or_else(|| ApiError::InvalidInput("No image provided".to_string()))?;
    let image = UploadedImage::from_bytes(bytes, content_type.as_deref())?;
    let language = parse_language(language.as_deref(), state.settings.language)?;

    let config = ConfigProvider::new(state.env_api_key.clone(), api_key);
    if !config.has_key() {
        return Err(ApiError::Pipeline(MissingCredentialError.into()));
    }

    let client = ModelClient::new(
        state.backend.clone(),
        config,
        state.settings.clone().with_language(language),
    );

    let span = tracing::info_span!(
        "analyze",
        request_id = %Uuid::new_v4(),
        mime = %image.mime(),
        bytes = image.len(),
        %language
    );

    let outcome = async {
        tracing::info!("Starting pipeline");
        Orchestrator::new(client).run(&image).await
    }
    .instrument(span)
    .await?;

    Ok(Json(AnalyzeResponse {
        identification: outcome.identification,
        recipes: outcome.recipes,
    }))
}

/// Suggest recipes for a list of ingredients
pub async fn recipes_from_ingredients(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecipesRequest>,
) -> Result<Json<RecipesResponse>, ApiError> {
    let language = parse_language(request.language.as_deref(), state.settings.language)?;

    let config = ConfigProvider::new(state.env_api_key.clone(), request.api_key);
    if !config.has_key() {
        return Err(ApiError::Pipeline(MissingCredentialError.into()));
    }

    let client = ModelClient::new(
        state.backend.clone(),
        config,
        state.settings.clone().with_language(language),
    );

    let span = tracing::info_span!(
        "recipes",
        request_id = %Uuid::new_v4(),
        ingredients = request.ingredients.len(),
        %language
    );

    let recipes = client
        .generate_recipes_from_ingredients(&request.ingredients)
        .instrument(span)
        .await?;

    Ok(Json(RecipesResponse { recipes }))
}

/// Request language, or the server's configured one when left out
fn parse_language(value: Option<&str>, fallback: Language) -> Result<Language, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(fallback),
        Some(code) => Ok(code.parse()?),
    }
}
