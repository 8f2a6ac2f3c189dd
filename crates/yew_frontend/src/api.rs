//! Calls to the dish2recipe server API

use gloo_net::http::Request;
use serde::Deserialize;
use web_sys::{File, FormData};

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct FoodIdentification {
    pub name: String,
    pub description: String,
    pub confidence: f64,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct AnalyzeResponse {
    pub identification: FoodIdentification,
    pub recipes: Vec<Recipe>,
}

/// Error payload returned by the server (or synthesized on transport failure)
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct ApiFailure {
    pub error: String,
    pub kind: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub raw_response: Option<String>,
}

impl ApiFailure {
    fn client(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            kind: "client_error".to_string(),
            stage: None,
            raw_response: None,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct ServerConfig {
    pub server_key_configured: bool,
    pub languages: Vec<String>,
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_key_configured: false,
            languages: vec![default_language()],
            default_language: default_language(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

pub async fn fetch_config() -> Result<ServerConfig, String> {
    let response = Request::get("/api/config")
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.ok() {
        return Err(format!("config request failed: {}", response.status()));
    }
    response.json().await.map_err(|e| e.to_string())
}

/// Upload an image and run the identify → recipes pipeline
pub async fn analyze(
    file: &File,
    api_key: &str,
    language: &str,
) -> Result<AnalyzeResponse, ApiFailure> {
    let form = FormData::new().map_err(|_| ApiFailure::client("Could not build upload form"))?;
    form.append_with_blob_and_filename("image", file, &file.name())
        .map_err(|_| ApiFailure::client("Could not attach image"))?;
    if !api_key.trim().is_empty() {
        form.append_with_str("api_key", api_key.trim())
            .map_err(|_| ApiFailure::client("Could not attach API key"))?;
    }
    form.append_with_str("language", language)
        .map_err(|_| ApiFailure::client("Could not attach language"))?;

    let response = Request::post("/api/analyze")
        .body(form)
        .map_err(|e| ApiFailure::client(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiFailure::client(format!("Server unreachable: {}", e)))?;

    if response.ok() {
        response
            .json::<AnalyzeResponse>()
            .await
            .map_err(|e| ApiFailure::client(format!("Unexpected server response: {}", e)))
    } else {
        let status = response.status();
        Err(response
            .json::<ApiFailure>()
            .await
            .unwrap_or_else(|_| ApiFailure::client(format!("Request failed ({})", status))))
    }
}

/// Confidence as a whole percentage, e.g. `0.92` → `"92%"`
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.0}%", (confidence * 100.0).clamp(0.0, 100.0))
}

/// Heading for a failed stage
pub fn stage_label(stage: Option<&str>) -> &'static str {
    match stage {
        Some("identify") => "Could not identify the food",
        Some("generate_recipes") => "Could not generate recipes",
        _ => "Request failed",
    }
}

/// Display name for a language code from `/api/config`
pub fn language_label(code: &str) -> &str {
    match code {
        "en" => "English",
        "es" => "Español",
        other => other,
    }
}

/// Only JPG/JPEG/PNG uploads are accepted
pub fn is_accepted_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".jpg", ".jpeg", ".png"].iter().any(|ext| lower.ends_with(ext))
}

/// Whether the submit button should be enabled
pub fn can_submit(has_file: bool, typed_key: &str, server_key_configured: bool) -> bool {
    has_file && (server_key_configured || !typed_key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.92), "92%");
        assert_eq!(format_confidence(1.0), "100%");
        assert_eq!(format_confidence(0.0), "0%");
    }

    #[test]
    fn test_stage_label() {
        assert_eq!(stage_label(Some("identify")), "Could not identify the food");
        assert_eq!(stage_label(Some("generate_recipes")), "Could not generate recipes");
        assert_eq!(stage_label(None), "Request failed");
    }

    #[test]
    fn test_is_accepted_file() {
        assert!(is_accepted_file("dinner.JPG"));
        assert!(is_accepted_file("plate.png"));
        assert!(!is_accepted_file("menu.pdf"));
    }

    #[test]
    fn test_can_submit() {
        assert!(!can_submit(false, "key", true));
        assert!(!can_submit(true, "  ", false));
        assert!(can_submit(true, "", true));
        assert!(can_submit(true, "key", false));
    }

    #[test]
    fn test_language_label() {
        assert_eq!(language_label("en"), "English");
        assert_eq!(language_label("es"), "Español");
        assert_eq!(language_label("fr"), "fr");
    }

    #[test]
    fn test_server_config_deserialization() {
        let config: ServerConfig = serde_json::from_str(
            r#"{"server_key_configured":true,"languages":["en","es"],"default_language":"es"}"#,
        )
        .unwrap();
        assert_eq!(config.languages, vec!["en", "es"]);
        assert_eq!(config.default_language, "es");

        let older: ServerConfig =
            serde_json::from_str(r#"{"server_key_configured":false,"languages":["en"]}"#).unwrap();
        assert_eq!(older.default_language, "en");
    }

    #[test]
    fn test_failure_deserialization() {
        let failure: ApiFailure = serde_json::from_str(
            r#"{"error":"bad","kind":"malformed_response","stage":"identify","raw_response":"oops"}"#,
        )
        .unwrap();
        assert_eq!(failure.stage.as_deref(), Some("identify"));
        assert_eq!(failure.raw_response.as_deref(), Some("oops"));
    }
}
