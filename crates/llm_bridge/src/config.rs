//! Credential resolution and model settings

use core_pipeline::Language;
use std::fmt;

/// Environment variables checked for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// No usable API key from any source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no API key configured: set GOOGLE_API_KEY or enter a key")]
pub struct MissingCredentialError;

/// A non-empty API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Resolves the API credential
///
/// The environment wins; a key typed in by the user is the fallback.
/// Built once per request and handed to the model client.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    env_key: Option<String>,
    user_key: Option<String>,
}

impl ConfigProvider {
    pub fn new(env_key: Option<String>, user_key: Option<String>) -> Self {
        Self {
            env_key: non_blank(env_key),
            user_key: non_blank(user_key),
        }
    }

    /// Read the environment key now, with an optional user-supplied fallback
    pub fn from_env(user_key: Option<String>) -> Self {
        Self::new(api_key_from_env(), user_key)
    }

    pub fn api_key(&self) -> Result<ApiKey, MissingCredentialError> {
        self.env_key
            .as_ref()
            .or(self.user_key.as_ref())
            .map(|k| ApiKey(k.clone()))
            .ok_or(MissingCredentialError)
    }

    pub fn has_key(&self) -> bool {
        self.env_key.is_some() || self.user_key.is_some()
    }
}

/// First non-blank key among `API_KEY_VARS`
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .find_map(|var| non_blank(std::env::var(var).ok()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Configuration for the model client
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Base URL of the Generative Language API
    pub base_url: String,
    /// Model used for image identification
    pub vision_model: String,
    /// Model used for recipe generation
    pub text_model: String,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Output token cap per call
    pub max_output_tokens: Option<u32>,
    /// Timeout per remote call in seconds
    pub timeout_secs: u64,
    /// Prompt and response language
    pub language: Language,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            vision_model: "gemini-2.0-flash".to_string(),
            text_model: "gemini-2.0-flash".to_string(),
            temperature: Some(0.4),
            max_output_tokens: Some(2048),
            timeout_secs: 60,
            language: Language::English,
        }
    }
}

impl ModelSettings {
    /// Defaults overridden by `DISH2RECIPE_*` environment variables
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(url) = env_var("DISH2RECIPE_BASE_URL") {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = env_var("DISH2RECIPE_VISION_MODEL") {
            settings.vision_model = model;
        }
        if let Some(model) = env_var("DISH2RECIPE_TEXT_MODEL") {
            settings.text_model = model;
        }
        if let Some(t) = env_var("DISH2RECIPE_TEMPERATURE").and_then(|s| s.parse().ok()) {
            settings.temperature = Some(t);
        }
        if let Some(n) = env_var("DISH2RECIPE_MAX_OUTPUT_TOKENS").and_then(|s| s.parse().ok()) {
            settings.max_output_tokens = Some(n);
        }
        if let Some(secs) = env_var("DISH2RECIPE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            settings.timeout_secs = secs;
        }
        if let Some(lang) = env_var("DISH2RECIPE_LANGUAGE").and_then(|s| s.parse().ok()) {
            settings.language = lang;
        }
        settings
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

fn env_var(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_takes_precedence() {
        let config = ConfigProvider::new(Some("env".into()), Some("user".into()));
        assert_eq!(config.api_key().unwrap().expose(), "env");
    }

    #[test]
    fn test_user_key_fallback() {
        let config = ConfigProvider::new(None, Some(" user ".into()));
        assert_eq!(config.api_key().unwrap().expose(), "user");
    }

    #[test]
    fn test_blank_keys_are_missing() {
        let config = ConfigProvider::new(Some("   ".into()), Some(String::new()));
        assert!(!config.has_key());
        assert_eq!(config.api_key(), Err(MissingCredentialError));
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ConfigProvider::new(None, Some("secret".into()))
            .api_key()
            .unwrap();
        assert!(!format!("{:?}", key).contains("secret"));
    }

    #[test]
    fn test_model_settings_default() {
        let settings = ModelSettings::default();
        assert_eq!(settings.vision_model, "gemini-2.0-flash");
        assert_eq!(settings.timeout_secs, 60);
        assert_eq!(settings.language, Language::English);
    }
}
