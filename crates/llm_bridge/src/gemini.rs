//! Gemini (Google Generative Language API) backend
//!
//! Sends text or text+image prompts to `models/{model}:generateContent` and
//! returns the concatenated text of the first candidate.

use crate::backend::{ModelBackend, ModelRequest};
use crate::config::{ApiKey, ModelSettings};
use crate::error::ModelInvocationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    base_url: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    ///
    /// The reqwest client carries the per-call timeout from `settings`.
    pub fn new(settings: &ModelSettings) -> Result<Self, ModelInvocationError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                ModelInvocationError::Network(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate(
        &self,
        api_key: &ApiKey,
        request: &ModelRequest,
    ) -> Result<String, ModelInvocationError> {
        let body = GeminiRequest::from(request);
        let url = self.endpoint(&request.model);

        tracing::debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            image_len = request.image.as_ref().map(|i| i.data.len()).unwrap_or(0),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ModelInvocationError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let text = response.text().await?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<GeminiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::warn!(status, %message, "Gemini API error");
            return Err(match status {
                401 | 403 => ModelInvocationError::Unauthorized { status, message },
                _ => ModelInvocationError::Api { status, message },
            });
        }

        let envelope: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| ModelInvocationError::InvalidEnvelope(e.to_string()))?;

        envelope.into_text().ok_or(ModelInvocationError::EmptyResponse)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

/// Gemini API request structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl From<&ModelRequest> for GeminiRequest {
    fn from(request: &ModelRequest) -> Self {
        let mut parts = vec![GeminiPart::Text {
            text: request.prompt.clone(),
        }];
        if let Some(image) = &request.image {
            parts.push(GeminiPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.as_str().to_string(),
                    data: image.data.clone(),
                },
            });
        }

        let generation_config =
            if request.temperature.is_some() || request.max_output_tokens.is_some() {
                Some(GenerationConfig {
                    temperature: request.temperature,
                    max_output_tokens: request.max_output_tokens,
                })
            } else {
                None
            };

        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            generation_config,
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponse {
    /// Text of the first candidate, skipping thought parts
    fn into_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content?
            .parts
            .into_iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiApiError,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    message: String,
}
