//! Mapping of pipeline failures to HTTP responses

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_pipeline::{ImageError, UnknownLanguage};
use llm_bridge::pipeline::model_failure_kind;
use llm_bridge::{FailureKind, ModelError, OrchestrationError, PipelineStage};
use serde::Serialize;

/// JSON error payload
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
    /// Model output that failed to parse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Pipeline(#[from] OrchestrationError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<ImageError> for ApiError {
    fn from(e: ImageError) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

impl From<UnknownLanguage> for ApiError {
    fn from(e: UnknownLanguage) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::MissingCredential => StatusCode::UNAUTHORIZED,
        FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
        FailureKind::ServiceUnavailable | FailureKind::MalformedResponse => StatusCode::BAD_GATEWAY,
    }
}

fn user_message(kind: FailureKind, stage: Option<PipelineStage>, detail: &str) -> String {
    let service = match stage {
        Some(PipelineStage::Identify) => "the identification service",
        Some(PipelineStage::GenerateRecipes) | None => "the recipe service",
    };
    match kind {
        FailureKind::MissingCredential => {
            "No API key available. Enter your Google API key to continue.".to_string()
        }
        FailureKind::InvalidInput => detail.to_string(),
        FailureKind::ServiceUnavailable => format!("Could not reach {}: {}", service, detail),
        FailureKind::MalformedResponse => {
            format!("Malformed response from {}: {}", service, detail)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg.clone(),
                    kind: FailureKind::InvalidInput,
                    stage: None,
                    raw_response: None,
                },
            ),
            ApiError::Multipart(e) => (
                e.status(),
                ErrorBody {
                    error: format!("Failed to read upload: {}", e.body_text()),
                    kind: FailureKind::InvalidInput,
                    stage: None,
                    raw_response: None,
                },
            ),
            ApiError::Pipeline(e) => {
                let kind = e.kind();
                let detail = match e {
                    OrchestrationError::Stage { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                (
                    status_for(kind),
                    ErrorBody {
                        error: user_message(kind, e.stage(), &detail),
                        kind,
                        stage: e.stage(),
                        raw_response: e.raw_response().map(String::from),
                    },
                )
            }
            ApiError::Model(e) => {
                let kind = model_failure_kind(e);
                let raw_response = match e {
                    ModelError::Parse(p) => Some(p.raw.clone()),
                    _ => None,
                };
                let stage = matches!(
                    kind,
                    FailureKind::ServiceUnavailable | FailureKind::MalformedResponse
                )
                .then_some(PipelineStage::GenerateRecipes);
                (
                    status_for(kind),
                    ErrorBody {
                        error: user_message(kind, stage, &e.to_string()),
                        kind,
                        stage,
                        raw_response,
                    },
                )
            }
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        }

        (status, Json(body)).into_response()
    }
}
