//! Transport seam between the model client and a hosted model

use crate::config::ApiKey;
use crate::error::ModelInvocationError;
use async_trait::async_trait;
use core_pipeline::TransportPayload;
use std::fmt;

/// One prompt sent to one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub prompt: String,
    /// Inline image for vision calls
    pub image: Option<TransportPayload>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// A hosted generation endpoint
///
/// Implementations return the model's text exactly as produced; decoding is
/// left to the response parser. They must not retry.
#[async_trait]
pub trait ModelBackend: Send + Sync + fmt::Debug {
    async fn generate(
        &self,
        api_key: &ApiKey,
        request: &ModelRequest,
    ) -> Result<String, ModelInvocationError>;

    /// Provider name for logs (e.g., "gemini")
    fn provider_name(&self) -> &'static str;
}
