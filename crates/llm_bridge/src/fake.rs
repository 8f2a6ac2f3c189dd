//! Scripted model backend for testing.
//!
//! Replies are queued ahead of time and handed out in order, and every
//! request is recorded so tests can assert on what was (or was not) sent.

use crate::backend::{ModelBackend, ModelRequest};
use crate::config::ApiKey;
use crate::error::ModelInvocationError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A backend that replays queued responses
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, ModelInvocationError>>>,
    calls: Mutex<Vec<ModelRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_ok(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    /// Queue a failed call
    pub fn push_err(&self, error: ModelInvocationError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Requests received so far, oldest first
    pub fn calls(&self) -> Vec<ModelRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn generate(
        &self,
        _api_key: &ApiKey,
        request: &ModelRequest,
    ) -> Result<String, ModelInvocationError> {
        self.calls.lock().unwrap().push(request.clone());
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ModelInvocationError::Network(
                "no scripted reply left".to_string(),
            ))
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
