//! LLM Bridge for Gemini integration
//!
//! Provides the model client used to identify food in an image (vision
//! model) and to suggest recipes for it (text model), the credential and
//! settings it is configured with, and the pipeline that sequences the two
//! calls.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod fake;
pub mod gemini;
pub mod pipeline;
pub mod prompts;

pub use backend::{ModelBackend, ModelRequest};
pub use client::ModelClient;
pub use config::{ApiKey, ConfigProvider, MissingCredentialError, ModelSettings};
pub use error::{ModelError, ModelInvocationError};
pub use fake::ScriptedBackend;
pub use gemini::GeminiBackend;
pub use pipeline::{
    FailureKind, Orchestrator, OrchestrationError, PipelineOutcome, PipelineStage, PipelineState,
};
