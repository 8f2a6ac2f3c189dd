//! Two-stage pipeline: identify the dish, then generate recipes
//!
//! Stages run strictly in order. A failure ends the run and is reported with
//! the stage it happened in; nothing is retried and no fallback data is used.

use crate::client::ModelClient;
use crate::config::MissingCredentialError;
use crate::error::{ModelError, ModelInvocationError};
use core_pipeline::{FoodIdentification, ParseError, RecipeSet, UploadedImage};
use serde::Serialize;
use std::fmt;

/// Pipeline stage that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Identify,
    GenerateRecipes,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Identify => f.write_str("identify"),
            PipelineStage::GenerateRecipes => f.write_str("generate_recipes"),
        }
    }
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Identifying,
    IdentifyFailed,
    Identified,
    GeneratingRecipes,
    GenerateFailed,
    Done,
}

/// Coarse failure class used for user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingCredential,
    InvalidInput,
    ServiceUnavailable,
    MalformedResponse,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub identification: FoodIdentification,
    pub recipes: RecipeSet,
}

/// First failure encountered by a run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    MissingCredential(#[from] MissingCredentialError),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: ModelError,
    },
}

impl OrchestrationError {
    fn at(stage: PipelineStage, source: ModelError) -> Self {
        match source {
            ModelError::MissingCredential(e) => OrchestrationError::MissingCredential(e),
            source => OrchestrationError::Stage { stage, source },
        }
    }

    /// Stage that failed, if the run got past credential checks
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            OrchestrationError::MissingCredential(_) => None,
            OrchestrationError::Stage { stage, .. } => Some(*stage),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            OrchestrationError::MissingCredential(_) => FailureKind::MissingCredential,
            OrchestrationError::Stage { source, .. } => model_failure_kind(source),
        }
    }

    /// The remote call failure, if that is what happened
    pub fn invocation_error(&self) -> Option<&ModelInvocationError> {
        match self {
            OrchestrationError::Stage {
                source: ModelError::Invocation(e),
                ..
            } => Some(e),
            _ => None,
        }
    }

    /// The parse failure, if the model replied with something unusable
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            OrchestrationError::Stage {
                source: ModelError::Parse(e),
                ..
            } => Some(e),
            _ => None,
        }
    }

    /// Offending model output, for debugging
    pub fn raw_response(&self) -> Option<&str> {
        self.parse_error().map(|e| e.raw.as_str())
    }
}

/// Failure class of a single model client error
pub fn model_failure_kind(error: &ModelError) -> FailureKind {
    match error {
        ModelError::MissingCredential(_) => FailureKind::MissingCredential,
        ModelError::InvalidInput(_) => FailureKind::InvalidInput,
        ModelError::Invocation(_) => FailureKind::ServiceUnavailable,
        ModelError::Parse(_) => FailureKind::MalformedResponse,
    }
}

/// Drives one image through identification and recipe generation
///
/// Holds per-run state; create one per request.
#[derive(Debug)]
pub struct Orchestrator {
    client: ModelClient,
    state: PipelineState,
}

impl Orchestrator {
    pub fn new(client: ModelClient) -> Self {
        Self {
            client,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run both stages for an uploaded image
    pub async fn run(
        &mut self,
        image: &UploadedImage,
    ) -> Result<PipelineOutcome, OrchestrationError> {
        self.state = PipelineState::Idle;

        // Checked before either stage so nothing goes out without a key
        self.client
            .credential()
            .map_err(|e| OrchestrationError::at(PipelineStage::Identify, e))?;

        self.transition(PipelineState::Identifying);
        let identification = match self.client.identify_food(image).await {
            Ok(food) => food,
            Err(e) => {
                self.transition(PipelineState::IdentifyFailed);
                return Err(OrchestrationError::at(PipelineStage::Identify, e));
            }
        };
        self.transition(PipelineState::Identified);

        tracing::info!(
            food = %identification.name,
            confidence = identification.confidence,
            "Food identified"
        );

        self.transition(PipelineState::GeneratingRecipes);
        let recipes = match self
            .client
            .generate_recipes(&identification.name, &identification.description)
            .await
        {
            Ok(recipes) => recipes,
            Err(e) => {
                self.transition(PipelineState::GenerateFailed);
                return Err(OrchestrationError::at(PipelineStage::GenerateRecipes, e));
            }
        };
        self.transition(PipelineState::Done);

        tracing::info!(count = recipes.len(), "Recipes generated");

        Ok(PipelineOutcome {
            identification,
            recipes,
        })
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?next, "Pipeline state change");
        self.state = next;
    }
}
