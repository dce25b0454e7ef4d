//! Generation session: one request in flight, results newest first.
//!
//! A generation is split into [`GenerationSession::begin`] (validate, resolve
//! the prompt, raise the in-flight flag) and [`GenerationSession::finish`]
//! (record the outcome, lower the flag) so that callers sharing the session
//! behind a lock do not hold it across the gateway call.
//! [`GenerationSession::generate`] runs both halves back to back.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::gateway::{GatewayError, ImageGateway};
use crate::media::{GeneratedImage, ImagePayload};
use crate::prompt::{resolve_prompt, PromptSpec, ResolvedPrompt};
use crate::types::EntityId;

/// The one user-facing message for any failed generation.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate image. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Generating,
}

/// Why a generation attempt did not produce an image.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No source image has been selected. Nothing is recorded.
    #[error("No source image selected")]
    NoSourceImage,

    /// Another generation is still in flight. Nothing is recorded.
    #[error("A generation is already in progress")]
    Busy,

    /// The selection resolved to no prompt text.
    #[error("No prompt provided")]
    MissingPrompt,

    /// The gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl GenerationError {
    /// Whether this failure is surfaced to the user as
    /// [`GENERATION_FAILED_MESSAGE`].
    pub fn is_surfaced(&self) -> bool {
        matches!(self, Self::MissingPrompt | Self::Gateway(_))
    }
}

/// Inputs for one generation attempt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source: Option<Arc<ImagePayload>>,
    pub prompt: Option<PromptSpec>,
}

/// A started generation, to be handed back to [`GenerationSession::finish`].
#[derive(Debug)]
pub struct PendingGeneration {
    source: Arc<ImagePayload>,
    prompt: ResolvedPrompt,
}

impl PendingGeneration {
    pub fn source(&self) -> &ImagePayload {
        &self.source
    }

    pub fn prompt(&self) -> &ResolvedPrompt {
        &self.prompt
    }
}

#[derive(Debug)]
pub struct GenerationSession {
    status: SessionStatus,
    results: Vec<Arc<GeneratedImage>>,
    last_error: Option<&'static str>,
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationSession {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            results: Vec::new(),
            last_error: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_generating(&self) -> bool {
        self.status == SessionStatus::Generating
    }

    /// Results, newest first.
    pub fn results(&self) -> &[Arc<GeneratedImage>] {
        &self.results
    }

    pub fn find_result(&self, id: EntityId) -> Option<&Arc<GeneratedImage>> {
        self.results.iter().find(|img| img.id() == id)
    }

    /// Message from the most recent failed attempt, cleared when a new
    /// attempt starts.
    pub fn last_error(&self) -> Option<&'static str> {
        self.last_error
    }

    /// Start a generation.
    pub fn begin(
        &mut self,
        request: &GenerationRequest,
        catalog: &Catalog,
    ) -> Result<PendingGeneration, GenerationError> {
        if self.is_generating() {
            return Err(GenerationError::Busy);
        }
        let source = request
            .source
            .as_ref()
            .ok_or(GenerationError::NoSourceImage)?;

        self.last_error = None;

        let Some(prompt) = request
            .prompt
            .as_ref()
            .and_then(|spec| resolve_prompt(spec, catalog))
        else {
            tracing::warn!("Generation requested without a usable prompt");
            self.last_error = Some(GENERATION_FAILED_MESSAGE);
            return Err(GenerationError::MissingPrompt);
        };

        self.status = SessionStatus::Generating;
        tracing::info!(kind = ?prompt.kind, prompt = %prompt.text, "Generation started");

        Ok(PendingGeneration {
            source: Arc::clone(source),
            prompt,
        })
    }

    /// Record the gateway outcome for a started generation.
    ///
    /// Success prepends a new [`GeneratedImage`]. Failure leaves the results
    /// untouched and sets [`GENERATION_FAILED_MESSAGE`]. Either way the
    /// session returns to idle.
    pub fn finish(
        &mut self,
        pending: PendingGeneration,
        outcome: Result<ImagePayload, GatewayError>,
    ) -> Result<Arc<GeneratedImage>, GenerationError> {
        self.status = SessionStatus::Idle;

        match outcome {
            Ok(payload) => {
                let image = Arc::new(GeneratedImage::new(payload, pending.prompt));
                tracing::info!(
                    image_id = %image.id(),
                    bytes = image.payload().len(),
                    "Generation completed"
                );
                self.results.insert(0, Arc::clone(&image));
                Ok(image)
            }
            Err(err) => {
                tracing::error!(error = %err, "Generation failed");
                self.last_error = Some(GENERATION_FAILED_MESSAGE);
                Err(GenerationError::Gateway(err))
            }
        }
    }

    /// Run a full generation against `gateway`.
    pub async fn generate(
        &mut self,
        gateway: &dyn ImageGateway,
        request: &GenerationRequest,
        catalog: &Catalog,
    ) -> Result<Arc<GeneratedImage>, GenerationError> {
        let pending = self.begin(request, catalog)?;
        let outcome = gateway
            .generate(pending.source(), &pending.prompt().text)
            .await;
        self.finish(pending, outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
