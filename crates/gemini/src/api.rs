//! REST API client for the Gemini `generateContent` endpoint.
//!
//! Wraps a single image-edit call using [`reqwest`] and exposes it through
//! the core [`ImageGateway`] trait.

use std::time::Duration;

use async_trait::async_trait;

use nanomerch_core::gateway::{GatewayError, ImageGateway};
use nanomerch_core::media::ImagePayload;

use crate::config::GeminiConfig;
use crate::messages::{ExtractError, GenerateContentRequest, GenerateContentResponse};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini API.
pub struct GeminiApi {
    client: reqwest::Client,
    config: GeminiConfig,
}

/// Errors from the Gemini REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// No API key was configured.
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    /// The HTTP request itself failed (network, DNS, TLS, timeout, body
    /// decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gemini returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response carried no usable image.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl From<GeminiError> for GatewayError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey => {
                GatewayError::NotConfigured("GEMINI_API_KEY is not set".to_string())
            }
            GeminiError::Request(e) if e.is_decode() => {
                GatewayError::MalformedResponse(e.to_string())
            }
            GeminiError::Request(e) => GatewayError::Transport(e.to_string()),
            GeminiError::ApiError { status, body } => GatewayError::Api { status, body },
            GeminiError::Extract(ExtractError::MissingImage) => GatewayError::MissingImage,
            GeminiError::Extract(e @ ExtractError::InvalidData(_)) => {
                GatewayError::MalformedResponse(e.to_string())
            }
        }
    }
}

impl GeminiApi {
    /// Create a client with the configured request timeout.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Send the source image and prompt, returning the generated image.
    ///
    /// Exactly one `POST` per call; no retries.
    pub async fn generate_image(
        &self,
        source: &ImagePayload,
        prompt: &str,
    ) -> Result<ImagePayload, GeminiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GeminiError::MissingApiKey)?;

        let body = GenerateContentRequest::image_edit(source, prompt);

        tracing::debug!(
            model = %self.config.model,
            source_bytes = source.len(),
            "Sending Gemini generateContent request"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateContentResponse = Self::parse_response(response).await?;
        let image = parsed.into_image()?;

        tracing::debug!(
            mime_type = image.mime_type(),
            bytes = image.len(),
            "Gemini returned an image"
        );
        Ok(image)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GeminiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GeminiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ImageGateway for GeminiApi {
    async fn generate(
        &self,
        source: &ImagePayload,
        prompt: &str,
    ) -> Result<ImagePayload, GatewayError> {
        self.generate_image(source, prompt).await.map_err(|err| {
            tracing::error!(error = %err, "Gemini API error");
            GatewayError::from(err)
        })
    }
}
