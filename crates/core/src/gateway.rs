//! Seam to the external generative-image API.

use async_trait::async_trait;

use crate::media::ImagePayload;

/// Failures from an image generation gateway.
///
/// All variants are treated alike by the session: the attempt is discarded
/// and a single generic message is surfaced.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The gateway cannot be used (e.g. no API key).
    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    /// Network, DNS, TLS or timeout failure.
    #[error("Gateway request failed: {0}")]
    Transport(String),

    /// The upstream API answered with a non-success status.
    #[error("Gateway API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body could not be understood.
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    /// The response carried no image data.
    #[error("No image data found in the response")]
    MissingImage,
}

/// Single request/response image generation.
///
/// One call per generation attempt; implementations do not retry.
#[async_trait]
pub trait ImageGateway: Send + Sync {
    async fn generate(
        &self,
        source: &ImagePayload,
        prompt: &str,
    ) -> Result<ImagePayload, GatewayError>;
}
