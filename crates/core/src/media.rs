//! Image payloads and generated results.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prompt::ResolvedPrompt;
use crate::types::{EntityId, Timestamp};

/// MIME type assumed when the gateway does not report one.
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/png";

/// Whether an image came from a catalog scenario or free-form text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    Preset,
    Custom,
}

/// Raw image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Build an uploaded source image, accepting only non-empty `image/*`
    /// payloads.
    pub fn source(mime_type: &str, data: Vec<u8>) -> Result<Self, CoreError> {
        validate_source_image(mime_type, &data)?;
        Ok(Self::new(mime_type, data))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Standard base64 of the bytes, without any data-URL prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// `data:<mime>;base64,<payload>` URL for direct embedding.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Reject uploads that are not image-typed or carry no bytes.
pub fn validate_source_image(mime_type: &str, data: &[u8]) -> Result<(), CoreError> {
    if !mime_type.starts_with("image/") {
        return Err(CoreError::Validation(format!(
            "Source file must be an image, got '{mime_type}'"
        )));
    }
    if data.is_empty() {
        return Err(CoreError::Validation(
            "Source image must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// The scenario and color a preset generation was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOrigin {
    pub scenario_id: String,
    pub color: Option<String>,
}

/// An immutable generation result.
///
/// Shared by reference (`Arc`) between the results list and any storyboard
/// items promoted from it.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    id: EntityId,
    payload: Arc<ImagePayload>,
    mime_type: String,
    prompt: String,
    created_at: Timestamp,
    kind: GenerationKind,
    origin: Option<ScenarioOrigin>,
}

impl GeneratedImage {
    /// Stamp a fresh id and creation time on a gateway result.
    pub fn new(payload: ImagePayload, prompt: ResolvedPrompt) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            mime_type: payload.mime_type().to_string(),
            payload: Arc::new(payload),
            prompt: prompt.text,
            created_at: chrono::Utc::now(),
            kind: prompt.kind,
            origin: prompt.origin,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn kind(&self) -> GenerationKind {
        self.kind
    }

    pub fn origin(&self) -> Option<&ScenarioOrigin> {
        self.origin.as_ref()
    }

    /// Download file name, e.g. `nanomerch-<id>.png`.
    pub fn file_name(&self) -> String {
        format!("nanomerch-{}.{}", self.id, extension_for(self.payload.mime_type()))
    }
}

/// File extension for common image MIME types, `png` otherwise.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn source_accepts_any_image_type() {
        assert!(ImagePayload::source("image/png", vec![1, 2, 3]).is_ok());
        assert!(ImagePayload::source("image/heic", vec![1]).is_ok());
    }

    #[test]
    fn source_rejects_non_image_type() {
        assert_matches!(
            ImagePayload::source("application/pdf", vec![1]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn source_rejects_empty_payload() {
        assert_matches!(
            ImagePayload::source("image/png", Vec::new()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn data_url_has_mime_prefix() {
        let payload = ImagePayload::new("image/png", b"abc".to_vec());
        assert_eq!(payload.data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn generated_image_keeps_prompt_and_origin() {
        let prompt = ResolvedPrompt {
            text: "a mug".to_string(),
            kind: GenerationKind::Preset,
            origin: Some(ScenarioOrigin {
                scenario_id: "coffee-mug".to_string(),
                color: None,
            }),
        };
        let image = GeneratedImage::new(ImagePayload::new("image/jpeg", vec![9]), prompt);
        assert_eq!(image.prompt(), "a mug");
        assert_eq!(image.kind(), GenerationKind::Preset);
        assert_eq!(image.origin().unwrap().scenario_id, "coffee-mug");
        assert!(image.file_name().ends_with(".jpg"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let prompt = ResolvedPrompt {
            text: "x".to_string(),
            kind: GenerationKind::Custom,
            origin: None,
        };
        let a = GeneratedImage::new(ImagePayload::new("image/png", vec![1]), prompt.clone());
        let b = GeneratedImage::new(ImagePayload::new("image/png", vec![1]), prompt);
        assert_ne!(a.id(), b.id());
    }
}
