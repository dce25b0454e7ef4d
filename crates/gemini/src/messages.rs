//! Typed request and response bodies for `generateContent`.
//!
//! Only the fields this client sends or reads are modelled; everything else
//! in the response is ignored.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use nanomerch_core::media::{ImagePayload, DEFAULT_IMAGE_MIME_TYPE};

/// Response modality requesting image output only.
pub const MODALITY_IMAGE: &str = "IMAGE";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Base64 payload.
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

/// Why a response could not be turned into an image.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("No image data found in the response")]
    MissingImage,

    #[error("Invalid base64 image data: {0}")]
    InvalidData(#[from] base64::DecodeError),
}

impl GenerateContentRequest {
    /// One user turn: the source image followed by the prompt text.
    pub fn image_edit(source: &ImagePayload, prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: Some(source.mime_type().to_string()),
                            data: source.to_base64(),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(prompt.to_string()),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec![MODALITY_IMAGE.to_string()],
            },
        }
    }
}

impl GenerateContentResponse {
    /// Decode the image carried by the first part of the first candidate.
    ///
    /// An absent or empty inline payload in that position is
    /// [`ExtractError::MissingImage`], even if a later part carries one.
    pub fn into_image(self) -> Result<ImagePayload, ExtractError> {
        let inline = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.inline_data)
            .filter(|d| !d.data.is_empty())
            .ok_or(ExtractError::MissingImage)?;

        let data = STANDARD.decode(inline.data.as_bytes())?;
        let mime_type = inline
            .mime_type
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME_TYPE.to_string());
        Ok(ImagePayload::new(mime_type, data))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_serializes_wire_shape() {
        let source = ImagePayload::new("image/jpeg", b"abc".to_vec());
        let body = serde_json::to_value(GenerateContentRequest::image_edit(&source, "on a mug"))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": "YWJj" } },
                        { "text": "on a mug" }
                    ]
                }],
                "generationConfig": { "responseModalities": ["IMAGE"] }
            })
        );
    }

    #[test]
    fn extracts_first_inline_image() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "image/jpeg", "data": "AQID" } }] }
            }]
        }));
        let image = response.into_image().unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.data(), &[1, 2, 3]);
    }

    #[test]
    fn missing_mime_type_defaults_to_png() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "AQID" } }] } }]
        }));
        assert_eq!(response.into_image().unwrap().mime_type(), "image/png");
    }

    #[test]
    fn text_only_response_is_missing_image() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot do that" }] } }]
        }));
        assert_matches!(response.into_image(), Err(ExtractError::MissingImage));
    }

    #[test]
    fn image_after_text_part_is_not_used() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here you go" },
                { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
            ] } }]
        }));
        assert_matches!(response.into_image(), Err(ExtractError::MissingImage));
    }

    #[test]
    fn empty_response_is_missing_image() {
        assert_matches!(parse(json!({})).into_image(), Err(ExtractError::MissingImage));
        assert_matches!(
            parse(json!({ "candidates": [{}] })).into_image(),
            Err(ExtractError::MissingImage)
        );
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "!!!" } }] } }]
        }));
        assert_matches!(response.into_image(), Err(ExtractError::InvalidData(_)));
    }
}
