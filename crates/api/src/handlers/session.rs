//! Handlers for the studio's selection state and source image.
//!
//! Every mutating endpoint answers with the full [`SessionResponse`] so the
//! client can re-render from a single payload.

use axum::extract::{Multipart, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use nanomerch_core::error::CoreError;
use nanomerch_core::media::ImagePayload;
use nanomerch_core::session::SessionStatus;
use nanomerch_core::studio::{GenerationMode, Selection, Studio};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the source image.
const SOURCE_IMAGE_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SelectScenarioRequest {
    pub scenario_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectColorRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: GenerationMode,
}

#[derive(Debug, Deserialize)]
pub struct SetCustomPromptRequest {
    pub text: String,
}

/// Metadata about the selected source image.
#[derive(Debug, Serialize)]
pub struct SourceImageInfo {
    pub mime_type: String,
    pub size_bytes: usize,
}

/// Snapshot of the studio session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub selection: Selection,
    pub status: SessionStatus,
    /// User-visible error from the last failed generation, if any.
    pub error: Option<&'static str>,
    pub source_image: Option<SourceImageInfo>,
    pub result_count: usize,
    pub storyboard_count: usize,
    pub storyboard_visible: bool,
    pub exporting: bool,
}

impl SessionResponse {
    pub fn from_studio(studio: &Studio) -> Self {
        Self {
            selection: studio.selection().clone(),
            status: studio.session().status(),
            error: studio.session().last_error(),
            source_image: studio.source_image().map(|img| SourceImageInfo {
                mime_type: img.mime_type().to_string(),
                size_bytes: img.len(),
            }),
            result_count: studio.session().results().len(),
            storyboard_count: studio.storyboard().len(),
            storyboard_visible: studio.storyboard().is_visible(),
            exporting: studio.is_exporting(),
        }
    }
}

fn session_json(studio: &Studio) -> Json<DataResponse<SessionResponse>> {
    Json(DataResponse {
        data: SessionResponse::from_studio(studio),
    })
}

// ---------------------------------------------------------------------------
// GET /session
// ---------------------------------------------------------------------------

pub async fn get_session(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let studio = state.studio.read().await;
    Ok(session_json(&studio))
}

// ---------------------------------------------------------------------------
// PUT /session/scenario
// ---------------------------------------------------------------------------

/// Select a scenario; its default color is selected with it.
pub async fn select_scenario(
    State(state): State<AppState>,
    Json(body): Json<SelectScenarioRequest>,
) -> AppResult<impl IntoResponse> {
    let mut studio = state.studio.write().await;
    studio.select_scenario(&body.scenario_id)?;

    tracing::debug!(scenario_id = %body.scenario_id, "Scenario selected");

    Ok(session_json(&studio))
}

// ---------------------------------------------------------------------------
// PUT /session/color
// ---------------------------------------------------------------------------

pub async fn select_color(
    State(state): State<AppState>,
    Json(body): Json<SelectColorRequest>,
) -> AppResult<impl IntoResponse> {
    let mut studio = state.studio.write().await;
    studio.select_color(&body.value)?;
    Ok(session_json(&studio))
}

// ---------------------------------------------------------------------------
// PUT /session/mode
// ---------------------------------------------------------------------------

pub async fn set_mode(
    State(state): State<AppState>,
    Json(body): Json<SetModeRequest>,
) -> AppResult<impl IntoResponse> {
    let mut studio = state.studio.write().await;
    studio.set_mode(body.mode);
    Ok(session_json(&studio))
}

// ---------------------------------------------------------------------------
// PUT /session/custom-prompt
// ---------------------------------------------------------------------------

/// Store the custom prompt text verbatim; blank text is rejected at
/// generation time, not here.
pub async fn set_custom_prompt(
    State(state): State<AppState>,
    Json(body): Json<SetCustomPromptRequest>,
) -> AppResult<impl IntoResponse> {
    let mut studio = state.studio.write().await;
    studio.set_custom_prompt(body.text);
    Ok(session_json(&studio))
}

// ---------------------------------------------------------------------------
// GET /session/source-image
// ---------------------------------------------------------------------------

/// Return the raw bytes of the selected source image for preview.
pub async fn get_source_image(State(state): State<AppState>) -> AppResult<Response> {
    let studio = state.studio.read().await;
    let source = studio.source_image().ok_or_else(|| CoreError::NotFound {
        entity: "SourceImage",
        id: "current".to_string(),
    })?;

    Ok((
        [(CONTENT_TYPE, source.mime_type().to_string())],
        source.data().to_vec(),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// PUT /session/source-image
// ---------------------------------------------------------------------------

/// Replace the source image from a multipart upload with a `file` field.
///
/// The upload must declare an `image/*` content type.
pub async fn upload_source_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(SOURCE_IMAGE_FIELD) {
            continue; // ignore unknown fields
        }
        let mime_type = field.content_type().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((mime_type, data.to_vec()));
    }

    let (mime_type, data) = upload.ok_or_else(|| {
        AppError::BadRequest(format!("Missing required '{SOURCE_IMAGE_FIELD}' field"))
    })?;

    let payload = ImagePayload::source(&mime_type, data)?;

    tracing::info!(
        mime_type = %payload.mime_type(),
        size_bytes = payload.len(),
        "Source image selected"
    );

    let mut studio = state.studio.write().await;
    studio.set_source_image(payload);
    Ok(session_json(&studio))
}

// ---------------------------------------------------------------------------
// DELETE /session/source-image
// ---------------------------------------------------------------------------

pub async fn clear_source_image(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut studio = state.studio.write().await;
    studio.clear_source_image();
    Ok(session_json(&studio))
}
