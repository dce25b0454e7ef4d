//! Handlers for generated images in the results gallery.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use nanomerch_core::error::CoreError;
use nanomerch_core::media::{GeneratedImage, GenerationKind, ScenarioOrigin};
use nanomerch_core::types::{EntityId, Timestamp};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A generated image's metadata; the bytes are served separately.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub id: EntityId,
    pub prompt: String,
    pub kind: GenerationKind,
    pub origin: Option<ScenarioOrigin>,
    pub mime_type: String,
    pub created_at: Timestamp,
    pub image_url: String,
}

impl From<&GeneratedImage> for ResultResponse {
    fn from(img: &GeneratedImage) -> Self {
        Self {
            id: img.id(),
            prompt: img.prompt().to_string(),
            kind: img.kind(),
            origin: img.origin().cloned(),
            mime_type: img.payload().mime_type().to_string(),
            created_at: img.created_at(),
            image_url: image_url(img.id()),
        }
    }
}

/// Path under `/api/v1` serving a result's bytes.
pub fn image_url(id: EntityId) -> String {
    format!("/api/v1/results/{id}/image")
}

// ---------------------------------------------------------------------------
// GET /results
// ---------------------------------------------------------------------------

/// List generated images, newest first.
pub async fn list_results(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let studio = state.studio.read().await;
    let results: Vec<ResultResponse> = studio
        .session()
        .results()
        .iter()
        .map(|img| ResultResponse::from(img.as_ref()))
        .collect();

    Ok(Json(DataResponse { data: results }))
}

// ---------------------------------------------------------------------------
// GET /results/{id}/image
// ---------------------------------------------------------------------------

/// Download a generated image as `nanomerch-{id}.{ext}`.
pub async fn get_result_image(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Response> {
    let studio = state.studio.read().await;
    let image = studio
        .session()
        .find_result(id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound {
            entity: "GeneratedImage",
            id: id.to_string(),
        })?;
    drop(studio);

    Ok((
        [
            (CONTENT_TYPE, image.payload().mime_type().to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", image.file_name()),
            ),
        ],
        image.payload().data().to_vec(),
    )
        .into_response())
}
