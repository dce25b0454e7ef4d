//! Handlers for the storyboard: promoting results, editing item fields,
//! visibility, and sheet branding.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use nanomerch_core::export::SheetBranding;
use nanomerch_core::storyboard::{EditableField, StoryboardCollection, StoryboardItem};
use nanomerch_core::types::EntityId;

use crate::error::AppResult;
use crate::handlers::results::image_url;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    pub image_id: EntityId,
}

/// Overwrite one text field of an item.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub field: EditableField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SetVisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct StoryboardItemResponse {
    pub id: EntityId,
    pub image_id: EntityId,
    pub image_url: String,
    pub title: String,
    pub price: String,
    pub features: String,
    pub description: String,
}

impl From<&StoryboardItem> for StoryboardItemResponse {
    fn from(item: &StoryboardItem) -> Self {
        Self {
            id: item.id(),
            image_id: item.image().id(),
            image_url: image_url(item.image().id()),
            title: item.title.clone(),
            price: item.price.clone(),
            features: item.features.clone(),
            description: item.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoryboardResponse {
    pub visible: bool,
    pub items: Vec<StoryboardItemResponse>,
}

impl From<&StoryboardCollection> for StoryboardResponse {
    fn from(board: &StoryboardCollection) -> Self {
        Self {
            visible: board.is_visible(),
            items: board.items().iter().map(StoryboardItemResponse::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// GET /storyboard
// ---------------------------------------------------------------------------

pub async fn get_storyboard(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let studio = state.studio.read().await;
    Ok(Json(DataResponse {
        data: StoryboardResponse::from(studio.storyboard()),
    }))
}

// ---------------------------------------------------------------------------
// POST /storyboard/items
// ---------------------------------------------------------------------------

/// Promote a generated image into a new storyboard item.
///
/// Promoting the same image twice creates two independent items.
pub async fn promote_result(
    State(state): State<AppState>,
    Json(body): Json<PromoteRequest>,
) -> AppResult<impl IntoResponse> {
    let mut studio = state.studio.write().await;
    let item = studio.promote_result(body.image_id)?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StoryboardItemResponse::from(item),
        }),
    ))
}

// ---------------------------------------------------------------------------
// PATCH /storyboard/items/{id}
// ---------------------------------------------------------------------------

/// Update one field of an item. Unknown ids are ignored.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(body): Json<UpdateItemRequest>,
) -> AppResult<StatusCode> {
    state
        .studio
        .write()
        .await
        .update_storyboard_item(id, body.field, body.value);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// DELETE /storyboard/items/{id}
// ---------------------------------------------------------------------------

/// Remove an item. Unknown ids are ignored.
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    state.studio.write().await.remove_storyboard_item(id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// PUT /storyboard/visibility
// ---------------------------------------------------------------------------

pub async fn set_visibility(
    State(state): State<AppState>,
    Json(body): Json<SetVisibilityRequest>,
) -> AppResult<impl IntoResponse> {
    let mut studio = state.studio.write().await;
    if body.visible {
        studio.open_storyboard();
    } else {
        studio.close_storyboard();
    }
    Ok(Json(DataResponse {
        data: StoryboardResponse::from(studio.storyboard()),
    }))
}

// ---------------------------------------------------------------------------
// GET /storyboard/branding
// ---------------------------------------------------------------------------

pub async fn get_branding(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let studio = state.studio.read().await;
    Ok(Json(DataResponse {
        data: studio.branding().clone(),
    }))
}

// ---------------------------------------------------------------------------
// PUT /storyboard/branding
// ---------------------------------------------------------------------------

pub async fn set_branding(
    State(state): State<AppState>,
    Json(body): Json<SheetBranding>,
) -> AppResult<impl IntoResponse> {
    let mut studio = state.studio.write().await;
    studio.set_branding(body);
    Ok(Json(DataResponse {
        data: studio.branding().clone(),
    }))
}
