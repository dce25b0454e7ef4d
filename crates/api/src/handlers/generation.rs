//! Handler that runs one generation against the image gateway.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::results::ResultResponse;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /generations
// ---------------------------------------------------------------------------

/// Generate an image from the current source image and selection.
///
/// The studio lock is only held to begin and to finish the attempt, never
/// across the gateway call. The gateway call and the bookkeeping that
/// follows run on a spawned task, so a dropped request still returns the
/// session to idle.
pub async fn create_generation(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<ResultResponse>>)> {
    let pending = state.studio.write().await.begin_generation()?;

    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        let outcome = task_state
            .gateway
            .generate(pending.source(), &pending.prompt().text)
            .await;
        let mut studio = task_state.studio.write().await;
        studio.finish_generation(pending, outcome)
    });

    let image = handle
        .await
        .map_err(|e| AppError::InternalError(format!("Generation task failed: {e}")))??;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ResultResponse::from(image.as_ref()),
        }),
    ))
}
