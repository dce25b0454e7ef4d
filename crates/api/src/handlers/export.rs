//! Handler that renders the storyboard into a downloadable document.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use nanomerch_core::export::{validate_export_options, ExportOptions};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /storyboard/export
// ---------------------------------------------------------------------------

/// Export the storyboard as a print-ready document.
///
/// The body is an optional JSON [`ExportOptions`]; an empty body uses the
/// defaults. Only one export runs at a time. Rendering happens on the
/// blocking pool, and the export flag is lowered whether or not it succeeds.
pub async fn export_storyboard(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let options = if body.is_empty() {
        ExportOptions::default()
    } else {
        serde_json::from_slice::<ExportOptions>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid export options: {e}")))?
    };
    validate_export_options(&options)?;

    let sheet = state.studio.write().await.begin_export()?;
    tracing::info!(items = sheet.items.len(), "Storyboard export started");

    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        let exporter = Arc::clone(&task_state.exporter);
        let rendered =
            tokio::task::spawn_blocking(move || exporter.export(&sheet, &options)).await;
        task_state.studio.write().await.finish_export();
        rendered
    });

    let document = handle
        .await
        .and_then(|rendered| rendered)
        .map_err(|e| AppError::InternalError(format!("Export task failed: {e}")))??;

    tracing::info!(
        file_name = %document.file_name,
        bytes = document.bytes.len(),
        "Storyboard export completed"
    );

    Ok((
        [
            (CONTENT_TYPE, document.mime_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        document.bytes,
    )
        .into_response())
}
