use axum::routing::{get, put};
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Routes mounted at `/session`.
///
/// ```text
/// GET    /                  get_session
/// PUT    /scenario          select_scenario
/// PUT    /color             select_color
/// PUT    /mode              set_mode
/// PUT    /custom-prompt     set_custom_prompt
/// GET    /source-image      get_source_image
/// PUT    /source-image      upload_source_image (multipart)
/// DELETE /source-image      clear_source_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(session::get_session))
        .route("/scenario", put(session::select_scenario))
        .route("/color", put(session::select_color))
        .route("/mode", put(session::set_mode))
        .route("/custom-prompt", put(session::set_custom_prompt))
        .route(
            "/source-image",
            get(session::get_source_image)
                .put(session::upload_source_image)
                .delete(session::clear_source_image),
        )
}
