use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::{export, storyboard};
use crate::state::AppState;

/// Routes mounted at `/storyboard`.
///
/// ```text
/// GET    /                  get_storyboard
/// POST   /items             promote_result
/// PATCH  /items/{id}        update_item
/// DELETE /items/{id}        remove_item
/// PUT    /visibility        set_visibility
/// GET    /branding          get_branding
/// PUT    /branding          set_branding
/// POST   /export            export_storyboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(storyboard::get_storyboard))
        .route("/items", post(storyboard::promote_result))
        .route(
            "/items/{id}",
            patch(storyboard::update_item).delete(storyboard::remove_item),
        )
        .route("/visibility", put(storyboard::set_visibility))
        .route(
            "/branding",
            get(storyboard::get_branding).put(storyboard::set_branding),
        )
        .route("/export", post(export::export_storyboard))
}
