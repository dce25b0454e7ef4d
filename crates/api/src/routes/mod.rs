pub mod health;
pub mod results;
pub mod scenarios;
pub mod session;
pub mod storyboard;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /scenarios                          list catalog
///
/// /session                            selection state (get)
/// /session/scenario                   select scenario (put)
/// /session/color                      select color (put)
/// /session/mode                       presets or custom (put)
/// /session/custom-prompt              custom prompt text (put)
/// /session/source-image               preview, upload, clear
///
/// /generations                        run one generation (post)
///
/// /results                            list results, newest first
/// /results/{id}/image                 download image bytes
///
/// /storyboard                         items + visibility (get)
/// /storyboard/items                   promote a result (post)
/// /storyboard/items/{id}              edit field (patch), remove (delete)
/// /storyboard/visibility              open / close (put)
/// /storyboard/branding                header and footer text (get, put)
/// /storyboard/export                  render document (post)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/scenarios", scenarios::router())
        .nest("/session", session::router())
        .merge(results::generation_router())
        .nest("/results", results::router())
        .nest("/storyboard", storyboard::router())
}
