//! Route definitions for generation and its results.
//!
//! ```text
//! GENERATIONS (merged at the API root):
//! POST   /generations          create_generation
//!
//! RESULTS (mounted at /results):
//! GET    /                     list_results
//! GET    /{id}/image           get_result_image
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generation, results};
use crate::state::AppState;

/// Generation route -- merged at the API root.
pub fn generation_router() -> Router<AppState> {
    Router::new().route("/generations", post(generation::create_generation))
}

/// Result routes -- mounted at `/results`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(results::list_results))
        .route("/{id}/image", get(results::get_result_image))
}
