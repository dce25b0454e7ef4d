use axum::routing::get;
use axum::Router;

use crate::handlers::scenarios;
use crate::state::AppState;

/// Routes mounted at `/scenarios`.
///
/// ```text
/// GET    /        list_scenarios
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(scenarios::list_scenarios))
}
