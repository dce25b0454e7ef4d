//! Handlers for the scenario catalog.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use nanomerch_core::catalog::{ColorOption, DefaultSpec, Scenario};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A scenario as presented to clients.
///
/// `colors` only lists the options actually offered, so a scenario whose
/// template has no color placeholder reports an empty list.
#[derive(Debug, Serialize)]
pub struct ScenarioResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub prompt_template: Option<String>,
    pub colors: Vec<ColorOption>,
    pub default_spec: Option<DefaultSpec>,
}

impl From<&Scenario> for ScenarioResponse {
    fn from(s: &Scenario) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            description: s.description.clone(),
            icon: s.icon.clone(),
            prompt_template: s.prompt_template.clone(),
            colors: s.color_options().to_vec(),
            default_spec: s.default_spec.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// GET /scenarios
// ---------------------------------------------------------------------------

/// List every scenario in catalog order.
pub async fn list_scenarios(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let studio = state.studio.read().await;
    let scenarios: Vec<ScenarioResponse> = studio
        .catalog()
        .all()
        .iter()
        .map(ScenarioResponse::from)
        .collect();

    tracing::debug!(count = scenarios.len(), "Listed scenarios");

    Ok(Json(DataResponse { data: scenarios }))
}
