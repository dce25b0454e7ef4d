//! Prompt resolution for preset scenarios and custom edit instructions.

use crate::catalog::{Catalog, COLOR_TOKEN};
use crate::media::{GenerationKind, ScenarioOrigin};

/// Color value substituted when a colored template has no selection.
pub const DEFAULT_COLOR_VALUE: &str = "white";

/// What the user asked for, before it is turned into prompt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSpec {
    /// A catalog scenario, optionally with a color value.
    Preset {
        scenario_id: String,
        color: Option<String>,
    },
    /// A free-form edit instruction.
    Custom { text: String },
}

/// Prompt text ready for the gateway, plus what produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrompt {
    pub text: String,
    pub kind: GenerationKind,
    /// Set for preset prompts so the result can be traced back to its
    /// scenario without re-parsing the text.
    pub origin: Option<ScenarioOrigin>,
}

/// Replace every [`COLOR_TOKEN`] in `template`, defaulting to
/// [`DEFAULT_COLOR_VALUE`].
pub fn fill_template(template: &str, color: Option<&str>) -> String {
    template.replace(COLOR_TOKEN, color.unwrap_or(DEFAULT_COLOR_VALUE))
}

/// Wrap a custom instruction. Returns `None` for blank input.
pub fn custom_prompt(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    Some(format!(
        "Edit this image: {text}. Maintain product consistency. Output a high quality image."
    ))
}

/// Resolve a [`PromptSpec`] against the catalog.
///
/// Returns `None` when there is nothing to send: an unknown scenario, a
/// scenario without a template, or blank custom text. A color that the
/// scenario does not offer is ignored and the default color is used.
pub fn resolve_prompt(spec: &PromptSpec, catalog: &Catalog) -> Option<ResolvedPrompt> {
    match spec {
        PromptSpec::Preset { scenario_id, color } => {
            let scenario = catalog.get(scenario_id)?;
            let template = scenario.prompt_template.as_deref()?;
            let color = color
                .as_deref()
                .and_then(|value| scenario.color(value))
                .map(|c| c.value.clone());
            Some(ResolvedPrompt {
                text: fill_template(template, color.as_deref()),
                kind: GenerationKind::Preset,
                origin: Some(ScenarioOrigin {
                    scenario_id: scenario.id.clone(),
                    color,
                }),
            })
        }
        PromptSpec::Custom { text } => custom_prompt(text).map(|text| ResolvedPrompt {
            text,
            kind: GenerationKind::Custom,
            origin: None,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
