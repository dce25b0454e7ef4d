//! Merchandise scenario catalog.
//!
//! A [`Catalog`] is an ordered, read-only list of [`Scenario`] definitions.
//! Each scenario carries a prompt template (optionally containing the
//! [`COLOR_TOKEN`] placeholder), an optional color palette and optional
//! default sales copy used to seed storyboard items.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;

/// Placeholder substituted with the selected color value in prompt templates.
pub const COLOR_TOKEN: &str = "{color}";

// ---------------------------------------------------------------------------
// Built-in scenario identifiers
// ---------------------------------------------------------------------------

pub const SCENARIO_T_SHIRT: &str = "t-shirt";
pub const SCENARIO_HOODIE: &str = "hoodie";
pub const SCENARIO_BASEBALL_CAP: &str = "baseball-cap";
pub const SCENARIO_COFFEE_MUG: &str = "coffee-mug";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One selectable color within a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorOption {
    /// Human-readable label (e.g. "Sport Grey").
    pub label: String,
    /// Token substituted into the prompt template (e.g. "heather grey").
    pub value: String,
    /// Display color as a `#rrggbb` hex string.
    pub hex: String,
}

/// Default sales copy for a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultSpec {
    pub price: String,
    pub features: Vec<String>,
}

/// A catalog-defined merchandise template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Icon reference name resolved by the front end.
    pub icon: String,
    pub prompt_template: Option<String>,
    /// Ordered palette. Empty means no color choice.
    pub colors: Vec<ColorOption>,
    pub default_spec: Option<DefaultSpec>,
}

impl Scenario {
    /// Whether the template has a color slot to fill.
    pub fn has_color_token(&self) -> bool {
        self.prompt_template
            .as_deref()
            .is_some_and(|t| t.contains(COLOR_TOKEN))
    }

    /// Colors offered for selection.
    ///
    /// Empty when the scenario has no palette or its template has no
    /// [`COLOR_TOKEN`] to substitute.
    pub fn color_options(&self) -> &[ColorOption] {
        if self.has_color_token() {
            &self.colors
        } else {
            &[]
        }
    }

    /// Look up an offered color by its value token.
    pub fn color(&self, value: &str) -> Option<&ColorOption> {
        self.color_options().iter().find(|c| c.value == value)
    }

    /// The color auto-selected when this scenario is picked.
    pub fn default_color(&self) -> Option<&ColorOption> {
        self.color_options().first()
    }
}

/// Ordered, read-only collection of scenarios.
#[derive(Debug, Clone)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate scenario ids and duplicate color
    /// values within a scenario.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, CoreError> {
        validate_scenarios(&scenarios)?;
        Ok(Self { scenarios })
    }

    /// The four built-in merchandise scenarios.
    pub fn builtin() -> Self {
        Self {
            scenarios: builtin_scenarios(),
        }
    }

    pub fn all(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn first(&self) -> Option<&Scenario> {
        self.scenarios.first()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check catalog-wide and per-scenario uniqueness invariants.
pub fn validate_scenarios(scenarios: &[Scenario]) -> Result<(), CoreError> {
    let mut ids = HashSet::new();
    for scenario in scenarios {
        if scenario.id.trim().is_empty() {
            return Err(CoreError::Validation(
                "Scenario id must not be empty".to_string(),
            ));
        }
        if !ids.insert(scenario.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate scenario id '{}'",
                scenario.id
            )));
        }

        let mut values = HashSet::new();
        for color in &scenario.colors {
            if !values.insert(color.value.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate color value '{}' in scenario '{}'",
                    color.value, scenario.id
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Built-in data
// ---------------------------------------------------------------------------

fn color(label: &str, value: &str, hex: &str) -> ColorOption {
    ColorOption {
        label: label.to_string(),
        value: value.to_string(),
        hex: hex.to_string(),
    }
}

fn spec(price: &str, features: &[&str]) -> Option<DefaultSpec> {
    Some(DefaultSpec {
        price: price.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
    })
}

fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: SCENARIO_T_SHIRT.to_string(),
            name: "Gildan 5000 T-Shirt".to_string(),
            description: "Heavy cotton classic fit tee.".to_string(),
            icon: "Shirt".to_string(),
            prompt_template: Some(
                "Visualize this design printed on the front chest of a {color} Gildan 5000 \
                 Heavy Cotton T-Shirt. The shirt is isolated on a plain background. High \
                 resolution product photography, realistic fabric texture."
                    .to_string(),
            ),
            colors: vec![
                color("White", "white", "#ffffff"),
                color("Black", "black", "#18181b"),
                color("Navy", "navy blue", "#172554"),
                color("Sport Grey", "heather grey", "#9ca3af"),
                color("Red", "red", "#dc2626"),
                color("Royal", "royal blue", "#2563eb"),
                color("Military Green", "military green", "#4d5940"),
            ],
            default_spec: spec(
                "$10.98 each + tax",
                &[
                    "100% cotton jersey (preshrunk)",
                    "Classic fit with seamless double needle collar",
                    "Taped neck and shoulders",
                    "Tear away label",
                    "Sizes: S-3XL",
                ],
            ),
        },
        Scenario {
            id: SCENARIO_HOODIE.to_string(),
            name: "Pullover Hoodie".to_string(),
            description: "Cozy streetwear style hoodie.".to_string(),
            icon: "Layers".to_string(),
            prompt_template: Some(
                "Apply this design to the chest of a high-quality heather grey pullover \
                 hoodie isolated on a plain background. Urban style, realistic fabric folds \
                 and texture, studio lighting."
                    .to_string(),
            ),
            colors: Vec::new(),
            default_spec: spec(
                "$39.95 each + tax",
                &[
                    "50% cotton / 50% polyester fleece",
                    "Compact fleece fabric for low shrinkage",
                    "Double lined hood with drawstring",
                    "Pouch pocket",
                    "Rib knit cuffs and waistband",
                ],
            ),
        },
        Scenario {
            id: SCENARIO_BASEBALL_CAP.to_string(),
            name: "Baseball Cap".to_string(),
            description: "Embroidered classic dad hat.".to_string(),
            icon: "Sparkles".to_string(),
            prompt_template: Some(
                "Display this design embroidered on the front of a black classic baseball \
                 cap (dad hat style) sitting on a clean surface. Close up, high texture \
                 detail, professional product photography."
                    .to_string(),
            ),
            colors: Vec::new(),
            default_spec: spec(
                "$15.50 each + tax",
                &[
                    "100% cotton bio-washed twill",
                    "Unstructured, six-panel, low-profile",
                    "Pre-curved visor",
                    "Adjustable self-fabric back with tri-glide buckle",
                    "One size fits most",
                ],
            ),
        },
        Scenario {
            id: SCENARIO_COFFEE_MUG.to_string(),
            name: "Ceramic Mug".to_string(),
            description: "White ceramic coffee mug.".to_string(),
            icon: "Coffee".to_string(),
            prompt_template: Some(
                "Create a photorealistic image of this design printed on a white ceramic \
                 coffee mug sitting on a rustic wooden table. Morning sunlight lighting. \
                 High quality product photography."
                    .to_string(),
            ),
            colors: Vec::new(),
            default_spec: spec(
                "$8.50 each + tax",
                &[
                    "11oz Ceramic Mug",
                    "C-handle for comfortable grip",
                    "High gloss finish",
                    "Dishwasher and microwave safe",
                    "Lead-free",
                ],
            ),
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
