//! Scenario recovery for seeding storyboard items.
//!
//! Given a generated image, work out which catalog scenario produced it and
//! derive a (title, features, price) seed from that scenario's default spec.
//!
//! Images created by this crate carry a [`ScenarioOrigin`] and are resolved
//! directly. Images without one fall back to text matching over the prompt:
//!
//! 1. a scenario's display name appears in the prompt;
//! 2. the first ten characters of the first word of a scenario's template
//!    appear in the prompt;
//! 3. keywords (`mug`, `hoodie`, `cap`/`hat`, `T-Shirt`) in that order.
//!
//! Text matching is approximate. A wrong guess is not an error; the user
//! edits the seeded fields.
//!
//! [`ScenarioOrigin`]: crate::media::ScenarioOrigin

use crate::catalog::{
    Catalog, Scenario, SCENARIO_BASEBALL_CAP, SCENARIO_COFFEE_MUG, SCENARIO_HOODIE,
    SCENARIO_T_SHIRT,
};
use crate::media::{GeneratedImage, GenerationKind};

pub const FALLBACK_TITLE: &str = "Custom Product";
pub const FALLBACK_FEATURES: &str = "- High quality print\n- Durable material\n- Custom design";
pub const FALLBACK_PRICE: &str = "$0.00";

/// Prefix for each default feature line.
pub const FEATURE_BULLET: &str = "* ";

/// Length of the template fingerprint used by the second matching rule.
pub const TEMPLATE_FINGERPRINT_LEN: usize = 10;

/// Keyword rules, checked in order. The first rule with any keyword present
/// decides the scenario id.
const KEYWORD_RULES: &[(&[&str], &str)] = &[
    (&["mug"], SCENARIO_COFFEE_MUG),
    (&["hoodie"], SCENARIO_HOODIE),
    (&["cap", "hat"], SCENARIO_BASEBALL_CAP),
    (&["T-Shirt"], SCENARIO_T_SHIRT),
];

/// Initial editable fields for a new storyboard item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDefaults {
    pub title: String,
    pub features: String,
    pub price: String,
}

impl SeedDefaults {
    /// Generic placeholder used when no scenario is recognised.
    pub fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            features: FALLBACK_FEATURES.to_string(),
            price: FALLBACK_PRICE.to_string(),
        }
    }

    /// Seed from a scenario's name and default spec. Features and price are
    /// empty when the scenario has no default spec.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let (features, price) = match &scenario.default_spec {
            Some(spec) => (bullet_list(&spec.features), spec.price.clone()),
            None => (String::new(), String::new()),
        };
        Self {
            title: scenario.name.clone(),
            features,
            price,
        }
    }
}

/// Which rule recognised the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Origin,
    DisplayName,
    TemplateFingerprint,
    Keyword,
}

/// Seed fields for a storyboard item promoted from `image`.
pub fn recover_defaults(image: &GeneratedImage, catalog: &Catalog) -> SeedDefaults {
    match match_scenario(image, catalog) {
        Some((scenario, rule)) => {
            tracing::debug!(image_id = %image.id(), scenario_id = %scenario.id, ?rule, "Recovered scenario");
            SeedDefaults::from_scenario(scenario)
        }
        None => SeedDefaults::fallback(),
    }
}

/// Find the scenario behind `image`. Custom images never match.
pub fn match_scenario<'a>(
    image: &GeneratedImage,
    catalog: &'a Catalog,
) -> Option<(&'a Scenario, MatchRule)> {
    if image.kind() == GenerationKind::Custom {
        return None;
    }
    if let Some(scenario) = image.origin().and_then(|o| catalog.get(&o.scenario_id)) {
        return Some((scenario, MatchRule::Origin));
    }
    match_prompt(image.prompt(), catalog)
}

/// Text-only matching over a preset prompt.
pub fn match_prompt<'a>(prompt: &str, catalog: &'a Catalog) -> Option<(&'a Scenario, MatchRule)> {
    if let Some(scenario) = catalog.all().iter().find(|s| prompt.contains(&s.name)) {
        return Some((scenario, MatchRule::DisplayName));
    }

    if let Some(scenario) = catalog.all().iter().find(|s| {
        s.prompt_template
            .as_deref()
            .and_then(template_fingerprint)
            .is_some_and(|fp| prompt.contains(fp))
    }) {
        return Some((scenario, MatchRule::TemplateFingerprint));
    }

    let (_, scenario_id) = KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| prompt.contains(k)))?;
    catalog.get(scenario_id).map(|s| (s, MatchRule::Keyword))
}

/// First word of the template, truncated to [`TEMPLATE_FINGERPRINT_LEN`]
/// characters. `None` for an empty first word, which would match anything.
fn template_fingerprint(template: &str) -> Option<&str> {
    let word = template.split(' ').next().unwrap_or_default();
    let end = word
        .char_indices()
        .nth(TEMPLATE_FINGERPRINT_LEN)
        .map_or(word.len(), |(i, _)| i);
    let fingerprint = &word[..end];
    (!fingerprint.is_empty()).then_some(fingerprint)
}

fn bullet_list(features: &[String]) -> String {
    features
        .iter()
        .map(|f| format!("{FEATURE_BULLET}{f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DefaultSpec;
    use crate::media::{ImagePayload, ScenarioOrigin};
    use crate::prompt::ResolvedPrompt;

    fn image(text: &str, kind: GenerationKind, origin: Option<&str>) -> GeneratedImage {
        GeneratedImage::new(
            ImagePayload::new("image/png", vec![0]),
            ResolvedPrompt {
                text: text.to_string(),
                kind,
                origin: origin.map(|id| ScenarioOrigin {
                    scenario_id: id.to_string(),
                    color: None,
                }),
            },
        )
    }

    fn legacy(text: &str) -> GeneratedImage {
        image(text, GenerationKind::Preset, None)
    }

    fn matched_id(text: &str) -> Option<(String, MatchRule)> {
        let catalog = Catalog::builtin();
        match_prompt(text, &catalog).map(|(s, rule)| (s.id.clone(), rule))
    }

    // -- Seeds --

    #[test]
    fn cap_prompt_seeds_baseball_cap() {
        let seed = recover_defaults(
            &legacy(
                "Display this design embroidered on the front of a black classic baseball \
                 cap (dad hat style) sitting on a clean surface.",
            ),
            &Catalog::builtin(),
        );
        assert_eq!(seed.title, "Baseball Cap");
        assert_eq!(seed.price, "$15.50 each + tax");
        let lines: Vec<_> = seed.features.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.starts_with("* ")));
        assert_eq!(lines[0], "* 100% cotton bio-washed twill");
    }

    #[test]
    fn custom_image_always_falls_back() {
        let seed = recover_defaults(
            &image("Ceramic Mug on a hoodie", GenerationKind::Custom, Some("coffee-mug")),
            &Catalog::builtin(),
        );
        assert_eq!(seed, SeedDefaults::fallback());
    }

    #[test]
    fn unmatched_preset_falls_back() {
        let seed = recover_defaults(&legacy("A vintage poster on a brick wall"), &Catalog::builtin());
        assert_eq!(seed.title, "Custom Product");
        assert_eq!(
            seed.features,
            "- High quality print\n- Durable material\n- Custom design"
        );
        assert_eq!(seed.price, "$0.00");
    }

    #[test]
    fn recovery_is_deterministic() {
        let catalog = Catalog::builtin();
        let img = legacy("Visualize this design on a red shirt");
        assert_eq!(recover_defaults(&img, &catalog), recover_defaults(&img, &catalog));
    }

    #[test]
    fn scenario_without_spec_seeds_empty_copy() {
        let scenario = Scenario {
            id: "poster".to_string(),
            name: "Wall Poster".to_string(),
            description: String::new(),
            icon: String::new(),
            prompt_template: None,
            colors: Vec::new(),
            default_spec: None,
        };
        let seed = SeedDefaults::from_scenario(&scenario);
        assert_eq!(seed.title, "Wall Poster");
        assert_eq!(seed.features, "");
        assert_eq!(seed.price, "");
    }

    #[test]
    fn spec_features_are_bulleted_in_order() {
        let scenario = Scenario {
            id: "tote".to_string(),
            name: "Tote".to_string(),
            description: String::new(),
            icon: String::new(),
            prompt_template: None,
            colors: Vec::new(),
            default_spec: Some(DefaultSpec {
                price: "$5".to_string(),
                features: vec!["Canvas".to_string(), "Long handles".to_string()],
            }),
        };
        assert_eq!(
            SeedDefaults::from_scenario(&scenario).features,
            "* Canvas\n* Long handles"
        );
    }

    // -- Origin --

    #[test]
    fn origin_wins_over_text() {
        let catalog = Catalog::builtin();
        let img = image(
            "Create a photorealistic image of this design on a mug",
            GenerationKind::Preset,
            Some(SCENARIO_HOODIE),
        );
        let (scenario, rule) = match_scenario(&img, &catalog).unwrap();
        assert_eq!(scenario.id, SCENARIO_HOODIE);
        assert_eq!(rule, MatchRule::Origin);
    }

    #[test]
    fn unknown_origin_falls_through_to_text() {
        let catalog = Catalog::builtin();
        let img = image("a coffee mug", GenerationKind::Preset, Some("retired"));
        let (scenario, rule) = match_scenario(&img, &catalog).unwrap();
        assert_eq!(scenario.id, SCENARIO_COFFEE_MUG);
        assert_eq!(rule, MatchRule::Keyword);
    }

    // -- Text rules --

    #[test]
    fn display_name_matches_first() {
        assert_eq!(
            matched_id("Create a Pullover Hoodie mockup"),
            Some((SCENARIO_HOODIE.to_string(), MatchRule::DisplayName))
        );
    }

    #[test]
    fn template_fingerprint_matches_generated_prompts() {
        let catalog = Catalog::builtin();
        for scenario in catalog.all() {
            let prompt = crate::prompt::fill_template(
                scenario.prompt_template.as_deref().unwrap(),
                Some("black"),
            );
            let (found, _) = match_prompt(&prompt, &catalog).unwrap();
            assert_eq!(found.id, scenario.id);
        }
    }

    #[test]
    fn fingerprint_is_first_word_truncated() {
        assert_eq!(template_fingerprint("Visualize this"), Some("Visualize"));
        assert_eq!(template_fingerprint("Photorealistic render"), Some("Photoreali"));
        assert_eq!(template_fingerprint(" leading space"), None);
    }

    #[test]
    fn template_with_leading_space_does_not_match_every_prompt() {
        let catalog = Catalog::new(vec![Scenario {
            id: "poster".to_string(),
            name: "Wall Poster".to_string(),
            description: String::new(),
            icon: "image".to_string(),
            prompt_template: Some(" on a poster".to_string()),
            colors: Vec::new(),
            default_spec: None,
        }])
        .unwrap();
        assert!(match_prompt("Place this design on a tote bag", &catalog).is_none());
    }

    #[test]
    fn keyword_mug_takes_priority() {
        assert_eq!(
            matched_id("a mug next to a hoodie"),
            Some((SCENARIO_COFFEE_MUG.to_string(), MatchRule::Keyword))
        );
    }

    #[test]
    fn keyword_hat_matches_cap() {
        assert_eq!(
            matched_id("a straw hat on the beach"),
            Some((SCENARIO_BASEBALL_CAP.to_string(), MatchRule::Keyword))
        );
    }

    #[test]
    fn keyword_t_shirt_is_case_sensitive() {
        assert_eq!(
            matched_id("a folded T-Shirt"),
            Some((SCENARIO_T_SHIRT.to_string(), MatchRule::Keyword))
        );
        assert_eq!(matched_id("a folded t-shirt"), None);
    }

    #[test]
    fn keyword_for_missing_scenario_does_not_fall_through() {
        let catalog = Catalog::new(vec![Catalog::builtin()
            .get(SCENARIO_T_SHIRT)
            .unwrap()
            .clone()])
        .unwrap();
        // "mug" picks the coffee-mug rule even though the T-Shirt rule would match.
        assert!(match_prompt("a mug and a T-Shirt", &catalog).is_none());
    }
}
