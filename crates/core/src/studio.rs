//! The studio controller: all application state behind one owner.
//!
//! [`Studio`] holds the catalog, the user's current selection, the uploaded
//! source image, the generation session, the storyboard and the sheet
//! branding. Presentation layers hold it (behind whatever lock they need)
//! and call its methods; there is no other shared state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ColorOption, Scenario};
use crate::error::CoreError;
use crate::export::{ExportError, SheetBranding, StoryboardSheet};
use crate::gateway::{GatewayError, ImageGateway};
use crate::media::{GeneratedImage, ImagePayload};
use crate::prompt::PromptSpec;
use crate::session::{GenerationError, GenerationRequest, GenerationSession, PendingGeneration};
use crate::storyboard::{EditableField, StoryboardCollection, StoryboardItem};
use crate::types::EntityId;

/// Which input panel drives generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    Presets,
    Custom,
}

/// The user's current generation inputs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    pub mode: GenerationMode,
    pub scenario_id: Option<String>,
    pub color: Option<ColorOption>,
    pub custom_prompt: String,
}

#[derive(Debug)]
pub struct Studio {
    catalog: Catalog,
    selection: Selection,
    source: Option<Arc<ImagePayload>>,
    session: GenerationSession,
    storyboard: StoryboardCollection,
    branding: SheetBranding,
    exporting: bool,
}

impl Studio {
    /// Create a studio and auto-select the first catalog scenario.
    pub fn new(catalog: Catalog) -> Self {
        let mut studio = Self {
            catalog,
            selection: Selection::default(),
            source: None,
            session: GenerationSession::new(),
            storyboard: StoryboardCollection::new(),
            branding: SheetBranding::default(),
            exporting: false,
        };
        if let Some(first) = studio.catalog.first() {
            let id = first.id.clone();
            studio.apply_scenario(&id);
        }
        studio
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // -- Selection ----------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_scenario(&self) -> Option<&Scenario> {
        self.selection
            .scenario_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }

    /// Select a scenario. Auto-selects its first color, or clears the color
    /// when it offers none.
    pub fn select_scenario(&mut self, scenario_id: &str) -> Result<&Scenario, CoreError> {
        if self.catalog.get(scenario_id).is_none() {
            return Err(CoreError::NotFound {
                entity: "Scenario",
                id: scenario_id.to_string(),
            });
        }
        self.apply_scenario(scenario_id);
        tracing::debug!(scenario_id, color = ?self.selection.color.as_ref().map(|c| &c.value), "Scenario selected");
        self.selected_scenario()
            .ok_or_else(|| CoreError::Internal("selected scenario vanished".to_string()))
    }

    fn apply_scenario(&mut self, scenario_id: &str) {
        let color = self
            .catalog
            .get(scenario_id)
            .and_then(Scenario::default_color)
            .cloned();
        self.selection.scenario_id = Some(scenario_id.to_string());
        self.selection.color = color;
    }

    /// Select one of the current scenario's colors by value.
    pub fn select_color(&mut self, value: &str) -> Result<&ColorOption, CoreError> {
        let scenario = self.selected_scenario().ok_or_else(|| {
            CoreError::Validation("Select a scenario before choosing a color".to_string())
        })?;
        let color = scenario
            .color(value)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "ColorOption",
                id: value.to_string(),
            })?;
        Ok(self.selection.color.insert(color))
    }

    pub fn set_mode(&mut self, mode: GenerationMode) {
        self.selection.mode = mode;
    }

    pub fn set_custom_prompt(&mut self, text: impl Into<String>) {
        self.selection.custom_prompt = text.into();
    }

    // -- Source image -------------------------------------------------------

    pub fn source_image(&self) -> Option<&ImagePayload> {
        self.source.as_deref()
    }

    pub fn set_source_image(&mut self, payload: ImagePayload) {
        tracing::info!(
            mime_type = payload.mime_type(),
            bytes = payload.len(),
            "Source image set"
        );
        self.source = Some(Arc::new(payload));
    }

    pub fn clear_source_image(&mut self) {
        self.source = None;
    }

    // -- Generation ---------------------------------------------------------

    pub fn session(&self) -> &GenerationSession {
        &self.session
    }

    /// The session input implied by the current selection.
    pub fn generation_request(&self) -> GenerationRequest {
        let prompt = match self.selection.mode {
            GenerationMode::Presets => {
                self.selection
                    .scenario_id
                    .clone()
                    .map(|scenario_id| PromptSpec::Preset {
                        scenario_id,
                        color: self.selection.color.as_ref().map(|c| c.value.clone()),
                    })
            }
            GenerationMode::Custom => Some(PromptSpec::Custom {
                text: self.selection.custom_prompt.clone(),
            }),
        };
        GenerationRequest {
            source: self.source.clone(),
            prompt,
        }
    }

    pub fn begin_generation(&mut self) -> Result<PendingGeneration, GenerationError> {
        let request = self.generation_request();
        self.session.begin(&request, &self.catalog)
    }

    pub fn finish_generation(
        &mut self,
        pending: PendingGeneration,
        outcome: Result<ImagePayload, GatewayError>,
    ) -> Result<Arc<GeneratedImage>, GenerationError> {
        self.session.finish(pending, outcome)
    }

    /// Generate from the current selection, holding `&mut self` throughout.
    pub async fn generate(
        &mut self,
        gateway: &dyn ImageGateway,
    ) -> Result<Arc<GeneratedImage>, GenerationError> {
        let request = self.generation_request();
        self.session.generate(gateway, &request, &self.catalog).await
    }

    // -- Storyboard ---------------------------------------------------------

    pub fn storyboard(&self) -> &StoryboardCollection {
        &self.storyboard
    }

    /// Promote a result from the results list into the storyboard.
    pub fn promote_result(&mut self, image_id: EntityId) -> Result<&StoryboardItem, CoreError> {
        let image = self
            .session
            .find_result(image_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "GeneratedImage",
                id: image_id.to_string(),
            })?;
        Ok(self.storyboard.promote(image, &self.catalog))
    }

    pub fn update_storyboard_item(&mut self, id: EntityId, field: EditableField, value: String) {
        self.storyboard.update_field(id, field, value);
    }

    pub fn remove_storyboard_item(&mut self, id: EntityId) {
        self.storyboard.remove(id);
    }

    pub fn open_storyboard(&mut self) {
        self.storyboard.open();
    }

    pub fn close_storyboard(&mut self) {
        self.storyboard.close();
    }

    // -- Export -------------------------------------------------------------

    pub fn branding(&self) -> &SheetBranding {
        &self.branding
    }

    pub fn set_branding(&mut self, branding: SheetBranding) {
        self.branding = branding;
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Raise the export flag and snapshot the sheet for rendering.
    pub fn begin_export(&mut self) -> Result<StoryboardSheet, ExportError> {
        if self.exporting {
            return Err(ExportError::Busy);
        }
        self.exporting = true;
        Ok(StoryboardSheet {
            branding: self.branding.clone(),
            items: self.storyboard.items().to_vec(),
        })
    }

    /// Lower the export flag after success or failure.
    pub fn finish_export(&mut self) {
        self.exporting = false;
    }
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
