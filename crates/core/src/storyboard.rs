//! Storyboard collection: the editable, ordered catalog sheet.
//!
//! Items are appended on promotion, edited field by field, and removed.
//! Insertion order is display order. Edits and removals addressed to an
//! unknown id are silently ignored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::media::GeneratedImage;
use crate::recovery::recover_defaults;
use crate::types::EntityId;

/// User-editable fields of a [`StoryboardItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    Title,
    Price,
    Features,
    Description,
}

/// One entry of the storyboard.
#[derive(Debug, Clone)]
pub struct StoryboardItem {
    id: EntityId,
    image: Arc<GeneratedImage>,
    pub title: String,
    pub price: String,
    /// Newline-separated feature text.
    pub features: String,
    pub description: String,
}

impl StoryboardItem {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The generated image this item was promoted from.
    pub fn image(&self) -> &Arc<GeneratedImage> {
        &self.image
    }

    pub fn field(&self, field: EditableField) -> &str {
        match field {
            EditableField::Title => &self.title,
            EditableField::Price => &self.price,
            EditableField::Features => &self.features,
            EditableField::Description => &self.description,
        }
    }

    fn set(&mut self, field: EditableField, value: String) {
        let slot = match field {
            EditableField::Title => &mut self.title,
            EditableField::Price => &mut self.price,
            EditableField::Features => &mut self.features,
            EditableField::Description => &mut self.description,
        };
        *slot = value;
    }
}

/// Ordered list of storyboard items plus the view's visibility flag.
#[derive(Debug, Default)]
pub struct StoryboardCollection {
    items: Vec<StoryboardItem>,
    visible: bool,
}

impl StoryboardCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new item backed by `image`, seeded from its scenario, and
    /// make the storyboard view visible.
    pub fn promote(&mut self, image: Arc<GeneratedImage>, catalog: &Catalog) -> &StoryboardItem {
        let seed = recover_defaults(&image, catalog);
        let item = StoryboardItem {
            id: uuid::Uuid::new_v4(),
            image,
            title: seed.title,
            price: seed.price,
            features: seed.features,
            description: String::new(),
        };

        tracing::info!(
            item_id = %item.id,
            image_id = %item.image.id(),
            title = %item.title,
            "Promoted image to storyboard"
        );

        self.visible = true;
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Replace one field of the item with `id`. No-op for unknown ids.
    pub fn update_field(&mut self, id: EntityId, field: EditableField, value: String) {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => item.set(field, value),
            None => tracing::debug!(item_id = %id, ?field, "Ignoring edit for unknown storyboard item"),
        }
    }

    /// Remove the item with `id`, keeping the order of the rest. No-op for
    /// unknown ids.
    pub fn remove(&mut self, id: EntityId) {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() < before {
            tracing::info!(item_id = %id, "Removed storyboard item");
        }
    }

    pub fn items(&self) -> &[StoryboardItem] {
        &self.items
    }

    pub fn get(&self, id: EntityId) -> Option<&StoryboardItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn open(&mut self) {
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
