//! Item Entity
//!
//! A single grocery-list entry, plus the normalization rule shared by
//! ordering and deduplication.

use serde::{Deserialize, Serialize};

/// Lower-cased, trimmed form of an item name.
///
/// Doubles as the sort key and the uniqueness key within a list.
pub fn normalized_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Which items the list view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Only items still to pick up (normal mode)
    #[default]
    NeededOnly,
    /// Every item, checked-off included (edit mode)
    ShowAll,
}

/// A grocery-list entry (matches the store document `{name, order, needed}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identifier, stable for the document's lifetime
    pub id: String,
    /// Display name, trimmed of surrounding whitespace
    pub name: String,
    /// `lower(trim(name))`; persisted as the `order` field
    #[serde(rename = "order")]
    pub normalized_key: String,
    /// true = still to pick up, false = checked off
    pub needed: bool,
}

impl Item {
    /// Create a new needed item; trims the name and derives the key.
    pub fn new(id: impl Into<String>, name: &str) -> Self {
        let name = name.trim().to_string();
        let normalized_key = normalized_key(&name);
        Self {
            id: id.into(),
            name,
            normalized_key,
            needed: true,
        }
    }

    /// Rename the item, keeping the key in sync.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.trim().to_string();
        self.normalized_key = normalized_key(&self.name);
    }
}
