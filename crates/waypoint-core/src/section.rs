//! Anchorable content sections.

use serde::{Deserialize, Serialize};

/// A named, anchorable region of page content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    /// Anchor id, unique within a page.
    pub id: String,
    /// Human-readable title shown in menus.
    pub title: String,
}

impl Section {
    /// Creates a section.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}
