//! Tag domain model.

use crate::model::entry::EntryId;
use serde::{Deserialize, Serialize};

/// String identifier of a tag document.
pub type TagId = String;

/// Named label attached to entries.
///
/// `id` stays empty until the tag is created; the gateway assigns one then.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: TagId,
    /// Display name, unique across tags.
    pub name: String,
    /// Display color, usually a `#RRGGBB` hex string.
    pub color: Option<String>,
    /// Ids of entries referencing this tag. Only filled on explicit request.
    #[serde(skip)]
    pub entries: Vec<EntryId>,
}

impl Tag {
    /// Creates an unsaved tag with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a tag with a caller-provided id.
    pub fn with_id(id: impl Into<TagId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style color setter.
    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}
