//! Diary entry domain model.
//!
//! # Responsibility
//! - Define the persisted entry document shape.
//! - Carry AI-derived metadata alongside user-authored content.
//!
//! # Invariants
//! - `id` is stable and never reused for another entry.
//! - `word_count` reflects `content` as of the last service write.
//! - `tags` is a read-side projection of `tag_ids` and is never serialized.

use crate::model::current_timestamp;
use crate::model::mood::Mood;
use crate::model::tag::{Tag, TagId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a diary entry.
pub type EntryId = Uuid;

/// One diary record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: EntryId,
    /// Stored as epoch milliseconds so range filters compare numerically.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub title: String,
    /// Markdown source text.
    pub content: String,
    /// Denormalized tag references, in user-assigned order.
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
    /// Hydrated tags resolved from `tag_ids`. Dangling ids are omitted.
    #[serde(skip)]
    pub tags: Vec<Tag>,
    pub mood: Option<Mood>,
    #[serde(default)]
    pub word_count: usize,
    pub summary: Option<String>,
    pub themes: Option<Vec<String>>,
    /// Unconstrained sentiment score produced by an AI service.
    pub sentiment_score: Option<f64>,
}

impl DiaryEntry {
    /// Creates an empty entry with a generated id and current timestamps.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Creates an empty entry with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: EntryId) -> Self {
        let now = current_timestamp();
        Self {
            id,
            created_at: now,
            updated_at: now,
            title: String::new(),
            content: String::new(),
            tag_ids: Vec::new(),
            tags: Vec::new(),
            mood: None,
            word_count: 0,
            summary: None,
            themes: None,
            sentiment_score: None,
        }
    }

    /// Creates an entry with title and content set.
    pub fn titled(title: impl Into<String>, content: impl Into<String>) -> Self {
        let mut entry = Self::new();
        entry.title = title.into();
        entry.content = content.into();
        entry
    }

    /// Returns whether `tag_id` is referenced by this entry.
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|id| id == tag_id)
    }

    /// Removes every reference to `tag_id` from both stored ids and
    /// hydrated tags. Returns whether anything was removed.
    pub fn detach_tag(&mut self, tag_id: &str) -> bool {
        let before = self.tag_ids.len();
        self.tag_ids.retain(|id| id != tag_id);
        self.tags.retain(|tag| tag.id != tag_id);
        self.tag_ids.len() != before
    }

    /// Returns whether any AI-derived field has been populated.
    pub fn has_insights(&self) -> bool {
        self.summary.is_some() || self.themes.is_some() || self.sentiment_score.is_some()
    }
}

impl Default for DiaryEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::DiaryEntry;
    use crate::model::tag::Tag;

    #[test]
    fn detach_tag_clears_ids_and_hydrated_tags() {
        let mut entry = DiaryEntry::new();
        entry.tag_ids = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        entry.tags = vec![Tag::with_id("a", "alpha"), Tag::with_id("b", "beta")];

        assert!(entry.detach_tag("a"));
        assert_eq!(entry.tag_ids, vec!["b".to_string()]);
        assert_eq!(entry.tags.len(), 1);
        assert!(!entry.detach_tag("a"));
    }

    #[test]
    fn has_insights_tracks_ai_fields() {
        let mut entry = DiaryEntry::new();
        assert!(!entry.has_insights());
        entry.sentiment_score = Some(-0.25);
        assert!(entry.has_insights());
    }
}
