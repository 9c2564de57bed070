//! Diary use-case service.
//!
//! # Responsibility
//! - Derive `word_count` from content before every entry write.
//! - Delegate all other entry/tag operations to the repository unchanged.
//! - Apply AI-derived insights to entries and persist them.
//!
//! # Invariants
//! - Words are runs of characters separated by space, tab, `\n` or `\r`.
//! - Store errors are returned as-is; the service adds no error taxonomy.

use crate::ai::AiService;
use crate::model::entry::{DiaryEntry, EntryId};
use crate::model::tag::Tag;
use crate::repo::diary_repo::{DiaryRepository, EntryListQuery};
use crate::store::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

const WORD_SEPARATORS: [char; 4] = [' ', '\t', '\n', '\r'];

/// Failure while applying AI insights to an entry.
#[derive(Debug)]
pub enum InsightError<E> {
    /// The AI provider failed; nothing was written.
    Ai(E),
    Store(StoreError),
}

impl<E: Display> Display for InsightError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ai(err) => write!(f, "ai insight failed: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl<E: Error + 'static> Error for InsightError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ai(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

/// Diary service facade over repository implementations.
pub struct DiaryService<R: DiaryRepository> {
    repo: R,
}

impl<R: DiaryRepository> DiaryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates an entry from title and markdown content.
    pub fn create_entry(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> StoreResult<DiaryEntry> {
        self.create_entry_with(DiaryEntry::titled(title, content))
    }

    /// Creates a caller-prepared entry (mood, tag ids, ...), recounting words.
    pub fn create_entry_with(&self, mut entry: DiaryEntry) -> StoreResult<DiaryEntry> {
        entry.word_count = count_words(&entry.content);
        self.repo.create_entry(entry)
    }

    pub fn get_entry(&self, id: EntryId) -> StoreResult<Option<DiaryEntry>> {
        self.repo.get_entry(id)
    }

    /// Lists entries created inside the optional inclusive window.
    pub fn list_entries(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<DiaryEntry>> {
        self.repo.list_entries(&EntryListQuery { start, end })
    }

    /// Recounts words and merge-writes the entry.
    pub fn update_entry(&self, mut entry: DiaryEntry) -> StoreResult<DiaryEntry> {
        entry.word_count = count_words(&entry.content);
        self.repo.update_entry(entry)
    }

    pub fn delete_entry(&self, id: EntryId) -> StoreResult<()> {
        self.repo.delete_entry(id)
    }

    pub fn search_entries(&self, query: &str) -> StoreResult<Vec<DiaryEntry>> {
        self.repo.search_entries(query)
    }

    pub fn create_tag(&self, tag: Tag) -> StoreResult<Tag> {
        self.repo.create_tag(tag)
    }

    pub fn get_tag(&self, id: &str) -> StoreResult<Option<Tag>> {
        self.repo.get_tag(id)
    }

    pub fn get_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        self.repo.get_tag_by_name(name)
    }

    pub fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        self.repo.list_tags()
    }

    pub fn update_tag(&self, tag: Tag) -> StoreResult<Tag> {
        self.repo.update_tag(tag)
    }

    pub fn delete_tag(&self, id: &str) -> StoreResult<()> {
        self.repo.delete_tag(id)
    }

    /// Gets one tag with `entries` filled by the ids of referencing entries,
    /// newest entry first.
    pub fn get_tag_with_entries(&self, id: &str) -> StoreResult<Option<Tag>> {
        let Some(mut tag) = self.repo.get_tag(id)? else {
            return Ok(None);
        };
        tag.entries = self
            .repo
            .list_entries_by_tag(id)?
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        Ok(Some(tag))
    }

    /// Runs the AI provider over the entry content and persists the result.
    ///
    /// Summary, themes and sentiment are always replaced. Mood is only
    /// filled when the entry has none, so a user-chosen mood wins.
    pub fn apply_insights<A: AiService>(
        &self,
        ai: &A,
        mut entry: DiaryEntry,
    ) -> Result<DiaryEntry, InsightError<A::Error>> {
        let content = entry.content.as_str();
        let summary = ai.generate_summary(content).map_err(InsightError::Ai)?;
        let themes = ai.extract_themes(content).map_err(InsightError::Ai)?;
        let sentiment = ai.analyze_sentiment(content).map_err(InsightError::Ai)?;
        let detected_mood = if entry.mood.is_none() {
            ai.detect_mood(content).map_err(InsightError::Ai)?
        } else {
            None
        };

        entry.summary = Some(summary);
        entry.themes = Some(themes);
        entry.sentiment_score = Some(sentiment);
        if detected_mood.is_some() {
            entry.mood = detected_mood;
        }

        debug!(
            "event=entry_insights module=service status=ok entry_id={} mood_detected={}",
            entry.id,
            detected_mood.is_some()
        );
        self.update_entry(entry).map_err(InsightError::Store)
    }
}

/// Counts whitespace-delimited, non-empty tokens.
pub fn count_words(content: &str) -> usize {
    content
        .split(WORD_SEPARATORS)
        .filter(|token| !token.is_empty())
        .count()
}
