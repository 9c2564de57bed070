//! Store validation and sample-data utilities.
//!
//! # Responsibility
//! - Exercise gateway read paths to confirm the store is reachable.
//! - Seed one sample tag and entry for manual smoke testing.

use crate::model::entry::DiaryEntry;
use crate::model::mood::Mood;
use crate::model::tag::Tag;
use crate::repo::diary_repo::{DiaryRepository, EntryListQuery};
use crate::service::diary_service::DiaryService;
use crate::store::StoreResult;
use log::{info, warn};

pub const SAMPLE_TAG_NAME: &str = "Sample Tag";
pub const SAMPLE_TAG_COLOR: &str = "#FF5722";
pub const SAMPLE_ENTRY_TITLE: &str = "Welcome to ThinkDiary!";
pub const SAMPLE_ENTRY_CONTENT: &str = "This is a sample diary entry created by the \
    smoke-test utility. If you can read it back, the document store is wired up correctly.";

const RECENT_ENTRY_LIMIT: usize = 3;
const TAG_PREVIEW_LIMIT: usize = 5;

/// Read-back snapshot of the store contents.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSummary {
    pub entry_count: usize,
    pub tag_count: usize,
    /// Up to three entries, newest first.
    pub recent_entries: Vec<DiaryEntry>,
    /// Up to five tags, sorted by name.
    pub tags: Vec<Tag>,
}

/// Lists every entry and tag and summarizes them.
pub fn validate_store<R: DiaryRepository>(repo: &R) -> StoreResult<StoreSummary> {
    let entries = match repo.list_entries(&EntryListQuery::all()) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("event=store_validate module=validation status=error stage=entries error={err}");
            return Err(err);
        }
    };
    let tags = match repo.list_tags() {
        Ok(tags) => tags,
        Err(err) => {
            warn!("event=store_validate module=validation status=error stage=tags error={err}");
            return Err(err);
        }
    };

    info!(
        "event=store_validate module=validation status=ok entries={} tags={}",
        entries.len(),
        tags.len()
    );
    Ok(StoreSummary {
        entry_count: entries.len(),
        tag_count: tags.len(),
        recent_entries: entries.into_iter().take(RECENT_ENTRY_LIMIT).collect(),
        tags: tags.into_iter().take(TAG_PREVIEW_LIMIT).collect(),
    })
}

/// Inserts the sample tag (reused when the name already exists) and one
/// sample entry tagged with it.
pub fn create_sample_data<R: DiaryRepository>(
    service: &DiaryService<R>,
) -> StoreResult<(Tag, DiaryEntry)> {
    let tag = match service.get_tag_by_name(SAMPLE_TAG_NAME)? {
        Some(existing) => existing,
        None => service.create_tag(Tag::named(SAMPLE_TAG_NAME).colored(SAMPLE_TAG_COLOR))?,
    };

    let mut entry = DiaryEntry::titled(SAMPLE_ENTRY_TITLE, SAMPLE_ENTRY_CONTENT);
    entry.mood = Some(Mood::Happy);
    entry.tag_ids = vec![tag.id.clone()];
    let mut entry = service.create_entry_with(entry)?;
    entry.tags = vec![tag.clone()];

    info!(
        "event=sample_data module=validation status=ok tag_id={} entry_id={}",
        tag.id, entry.id
    );
    Ok((tag, entry))
}
