//! Entry/tag repository contracts and document-store implementation.
//!
//! # Responsibility
//! - Provide CRUD for entries and tags on top of two document collections.
//! - Resolve `tag_ids` into hydrated tags, one batch lookup per read.
//! - Cascade tag deletion into referencing entries.
//!
//! # Invariants
//! - Entry lists are ordered by `created_at DESC, id ASC`.
//! - Range bounds are inclusive on both ends.
//! - Update paths always refresh `updated_at` and use merge writes.
//! - Entries with a NaN or infinite sentiment score are never written.
//! - Tag deletion is not transactional: entries are detached one by one
//!   before the tag document is removed.

use crate::model::current_timestamp;
use crate::model::entry::{DiaryEntry, EntryId};
use crate::model::tag::{Tag, TagId};
use crate::store::{
    DocumentQuery, DocumentStore, SetMode, SortDirection, StoreError, StoreResult,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Collection holding entry documents keyed by entry id.
pub const ENTRIES_COLLECTION: &str = "diary_entries";
/// Collection holding tag documents keyed by tag id.
pub const TAGS_COLLECTION: &str = "tags";

const CREATED_AT_FIELD: &str = "created_at";
const TAG_IDS_FIELD: &str = "tag_ids";
const NAME_FIELD: &str = "name";

/// Optional inclusive creation-time window for entry listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryListQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl EntryListQuery {
    /// Unbounded query returning every entry.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Repository interface for diary entries and tags.
pub trait DiaryRepository {
    /// Stamps both timestamps with now and writes the full document.
    fn create_entry(&self, entry: DiaryEntry) -> StoreResult<DiaryEntry>;
    /// Gets one entry with hydrated tags.
    fn get_entry(&self, id: EntryId) -> StoreResult<Option<DiaryEntry>>;
    /// Lists entries in the creation window, newest first.
    fn list_entries(&self, query: &EntryListQuery) -> StoreResult<Vec<DiaryEntry>>;
    /// Refreshes `updated_at` and merge-writes the entry.
    fn update_entry(&self, entry: DiaryEntry) -> StoreResult<DiaryEntry>;
    fn delete_entry(&self, id: EntryId) -> StoreResult<()>;
    /// Case-insensitive substring search over title and content.
    fn search_entries(&self, query: &str) -> StoreResult<Vec<DiaryEntry>>;
    /// Lists entries whose `tag_ids` contain `tag_id`.
    fn list_entries_by_tag(&self, tag_id: &str) -> StoreResult<Vec<DiaryEntry>>;

    /// Writes a tag, generating an id when it has none.
    fn create_tag(&self, tag: Tag) -> StoreResult<Tag>;
    fn get_tag(&self, id: &str) -> StoreResult<Option<Tag>>;
    /// Exact name lookup; first match wins.
    fn get_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>>;
    /// Lists all tags sorted by name.
    fn list_tags(&self) -> StoreResult<Vec<Tag>>;
    /// Resolves ids in request order, dropping unknown ids.
    fn get_tags_by_ids(&self, ids: &[TagId]) -> StoreResult<Vec<Tag>>;
    /// Merge-writes an existing tag. Fails with `InvalidDocument` when the
    /// tag has no id.
    fn update_tag(&self, tag: Tag) -> StoreResult<Tag>;
    /// Detaches the tag from every entry, then deletes the tag document.
    fn delete_tag(&self, id: &str) -> StoreResult<()>;
}

/// Diary repository backed by any `DocumentStore`.
pub struct DocumentDiaryRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> DocumentDiaryRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn query_entries(&self, query: &DocumentQuery) -> StoreResult<Vec<DiaryEntry>> {
        let mut entries = self
            .store
            .query_documents(ENTRIES_COLLECTION, query)?
            .into_iter()
            .map(decode::<DiaryEntry>)
            .collect::<StoreResult<Vec<_>>>()?;
        self.hydrate_tags(&mut entries)?;
        Ok(entries)
    }

    /// Fills `tags` for every entry from a single batch lookup.
    fn hydrate_tags(&self, entries: &mut [DiaryEntry]) -> StoreResult<()> {
        let distinct_ids: Vec<TagId> = entries
            .iter()
            .flat_map(|entry| entry.tag_ids.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if distinct_ids.is_empty() {
            return Ok(());
        }

        let by_id = self.load_tag_map(&distinct_ids)?;
        for entry in entries.iter_mut() {
            entry.tags = entry
                .tag_ids
                .iter()
                .filter_map(|id| by_id.get(id).cloned())
                .collect();
        }
        Ok(())
    }

    fn load_tag_map(&self, ids: &[TagId]) -> StoreResult<HashMap<TagId, Tag>> {
        self.store
            .get_documents(TAGS_COLLECTION, ids)?
            .into_iter()
            .map(|document| decode::<Tag>(document).map(|tag| (tag.id.clone(), tag)))
            .collect()
    }
}

impl<S: DocumentStore> DiaryRepository for DocumentDiaryRepository<S> {
    fn create_entry(&self, mut entry: DiaryEntry) -> StoreResult<DiaryEntry> {
        let now = current_timestamp();
        entry.created_at = now;
        entry.updated_at = now;

        let document = encode_entry(&entry)?;
        self.store.set_document(
            ENTRIES_COLLECTION,
            &entry.id.to_string(),
            &document,
            SetMode::Overwrite,
        )?;
        debug!(
            "event=entry_create module=repo status=ok entry_id={} tag_count={}",
            entry.id,
            entry.tag_ids.len()
        );
        Ok(entry)
    }

    fn get_entry(&self, id: EntryId) -> StoreResult<Option<DiaryEntry>> {
        let Some(document) = self
            .store
            .get_document(ENTRIES_COLLECTION, &id.to_string())?
        else {
            return Ok(None);
        };

        let mut entry: DiaryEntry = decode(document)?;
        if !entry.tag_ids.is_empty() {
            entry.tags = self.get_tags_by_ids(&entry.tag_ids)?;
        }
        Ok(Some(entry))
    }

    fn list_entries(&self, query: &EntryListQuery) -> StoreResult<Vec<DiaryEntry>> {
        let mut document_query = DocumentQuery::new();
        if let Some(start) = query.start {
            document_query = document_query.where_gte(CREATED_AT_FIELD, start_bound_millis(start));
        }
        if let Some(end) = query.end {
            document_query = document_query.where_lte(CREATED_AT_FIELD, end.timestamp_millis());
        }
        document_query = document_query.order_by(CREATED_AT_FIELD, SortDirection::Descending);

        let entries = self.query_entries(&document_query)?;
        debug!(
            "event=entry_list module=repo status=ok bounded_start={} bounded_end={} count={}",
            query.start.is_some(),
            query.end.is_some(),
            entries.len()
        );
        Ok(entries)
    }

    fn update_entry(&self, mut entry: DiaryEntry) -> StoreResult<DiaryEntry> {
        entry.updated_at = current_timestamp();

        let document = encode_entry(&entry)?;
        self.store.set_document(
            ENTRIES_COLLECTION,
            &entry.id.to_string(),
            &document,
            SetMode::Merge,
        )?;
        debug!(
            "event=entry_update module=repo status=ok entry_id={}",
            entry.id
        );
        Ok(entry)
    }

    fn delete_entry(&self, id: EntryId) -> StoreResult<()> {
        self.store
            .delete_document(ENTRIES_COLLECTION, &id.to_string())?;
        debug!("event=entry_delete module=repo status=ok entry_id={id}");
        Ok(())
    }

    fn search_entries(&self, query: &str) -> StoreResult<Vec<DiaryEntry>> {
        let needle = query.to_lowercase();
        let matches: Vec<DiaryEntry> = self
            .list_entries(&EntryListQuery::all())?
            .into_iter()
            .filter(|entry| {
                entry.title.to_lowercase().contains(&needle)
                    || entry.content.to_lowercase().contains(&needle)
            })
            .collect();
        debug!(
            "event=entry_search module=repo status=ok query_chars={} hits={}",
            query.chars().count(),
            matches.len()
        );
        Ok(matches)
    }

    fn list_entries_by_tag(&self, tag_id: &str) -> StoreResult<Vec<DiaryEntry>> {
        let query = DocumentQuery::new()
            .where_array_contains(TAG_IDS_FIELD, tag_id)
            .order_by(CREATED_AT_FIELD, SortDirection::Descending);
        self.query_entries(&query)
    }

    fn create_tag(&self, mut tag: Tag) -> StoreResult<Tag> {
        if tag.id.is_empty() {
            tag.id = Uuid::new_v4().to_string();
        }

        let document = encode(&tag)?;
        self.store
            .set_document(TAGS_COLLECTION, &tag.id, &document, SetMode::Overwrite)?;
        debug!("event=tag_create module=repo status=ok tag_id={}", tag.id);
        Ok(tag)
    }

    fn get_tag(&self, id: &str) -> StoreResult<Option<Tag>> {
        self.store
            .get_document(TAGS_COLLECTION, id)?
            .map(decode::<Tag>)
            .transpose()
    }

    fn get_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        let query = DocumentQuery::new().where_eq(NAME_FIELD, name);
        self.store
            .query_documents(TAGS_COLLECTION, &query)?
            .into_iter()
            .next()
            .map(decode::<Tag>)
            .transpose()
    }

    fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let query = DocumentQuery::new().order_by(NAME_FIELD, SortDirection::Ascending);
        self.store
            .query_documents(TAGS_COLLECTION, &query)?
            .into_iter()
            .map(decode::<Tag>)
            .collect()
    }

    fn get_tags_by_ids(&self, ids: &[TagId]) -> StoreResult<Vec<Tag>> {
        let by_id = self.load_tag_map(ids)?;
        Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
    }

    fn update_tag(&self, tag: Tag) -> StoreResult<Tag> {
        if tag.id.is_empty() {
            return Err(StoreError::InvalidDocument(
                "cannot update a tag without an id".to_string(),
            ));
        }
        let document = encode(&tag)?;
        self.store
            .set_document(TAGS_COLLECTION, &tag.id, &document, SetMode::Merge)?;
        debug!("event=tag_update module=repo status=ok tag_id={}", tag.id);
        Ok(tag)
    }

    fn delete_tag(&self, id: &str) -> StoreResult<()> {
        let referencing = self.list_entries_by_tag(id)?;
        let total = referencing.len();

        for (detached, mut entry) in referencing.into_iter().enumerate() {
            entry.detach_tag(id);
            let entry_id = entry.id;
            if let Err(err) = self.update_entry(entry) {
                warn!(
                    "event=tag_delete module=repo status=partial tag_id={id} entry_id={entry_id} detached={detached} total={total} error={err}"
                );
                return Err(err);
            }
        }

        self.store.delete_document(TAGS_COLLECTION, id)?;
        info!("event=tag_delete module=repo status=ok tag_id={id} detached={total}");
        Ok(())
    }
}

/// Smallest stored millisecond value that is not earlier than `start`.
fn start_bound_millis(start: DateTime<Utc>) -> i64 {
    let millis = start.timestamp_millis();
    if start.timestamp_subsec_nanos() % 1_000_000 == 0 {
        millis
    } else {
        millis + 1
    }
}

/// Rejects non-finite sentiment scores, which JSON cannot represent.
fn encode_entry(entry: &DiaryEntry) -> StoreResult<Value> {
    if let Some(score) = entry.sentiment_score.filter(|score| !score.is_finite()) {
        return Err(StoreError::InvalidDocument(format!(
            "entry `{}` has non-finite sentiment score {score}",
            entry.id
        )));
    }
    encode(entry)
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn decode<T: DeserializeOwned>(document: Value) -> StoreResult<T> {
    Ok(serde_json::from_value(document)?)
}

#[cfg(test)]
mod tests {
    use super::start_bound_millis;
    use chrono::{TimeZone, Utc};

    #[test]
    fn start_bound_rounds_sub_millisecond_values_up() {
        let exact = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(start_bound_millis(exact), 1_700_000_000_123);

        let fractional = Utc.timestamp_opt(1_700_000_000, 123_400_000).unwrap();
        assert_eq!(start_bound_millis(fractional), 1_700_000_000_124);
    }
}
