use std::error::Error;
use std::fmt::{Display, Formatter};
use thinkdiary_core::db::open_db_in_memory;
use thinkdiary_core::validation::{SAMPLE_TAG_COLOR, SAMPLE_TAG_NAME};
use thinkdiary_core::{
    create_sample_data, validate_store, AiService, DiaryEntry, DiaryService,
    DocumentDiaryRepository, InsightError, Mood, SqliteDocumentStore, Tag,
};

#[test]
fn create_entry_derives_word_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);

    let created = service
        .create_entry(
            "Test",
            "This is a test diary entry with multiple words.",
        )
        .unwrap();
    assert_eq!(created.word_count, 9);

    let loaded = service.get_entry(created.id).unwrap().unwrap();
    assert_eq!(loaded.word_count, 9);
    assert_eq!(loaded.title, "Test");
}

#[test]
fn update_entry_recomputes_stale_word_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);

    let mut entry = service.create_entry("Draft", "one two").unwrap();
    entry.content = "one two three\nfour\tfive".to_string();
    entry.word_count = 999;
    let updated = service.update_entry(entry).unwrap();

    assert_eq!(updated.word_count, 5);
    assert_eq!(
        service.get_entry(updated.id).unwrap().unwrap().word_count,
        5
    );
}

#[test]
fn create_entry_with_keeps_prepared_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);

    let tag = service.create_tag(Tag::named("gratitude")).unwrap();
    let mut entry = DiaryEntry::titled("Thanks", "grateful for friends");
    entry.mood = Some(Mood::Grateful);
    entry.tag_ids = vec![tag.id.clone()];
    let created = service.create_entry_with(entry).unwrap();

    let loaded = service.get_entry(created.id).unwrap().unwrap();
    assert_eq!(loaded.word_count, 3);
    assert_eq!(loaded.mood, Some(Mood::Grateful));
    assert_eq!(loaded.tags, vec![tag]);
}

#[test]
fn service_delegates_list_search_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);

    let kept = service.create_entry("Garden", "planted tomatoes").unwrap();
    let removed = service.create_entry("Errands", "bought tomatoes").unwrap();
    service.delete_entry(removed.id).unwrap();

    let all = service.list_entries(None, None).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, kept.id);

    let hits = service.search_entries("TOMATO").unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn get_tag_with_entries_hydrates_referencing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);

    let tag = service.create_tag(Tag::named("books")).unwrap();
    let mut entry = DiaryEntry::titled("Reading", "finished a novel");
    entry.tag_ids = vec![tag.id.clone()];
    let entry = service.create_entry_with(entry).unwrap();
    service.create_entry("Other", "unrelated").unwrap();

    let hydrated = service.get_tag_with_entries(&tag.id).unwrap().unwrap();
    assert_eq!(hydrated.entries, vec![entry.id]);
    assert!(service.get_tag_with_entries("missing").unwrap().is_none());

    service.delete_tag(&tag.id).unwrap();
    let detached = service.get_entry(entry.id).unwrap().unwrap();
    assert!(detached.tag_ids.is_empty());
}

#[test]
fn apply_insights_fills_metadata_and_respects_user_mood() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);
    let ai = StubAi { fail: false };

    let plain = service.create_entry("Plain", "a calm and quiet day").unwrap();
    let enriched = service.apply_insights(&ai, plain).unwrap();
    assert_eq!(enriched.summary.as_deref(), Some("summary of 5 words"));
    assert_eq!(enriched.themes, Some(vec!["calm".to_string()]));
    assert_eq!(enriched.sentiment_score, Some(0.5));
    assert_eq!(enriched.mood, Some(Mood::Peaceful));

    let stored = service.get_entry(enriched.id).unwrap().unwrap();
    assert!(stored.has_insights());
    assert_eq!(stored.mood, Some(Mood::Peaceful));

    let mut chosen = DiaryEntry::titled("Chosen", "rough day");
    chosen.mood = Some(Mood::Frustrated);
    let chosen = service.create_entry_with(chosen).unwrap();
    let enriched = service.apply_insights(&ai, chosen).unwrap();
    assert_eq!(enriched.mood, Some(Mood::Frustrated));
}

#[test]
fn apply_insights_failure_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);

    let entry = service.create_entry("Plain", "text").unwrap();
    let err = service
        .apply_insights(&StubAi { fail: true }, entry.clone())
        .unwrap_err();
    assert!(matches!(err, InsightError::Ai(StubError)));

    let stored = service.get_entry(entry.id).unwrap().unwrap();
    assert!(!stored.has_insights());
    assert_eq!(stored.updated_at, entry.updated_at);
}

#[test]
fn sample_data_round_trips_through_validation() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);

    let (tag, entry) = create_sample_data(&service).unwrap();
    assert_eq!(tag.name, SAMPLE_TAG_NAME);
    assert_eq!(tag.color.as_deref(), Some(SAMPLE_TAG_COLOR));
    assert_eq!(entry.mood, Some(Mood::Happy));
    assert!(entry.word_count > 0);

    let (second_tag, _) = create_sample_data(&service).unwrap();
    assert_eq!(second_tag.id, tag.id);

    let summary = validate_store(service.repository()).unwrap();
    assert_eq!(summary.entry_count, 2);
    assert_eq!(summary.tag_count, 1);
    assert_eq!(summary.recent_entries.len(), 2);
    assert_eq!(summary.recent_entries[1].tags, vec![tag]);
}

#[test]
fn validation_caps_recent_entries_and_tags() {
    let conn = open_db_in_memory().unwrap();
    let repo = DocumentDiaryRepository::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let service = DiaryService::new(repo);

    for idx in 0..7 {
        service
            .create_entry(format!("entry {idx}"), "body")
            .unwrap();
        service.create_tag(Tag::named(format!("tag {idx}"))).unwrap();
    }

    let summary = validate_store(service.repository()).unwrap();
    assert_eq!(summary.entry_count, 7);
    assert_eq!(summary.tag_count, 7);
    assert_eq!(summary.recent_entries.len(), 3);
    assert_eq!(summary.tags.len(), 5);
    assert_eq!(summary.tags[0].name, "tag 0");
}

#[derive(Debug, PartialEq)]
struct StubError;

impl Display for StubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("stub ai unavailable")
    }
}

impl Error for StubError {}

struct StubAi {
    fail: bool,
}

impl StubAi {
    fn check(&self) -> Result<(), StubError> {
        if self.fail {
            Err(StubError)
        } else {
            Ok(())
        }
    }
}

impl AiService for StubAi {
    type Error = StubError;

    fn detect_mood(&self, _content: &str) -> Result<Option<Mood>, Self::Error> {
        self.check()?;
        Ok(Some(Mood::Peaceful))
    }

    fn generate_summary(&self, content: &str) -> Result<String, Self::Error> {
        self.check()?;
        Ok(format!(
            "summary of {} words",
            thinkdiary_core::count_words(content)
        ))
    }

    fn extract_themes(&self, _content: &str) -> Result<Vec<String>, Self::Error> {
        self.check()?;
        Ok(vec!["calm".to_string()])
    }

    fn analyze_sentiment(&self, _content: &str) -> Result<f64, Self::Error> {
        self.check()?;
        Ok(0.5)
    }

    fn generate_reflection_questions(
        &self,
        entry: &DiaryEntry,
    ) -> Result<Vec<String>, Self::Error> {
        self.check()?;
        Ok(vec![format!("What made \"{}\" memorable?", entry.title)])
    }
}
