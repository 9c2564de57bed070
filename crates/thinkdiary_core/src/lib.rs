//! Core domain logic for ThinkDiary.
//! This crate owns the entry/tag model and its persistence contracts.

pub mod ai;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod validation;

pub use ai::AiService;
pub use config::{ConfigError, DiaryConfig, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{DiaryEntry, EntryId};
pub use model::mood::{Mood, MoodParseError};
pub use model::tag::{Tag, TagId};
pub use repo::diary_repo::{DiaryRepository, DocumentDiaryRepository, EntryListQuery};
pub use service::diary_service::{count_words, DiaryService, InsightError};
pub use store::{
    DocumentQuery, DocumentStore, SetMode, SortDirection, SqliteDocumentStore, StoreError,
    StoreResult,
};
pub use validation::{create_sample_data, validate_store, StoreSummary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
