//! Document store abstraction.
//!
//! # Responsibility
//! - Define a collection/document contract shaped like a managed document
//!   database: JSON objects keyed by string id, simple field filters.
//! - Keep SQL and connection details out of the persistence gateway.
//!
//! # Invariants
//! - Documents are JSON objects; anything else is rejected on write.
//! - Filters and ordering only address top-level fields.
//! - Deleting an absent document is not an error.

use crate::db::DbError;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure. Surfaced unchanged through the gateway and service.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// A document handed to or read from the store is not a JSON object.
    InvalidDocument(String),
    /// A query addresses a field path the store cannot express.
    InvalidQuery(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl StoreError {
    /// Returns whether a write was rejected by a store constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_constraint_violation())
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::InvalidDocument(message) => write!(f, "invalid document: {message}"),
            Self::InvalidQuery(message) => write!(f, "invalid document query: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// How `set_document` treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Replace the stored document entirely.
    Overwrite,
    /// Overwrite only the top-level fields present in the new document.
    /// Creates the document when absent.
    Merge,
}

/// Comparison applied by a field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equality. A null value also matches documents lacking the field.
    Equal,
    GreaterOrEqual,
    LessOrEqual,
    /// Field is an array holding the value.
    ArrayContains,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Collection query: conjunction of filters plus optional ordering.
///
/// Results with equal sort keys are ordered by document id ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<(String, SortDirection)>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Equal, value.into())
    }

    pub fn where_gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::GreaterOrEqual, value.into())
    }

    pub fn where_lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::LessOrEqual, value.into())
    }

    pub fn where_array_contains(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::ArrayContains, value.into())
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    fn filter(mut self, field: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            op,
            value,
        });
        self
    }
}

/// Collection-scoped document persistence.
pub trait DocumentStore {
    /// Writes one document under `id`.
    fn set_document(
        &self,
        collection: &str,
        id: &str,
        document: &Value,
        mode: SetMode,
    ) -> StoreResult<()>;
    /// Reads one document, `None` when absent.
    fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;
    /// Reads many documents in one lookup. Missing ids are skipped; result
    /// order is unspecified.
    fn get_documents(&self, collection: &str, ids: &[String]) -> StoreResult<Vec<Value>>;
    /// Runs a filtered, optionally ordered collection query.
    fn query_documents(&self, collection: &str, query: &DocumentQuery)
        -> StoreResult<Vec<Value>>;
    /// Removes one document. Absent documents are ignored.
    fn delete_document(&self, collection: &str, id: &str) -> StoreResult<()>;
}

/// Overwrites top-level fields of `base` with those of `patch`.
///
/// Nested objects are replaced, not merged, and explicit nulls in `patch`
/// are written as nulls.
pub fn merge_top_level(base: &mut Value, patch: &Value) -> StoreResult<()> {
    let (Some(target), Some(source)) = (base.as_object_mut(), patch.as_object()) else {
        return Err(StoreError::InvalidDocument(
            "merge requires JSON objects on both sides".to_string(),
        ));
    };
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{merge_top_level, DocumentQuery, FilterOp, SortDirection};
    use serde_json::json;

    #[test]
    fn merge_overwrites_present_fields_only() {
        let mut base = json!({"a": 1, "b": {"x": 1}, "c": "keep"});
        merge_top_level(&mut base, &json!({"a": 2, "b": {"y": 2}, "d": null})).unwrap();
        assert_eq!(base, json!({"a": 2, "b": {"y": 2}, "c": "keep", "d": null}));
    }

    #[test]
    fn merge_rejects_non_objects() {
        let mut base = json!([1, 2]);
        assert!(merge_top_level(&mut base, &json!({"a": 1})).is_err());
    }

    #[test]
    fn builder_collects_filters_in_order() {
        let query = DocumentQuery::new()
            .where_gte("created_at", 10)
            .where_lte("created_at", 20)
            .order_by("created_at", SortDirection::Descending);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[0].op, FilterOp::GreaterOrEqual);
        assert_eq!(query.filters[1].op, FilterOp::LessOrEqual);
        assert_eq!(
            query.order_by,
            Some(("created_at".to_string(), SortDirection::Descending))
        );
    }
}
