//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist JSON documents in the `documents` table keyed by
//!   `(collection, id)`.
//! - Translate `DocumentQuery` filters into `json_extract`/`json_each` SQL.
//!
//! # Invariants
//! - Field paths are restricted to `[A-Za-z0-9_]` names and always bound
//!   as parameters.
//! - Merge writes read and write inside one transaction.
//! - Equality with JSON null matches explicit nulls and absent fields alike.

use crate::db::migrations::{current_user_version, latest_version};
use crate::store::{
    merge_top_level, DocumentQuery, DocumentStore, FilterOp, SetMode, SortDirection, StoreError,
    StoreResult,
};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Builds a store from a connection returned by `open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when the `documents` table is absent.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        if !table_exists(conn, "documents")? {
            return Err(StoreError::MissingRequiredTable("documents"));
        }
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn set_document(
        &self,
        collection: &str,
        id: &str,
        document: &Value,
        mode: SetMode,
    ) -> StoreResult<()> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "document `{collection}/{id}` must be a JSON object"
            )));
        }

        match mode {
            SetMode::Overwrite => write_body(self.conn, collection, id, document),
            SetMode::Merge => {
                let tx = self.conn.unchecked_transaction()?;
                let existing = read_body(&tx, collection, id)?;
                let merged = match existing {
                    Some(mut base) => {
                        merge_top_level(&mut base, document)?;
                        base
                    }
                    None => document.clone(),
                };
                write_body(&tx, collection, id, &merged)?;
                tx.commit()?;
                Ok(())
            }
        }
    }

    fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        read_body(self.conn, collection, id)
    }

    fn get_documents(&self, collection: &str, ids: &[String]) -> StoreResult<Vec<Value>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT body FROM documents WHERE collection = ? AND id IN ({placeholders});"
        );
        let mut bind_values = Vec::with_capacity(ids.len() + 1);
        bind_values.push(SqlValue::Text(collection.to_string()));
        bind_values.extend(ids.iter().map(|id| SqlValue::Text(id.clone())));

        collect_bodies(self.conn, &sql, bind_values)
    }

    fn query_documents(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> StoreResult<Vec<Value>> {
        let mut sql = String::from("SELECT body FROM documents WHERE collection = ?");
        let mut bind_values = vec![SqlValue::Text(collection.to_string())];

        for filter in &query.filters {
            let path = field_path(&filter.field)?;
            match filter.op {
                FilterOp::Equal if filter.value.is_null() => {
                    sql.push_str(" AND json_extract(body, ?) IS ?")
                }
                FilterOp::Equal => sql.push_str(" AND json_extract(body, ?) = ?"),
                FilterOp::GreaterOrEqual => sql.push_str(" AND json_extract(body, ?) >= ?"),
                FilterOp::LessOrEqual => sql.push_str(" AND json_extract(body, ?) <= ?"),
                FilterOp::ArrayContains => sql.push_str(
                    " AND EXISTS (
                        SELECT 1 FROM json_each(documents.body, ?)
                        WHERE json_each.value = ?
                    )",
                ),
            }
            bind_values.push(SqlValue::Text(path));
            bind_values.push(json_to_sql(&filter.value));
        }

        match &query.order_by {
            Some((field, direction)) => {
                let path = field_path(field)?;
                let keyword = match direction {
                    SortDirection::Ascending => "ASC",
                    SortDirection::Descending => "DESC",
                };
                sql.push_str(&format!(" ORDER BY json_extract(body, ?) {keyword}, id ASC"));
                bind_values.push(SqlValue::Text(path));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }

        collect_bodies(self.conn, &sql, bind_values)
    }

    fn delete_document(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection, id],
        )?;
        Ok(())
    }
}

fn write_body(conn: &Connection, collection: &str, id: &str, body: &Value) -> StoreResult<()> {
    let text = serde_json::to_string(body)?;
    conn.execute(
        "INSERT INTO documents (collection, id, body)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (collection, id) DO UPDATE SET
            body = excluded.body,
            written_at = (strftime('%s', 'now') * 1000);",
        params![collection, id, text],
    )?;
    Ok(())
}

fn read_body(conn: &Connection, collection: &str, id: &str) -> StoreResult<Option<Value>> {
    let text: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection, id],
            |row| row.get(0),
        )
        .optional()?;
    match text {
        Some(text) => Ok(Some(parse_body(&text)?)),
        None => Ok(None),
    }
}

fn collect_bodies(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<SqlValue>,
) -> StoreResult<Vec<Value>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut documents = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        documents.push(parse_body(&text)?);
    }
    Ok(documents)
}

fn parse_body(text: &str) -> StoreResult<Value> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(StoreError::InvalidDocument(
            "stored document body is not a JSON object".to_string(),
        ));
    }
    Ok(value)
}

fn field_path(field: &str) -> StoreResult<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid {
        return Err(StoreError::InvalidQuery(format!(
            "unsupported field name `{field}`"
        )));
    }
    Ok(format!("$.{field}"))
}

/// Maps a JSON scalar to the SQL value `json_extract` yields for it.
fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => SqlValue::Real(number.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        // json_extract returns nested values as minified JSON text.
        other => SqlValue::Text(other.to_string()),
    }
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
