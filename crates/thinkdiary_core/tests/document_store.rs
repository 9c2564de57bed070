use serde_json::json;
use thinkdiary_core::db::open_db_in_memory;
use thinkdiary_core::{DocumentQuery, DocumentStore, SetMode, SortDirection, SqliteDocumentStore};

#[test]
fn overwrite_replaces_and_merge_keeps_missing_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    store
        .set_document("notes", "a", &json!({"x": 1, "y": 2}), SetMode::Overwrite)
        .unwrap();
    store
        .set_document("notes", "a", &json!({"y": 3}), SetMode::Merge)
        .unwrap();
    assert_eq!(
        store.get_document("notes", "a").unwrap(),
        Some(json!({"x": 1, "y": 3}))
    );

    store
        .set_document("notes", "a", &json!({"z": true}), SetMode::Overwrite)
        .unwrap();
    assert_eq!(
        store.get_document("notes", "a").unwrap(),
        Some(json!({"z": true}))
    );
}

#[test]
fn merge_creates_absent_document() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    store
        .set_document("notes", "fresh", &json!({"x": 1}), SetMode::Merge)
        .unwrap();
    assert_eq!(
        store.get_document("notes", "fresh").unwrap(),
        Some(json!({"x": 1}))
    );
}

#[test]
fn collections_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    store
        .set_document("left", "same", &json!({"side": "left"}), SetMode::Overwrite)
        .unwrap();
    store
        .set_document("right", "same", &json!({"side": "right"}), SetMode::Overwrite)
        .unwrap();

    assert_eq!(
        store.get_document("left", "same").unwrap(),
        Some(json!({"side": "left"}))
    );
    assert_eq!(store.get_document("middle", "same").unwrap(), None);
}

#[test]
fn non_object_documents_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    assert!(store
        .set_document("notes", "a", &json!([1, 2, 3]), SetMode::Overwrite)
        .is_err());
}

#[test]
fn get_documents_skips_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    for id in ["a", "b", "c"] {
        store
            .set_document("notes", id, &json!({"id": id}), SetMode::Overwrite)
            .unwrap();
    }

    let ids = vec!["c".to_string(), "ghost".to_string(), "a".to_string()];
    let mut found: Vec<String> = store
        .get_documents("notes", &ids)
        .unwrap()
        .into_iter()
        .map(|doc| doc["id"].as_str().unwrap().to_string())
        .collect();
    found.sort();
    assert_eq!(found, vec!["a".to_string(), "c".to_string()]);
    assert!(store.get_documents("notes", &[]).unwrap().is_empty());
}

#[test]
fn query_filters_ranges_and_orders_with_id_tiebreak() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let rows = [("d", 40), ("a", 10), ("c", 20), ("b", 20), ("e", 50)];
    for (id, rank) in rows {
        store
            .set_document("items", id, &json!({"id": id, "rank": rank}), SetMode::Overwrite)
            .unwrap();
    }

    let query = DocumentQuery::new()
        .where_gte("rank", 20)
        .where_lte("rank", 40)
        .order_by("rank", SortDirection::Descending);
    let ids: Vec<String> = store
        .query_documents("items", &query)
        .unwrap()
        .into_iter()
        .map(|doc| doc["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["d", "b", "c"]);
}

#[test]
fn query_supports_equality_and_array_contains() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    store
        .set_document(
            "items",
            "1",
            &json!({"name": "one", "labels": ["x", "y"]}),
            SetMode::Overwrite,
        )
        .unwrap();
    store
        .set_document(
            "items",
            "2",
            &json!({"name": "two", "labels": ["y"]}),
            SetMode::Overwrite,
        )
        .unwrap();
    store
        .set_document("items", "3", &json!({"name": "three"}), SetMode::Overwrite)
        .unwrap();

    let with_x = store
        .query_documents("items", &DocumentQuery::new().where_array_contains("labels", "x"))
        .unwrap();
    assert_eq!(with_x.len(), 1);
    assert_eq!(with_x[0]["name"], "one");

    let with_y = store
        .query_documents("items", &DocumentQuery::new().where_array_contains("labels", "y"))
        .unwrap();
    assert_eq!(with_y.len(), 2);

    let named = store
        .query_documents("items", &DocumentQuery::new().where_eq("name", "three"))
        .unwrap();
    assert_eq!(named.len(), 1);
}

#[test]
fn equality_with_null_matches_null_and_missing_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    store
        .set_document("tags", "a", &json!({"name": "a", "color": null}), SetMode::Overwrite)
        .unwrap();
    store
        .set_document("tags", "b", &json!({"name": "b"}), SetMode::Overwrite)
        .unwrap();
    store
        .set_document("tags", "c", &json!({"name": "c", "color": "#fff"}), SetMode::Overwrite)
        .unwrap();

    let uncolored = store
        .query_documents("tags", &DocumentQuery::new().where_eq("color", json!(null)))
        .unwrap();
    let names: Vec<_> = uncolored.iter().map(|doc| doc["name"].clone()).collect();
    assert_eq!(names, vec![json!("a"), json!("b")]);

    let colored = store
        .query_documents("tags", &DocumentQuery::new().where_eq("color", "#fff"))
        .unwrap();
    assert_eq!(colored.len(), 1);
    assert_eq!(colored[0]["name"], "c");
}

#[test]
fn query_rejects_unsupported_field_names() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let query = DocumentQuery::new().where_eq("a.b", 1);
    assert!(store.query_documents("items", &query).is_err());
}

#[test]
fn delete_is_silent_for_absent_documents() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    store
        .set_document("notes", "a", &json!({}), SetMode::Overwrite)
        .unwrap();
    store.delete_document("notes", "a").unwrap();
    store.delete_document("notes", "a").unwrap();
    assert_eq!(store.get_document("notes", "a").unwrap(), None);
}
