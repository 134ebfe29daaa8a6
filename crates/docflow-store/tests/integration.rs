//! SQLite store round-trips on an in-memory database.

use docflow_config::{EdgeDef, HttpMethod, NodeDef};
use docflow_store::{Error, SqliteStore, Store};
use sqlx::sqlite::SqlitePoolOptions;

async fn store() -> SqliteStore {
  // A single connection keeps every query on the same in-memory database.
  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("in-memory sqlite");
  let store = SqliteStore::new(pool);
  store.migrate().await.expect("migrations");
  store
}

fn sample_nodes() -> Vec<NodeDef> {
  vec![
    NodeDef {
      id: "a".to_string(),
      method: HttpMethod::Post,
      document_id: "doc-1".to_string(),
      content: serde_json::json!({"v": 1}),
      status: Default::default(),
      response: None,
    },
    NodeDef {
      id: "b".to_string(),
      method: HttpMethod::Get,
      document_id: "doc-1".to_string(),
      content: serde_json::Value::Null,
      status: Default::default(),
      response: None,
    },
  ]
}

#[tokio::test]
async fn save_and_get_round_trips() {
  let store = store().await;

  let saved = store
    .save_workflow(sample_nodes(), vec![EdgeDef::new("a", "b")])
    .await
    .unwrap();
  assert!(!saved.id.is_empty());

  let loaded = store.get_workflow(&saved.id).await.unwrap();
  assert_eq!(loaded, saved);
  assert_eq!(loaded.nodes.0[0].method, HttpMethod::Post);
}

#[tokio::test]
async fn list_returns_all_saved_workflows() {
  let store = store().await;

  let first = store.save_workflow(sample_nodes(), vec![]).await.unwrap();
  let second = store.save_workflow(sample_nodes(), vec![]).await.unwrap();

  let listed = store.list_workflows().await.unwrap();
  assert_eq!(listed.len(), 2);
  let ids: Vec<&str> = listed.iter().map(|w| w.id.as_str()).collect();
  assert!(ids.contains(&first.id.as_str()));
  assert!(ids.contains(&second.id.as_str()));
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
  let store = store().await;

  let err = store.get_workflow("nope").await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_workflow() {
  let store = store().await;

  let saved = store.save_workflow(sample_nodes(), vec![]).await.unwrap();
  store.delete_workflow(&saved.id).await.unwrap();

  let err = store.get_workflow(&saved.id).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));

  let err = store.delete_workflow(&saved.id).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}
