use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::{DocumentStore, StoreError};

/// In-memory document store.
///
/// Backs the self-contained serving mode and tests. Each instance is fully
/// isolated; nothing is shared across instances or persisted.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
  documents: RwLock<HashMap<String, Value>>,
}

impl MemoryDocumentStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
  async fn get(&self, document_id: &str) -> Result<Value, StoreError> {
    self
      .documents
      .read()
      .await
      .get(document_id)
      .cloned()
      .ok_or_else(|| StoreError::NotFound(document_id.to_string()))
  }

  async fn create(&self, document_id: &str, body: Value) -> Result<Value, StoreError> {
    let mut documents = self.documents.write().await;
    if documents.contains_key(document_id) {
      return Err(StoreError::Conflict(document_id.to_string()));
    }
    documents.insert(document_id.to_string(), body.clone());
    Ok(json!({ "documentId": document_id, "content": body }))
  }

  async fn update(&self, document_id: &str, body: Value) -> Result<Value, StoreError> {
    let mut documents = self.documents.write().await;
    if !documents.contains_key(document_id) {
      return Err(StoreError::NotFound(document_id.to_string()));
    }
    documents.insert(document_id.to_string(), body.clone());
    Ok(json!({ "documentId": document_id, "content": body }))
  }

  async fn delete(&self, document_id: &str) -> Result<Value, StoreError> {
    self
      .documents
      .write()
      .await
      .remove(document_id)
      .map(|_| json!({ "documentId": document_id, "deleted": true }))
      .ok_or_else(|| StoreError::NotFound(document_id.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn create_then_get_round_trips() {
    let store = MemoryDocumentStore::new();

    let receipt = store.create("a", json!({"x": 1})).await.unwrap();
    assert_eq!(receipt["documentId"], "a");
    assert_eq!(receipt["content"]["x"], 1);

    let body = store.get("a").await.unwrap();
    assert_eq!(body, json!({"x": 1}));
  }

  #[tokio::test]
  async fn create_twice_conflicts() {
    let store = MemoryDocumentStore::new();
    store.create("a", Value::Null).await.unwrap();

    let err = store.create("a", Value::Null).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(id) if id == "a"));
  }

  #[tokio::test]
  async fn update_requires_existing_document() {
    let store = MemoryDocumentStore::new();

    let err = store.update("a", Value::Null).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    store.create("a", json!({"v": 1})).await.unwrap();
    store.update("a", json!({"v": 2})).await.unwrap();
    assert_eq!(store.get("a").await.unwrap(), json!({"v": 2}));
  }

  #[tokio::test]
  async fn delete_removes_document() {
    let store = MemoryDocumentStore::new();
    store.create("a", Value::Null).await.unwrap();

    let receipt = store.delete("a").await.unwrap();
    assert_eq!(receipt["deleted"], true);

    let err = store.get("a").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store.delete("a").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
  }
}
