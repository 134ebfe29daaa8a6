//! Docflow Docstore
//!
//! The document store boundary the execution engine issues its logical
//! GET/POST/PUT/DELETE operations against. The engine only sees the
//! [`DocumentStore`] trait; deployments pick an implementation:
//!
//! - [`MemoryDocumentStore`] - in-process map, used by tests and the
//!   self-contained serving mode.
//! - [`HttpDocumentStore`] - client for an external store speaking the same
//!   document CRUD protocol over HTTP.
//!
//! Mutating operations answer with a receipt envelope that names the
//! document (`{"documentId": ..., ...}`); reads return the raw document
//! body. Downstream PUT nodes rely on the receipt to resolve a dynamic
//! target document id.

mod http;
mod memory;

pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use serde_json::Value;

/// Failure reported by the document store for a single operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
  /// The addressed document does not exist.
  #[error("document '{0}' not found")]
  NotFound(String),

  /// A document with this id already exists.
  #[error("document '{0}' already exists")]
  Conflict(String),

  /// The store could not be reached or answered outside the protocol.
  #[error("document store unavailable: {0}")]
  Unavailable(String),
}

/// Logical document operations, one attempt per call. Retry policy, if any,
/// belongs to the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Read a document; returns its body.
  async fn get(&self, document_id: &str) -> Result<Value, StoreError>;

  /// Create a document; fails with [`StoreError::Conflict`] if it exists.
  async fn create(&self, document_id: &str, body: Value) -> Result<Value, StoreError>;

  /// Update an existing document; fails with [`StoreError::NotFound`]
  /// if it does not exist.
  async fn update(&self, document_id: &str, body: Value) -> Result<Value, StoreError>;

  /// Remove a document; fails with [`StoreError::NotFound`] if absent.
  async fn delete(&self, document_id: &str) -> Result<Value, StoreError>;
}
