//! Docflow Store
//!
//! Persistence for saved workflow graphs. The gateway saves and loads named
//! graphs by opaque id; the execution engine never touches this layer.
//!
//! The [`Store`] trait defines operations for:
//! - Saving a workflow definition under a fresh id
//! - Loading one or all saved workflows
//! - Deleting a saved workflow

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::SavedWorkflow;

use async_trait::async_trait;
use docflow_config::{EdgeDef, NodeDef};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Storage trait for saved workflow graphs.
#[async_trait]
pub trait Store: Send + Sync {
  /// Save a workflow definition under a new id.
  async fn save_workflow(
    &self,
    nodes: Vec<NodeDef>,
    edges: Vec<EdgeDef>,
  ) -> Result<SavedWorkflow, Error>;

  /// Get a saved workflow by id.
  async fn get_workflow(&self, id: &str) -> Result<SavedWorkflow, Error>;

  /// List all saved workflows, most recently created first.
  async fn list_workflows(&self) -> Result<Vec<SavedWorkflow>, Error>;

  /// Delete a saved workflow by id.
  async fn delete_workflow(&self, id: &str) -> Result<(), Error>;
}
