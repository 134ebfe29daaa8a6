use chrono::{DateTime, Utc};
use docflow_config::{EdgeDef, NodeDef};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// A saved workflow graph as stored in the database.
///
/// Serializes with camelCase keys, so it is directly the shape the editor's
/// load call expects: `{id, nodes, edges, createdAt, updatedAt}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorkflow {
  pub id: String,
  pub nodes: Json<Vec<NodeDef>>,
  pub edges: Json<Vec<EdgeDef>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
