use async_trait::async_trait;
use chrono::Utc;
use docflow_config::{EdgeDef, NodeDef};
use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::types::SavedWorkflow;
use crate::{Error, Store};

/// SQLite-based store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }
}

#[async_trait]
impl Store for SqliteStore {
  async fn save_workflow(
    &self,
    nodes: Vec<NodeDef>,
    edges: Vec<EdgeDef>,
  ) -> Result<SavedWorkflow, Error> {
    let now = Utc::now();
    let workflow = SavedWorkflow {
      id: Uuid::new_v4().to_string(),
      nodes: Json(nodes),
      edges: Json(edges),
      created_at: now,
      updated_at: now,
    };

    sqlx::query(
      r#"
            INSERT INTO workflows (id, nodes, edges, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
    )
    .bind(&workflow.id)
    .bind(&workflow.nodes)
    .bind(&workflow.edges)
    .bind(workflow.created_at)
    .bind(workflow.updated_at)
    .execute(&self.pool)
    .await?;

    Ok(workflow)
  }

  async fn get_workflow(&self, id: &str) -> Result<SavedWorkflow, Error> {
    sqlx::query_as(
      r#"
            SELECT id, nodes, edges, created_at, updated_at
            FROM workflows
            WHERE id = ?
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| Error::NotFound(id.to_string()))
  }

  async fn list_workflows(&self) -> Result<Vec<SavedWorkflow>, Error> {
    let workflows = sqlx::query_as(
      r#"
            SELECT id, nodes, edges, created_at, updated_at
            FROM workflows
            ORDER BY created_at DESC
            "#,
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(workflows)
  }

  async fn delete_workflow(&self, id: &str) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM workflows WHERE id = ?")
      .bind(id)
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      return Err(Error::NotFound(id.to_string()));
    }
    Ok(())
  }
}
