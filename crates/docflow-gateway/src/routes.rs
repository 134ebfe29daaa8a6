use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use docflow_config::{EdgeDef, NodeDef, WorkflowDef};
use docflow_docstore::StoreError;
use docflow_engine::{ChannelNotifier, Engine};
use docflow_workflow::{GraphError, Workflow, plan};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::state::AppState;

// GET /api/health
pub async fn health() -> Json<Value> {
  Json(json!({
    "status": "ok",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

/// Body of an execution request: the graph plus the chosen start set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
  #[serde(default)]
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
  #[serde(default)]
  pub start_node_ids: Vec<String>,
}

// POST /api/workflows/execute - streams NDJSON status events
pub async fn execute_workflow(
  State(state): State<Arc<AppState>>,
  Json(request): Json<ExecuteRequest>,
) -> Response {
  let def = WorkflowDef {
    nodes: request.nodes,
    edges: request.edges,
  };
  let workflow = match Workflow::validate(def) {
    Ok(workflow) => workflow,
    Err(err) => return graph_error_response(err),
  };
  // Plan here as well so graph-level failures reject the request with a
  // status code instead of an empty stream.
  if let Err(err) = plan(&workflow, &request.start_node_ids) {
    return graph_error_response(err);
  }

  let (tx, rx) = mpsc::unbounded_channel();
  let engine = Engine::with_notifier(
    state.documents.clone(),
    state.engine.clone(),
    ChannelNotifier::new(tx),
  );
  let start_node_ids = request.start_node_ids;
  tokio::spawn(async move {
    if let Err(err) = engine
      .execute(&workflow, &start_node_ids, CancellationToken::new())
      .await
    {
      warn!(error = %err, "workflow execution failed");
    }
  });

  // One self-delimited record per event, flushed as it arrives. Dropping
  // the body (client disconnect) drops the receiver, which stops dispatch.
  let lines = UnboundedReceiverStream::new(rx).map(|event| {
    let mut line = serde_json::to_vec(&event).unwrap_or_default();
    line.push(b'\n');
    Ok::<_, Infallible>(Bytes::from(line))
  });

  (
    [(header::CONTENT_TYPE, "application/x-ndjson")],
    Body::from_stream(lines),
  )
    .into_response()
}

// POST /api/workflows
pub async fn save_workflow(
  State(state): State<Arc<AppState>>,
  Json(def): Json<WorkflowDef>,
) -> Response {
  match state.workflows.save_workflow(def.nodes, def.edges).await {
    Ok(saved) => (StatusCode::CREATED, Json(saved)).into_response(),
    Err(err) => workflow_store_error_response(err),
  }
}

// GET /api/workflows
pub async fn list_workflows(State(state): State<Arc<AppState>>) -> Response {
  match state.workflows.list_workflows().await {
    Ok(workflows) => Json(workflows).into_response(),
    Err(err) => workflow_store_error_response(err),
  }
}

// GET /api/documents/{id}
pub async fn get_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.documents.get(&id).await {
    Ok(body) => Json(body).into_response(),
    Err(err) => document_error_response(err),
  }
}

// POST /api/documents/{id}
pub async fn create_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<Value>,
) -> Response {
  match state.documents.create(&id, body).await {
    Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
    Err(err) => document_error_response(err),
  }
}

// PUT /api/documents/{id}
pub async fn update_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<Value>,
) -> Response {
  match state.documents.update(&id, body).await {
    Ok(receipt) => Json(receipt).into_response(),
    Err(err) => document_error_response(err),
  }
}

// DELETE /api/documents/{id}
pub async fn delete_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.documents.delete(&id).await {
    Ok(receipt) => Json(receipt).into_response(),
    Err(err) => document_error_response(err),
  }
}

fn graph_error_response(err: GraphError) -> Response {
  (
    StatusCode::BAD_REQUEST,
    Json(json!({ "error": err.to_string() })),
  )
    .into_response()
}

fn document_error_response(err: StoreError) -> Response {
  let status = match &err {
    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
    StoreError::Conflict(_) => StatusCode::CONFLICT,
    StoreError::Unavailable(_) => StatusCode::BAD_GATEWAY,
  };
  (status, Json(json!({ "error": err.to_string() }))).into_response()
}

fn workflow_store_error_response(err: docflow_store::Error) -> Response {
  let status = match &err {
    docflow_store::Error::NotFound(_) => StatusCode::NOT_FOUND,
    docflow_store::Error::Database(_) => {
      error!(error = %err, "workflow store failure");
      StatusCode::INTERNAL_SERVER_ERROR
    }
  };
  (status, Json(json!({ "error": err.to_string() }))).into_response()
}
