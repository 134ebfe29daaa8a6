//! Single-node execution against the document store.

use std::time::Duration;

use docflow_config::HttpMethod;
use docflow_docstore::{DocumentStore, StoreError};
use docflow_workflow::Node;
use serde_json::{Value, json};
use thiserror::Error;

/// Node-local execution failure. Marks the node `error` without aborting the
/// rest of the run.
#[derive(Debug, Error)]
pub enum NodeError {
  /// The node reached execution with no resolvable target document id.
  #[error("no target document id resolved for this node")]
  MissingTarget,

  /// The store reported a failure; surfaced verbatim as the node's response.
  #[error(transparent)]
  Store(#[from] StoreError),

  /// The store call exceeded the per-call deadline. Kept distinct from
  /// store-reported failures for observability.
  #[error("document store call timed out after {0:?}")]
  Timeout(Duration),
}

impl NodeError {
  /// Stable discriminant observers can branch on.
  pub fn kind(&self) -> &'static str {
    match self {
      NodeError::MissingTarget => "MissingTarget",
      NodeError::Store(StoreError::NotFound(_)) => "NotFound",
      NodeError::Store(StoreError::Conflict(_)) => "Conflict",
      NodeError::Store(StoreError::Unavailable(_)) => "Unavailable",
      NodeError::Timeout(_) => "Timeout",
    }
  }

  /// The error payload carried as the node's response.
  pub fn to_response(&self) -> Value {
    json!({ "error": self.to_string(), "kind": self.kind() })
  }
}

/// Input resolved for a node from its upstream edges at dispatch time.
#[derive(Debug, Clone, Default)]
pub struct ResolvedInput {
  /// Payload propagated from the single producing predecessor (PUT only).
  pub payload: Option<Value>,
  /// Target document id supplied dynamically by the predecessor's response.
  pub document_id: Option<String>,
  /// Set when the producing predecessor failed and the node falls back to
  /// its static content.
  pub propagation_skipped: bool,
}

/// Resolve the target document id for a node.
///
/// The node's own `document_id` wins; an empty one may be filled from a
/// producing predecessor's response, for PUT only. `None` means the node
/// must fail with [`NodeError::MissingTarget`] before any store call.
pub fn resolve_target(node: &Node, input: &ResolvedInput) -> Option<String> {
  if !node.document_id.is_empty() {
    return Some(node.document_id.clone());
  }
  if node.method == HttpMethod::Put {
    if let Some(id) = input.document_id.as_deref() {
      if !id.is_empty() {
        return Some(id.to_string());
      }
    }
  }
  None
}

/// Perform one node's document operation: a single attempt, bounded by
/// `timeout`, with no internal retry.
pub async fn execute_node(
  store: &dyn DocumentStore,
  node: &Node,
  input: &ResolvedInput,
  timeout: Duration,
) -> Result<Value, NodeError> {
  let document_id = resolve_target(node, input).ok_or(NodeError::MissingTarget)?;

  let call = async {
    match node.method {
      HttpMethod::Get => store.get(&document_id).await,
      HttpMethod::Post => store.create(&document_id, node.content.clone()).await,
      HttpMethod::Put => {
        // Propagated data wins over the static content; POST never
        // transcludes, so only PUT looks at the resolved payload.
        let body = input
          .payload
          .clone()
          .unwrap_or_else(|| node.content.clone());
        store.update(&document_id, body).await
      }
      HttpMethod::Delete => store.delete(&document_id).await,
    }
  };

  match tokio::time::timeout(timeout, call).await {
    Ok(result) => result.map_err(NodeError::from),
    Err(_) => Err(NodeError::Timeout(timeout)),
  }
}
