use serde::{Deserialize, Serialize};

use crate::enums::{HttpMethod, NodeStatus};

/// A node as produced by the canvas editor.
///
/// `status` and `response` are run-scoped presentation fields the editor
/// round-trips; they are accepted on input so stored graphs deserialize
/// unchanged, but the engine strips them when locking a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
  pub id: String,
  pub method: HttpMethod,
  /// Target document key. May be empty when an upstream edge supplies it
  /// dynamically at run time (PUT only).
  #[serde(default)]
  pub document_id: String,
  /// Static JSON request body for POST/PUT.
  #[serde(default)]
  pub content: serde_json::Value,
  #[serde(default)]
  pub status: NodeStatus,
  #[serde(default)]
  pub response: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_editor_node_json() {
    let raw = r#"{
      "id": "node-1",
      "method": "PUT",
      "documentId": "orders",
      "content": {"qty": 2},
      "status": "idle",
      "response": null
    }"#;

    let node: NodeDef = serde_json::from_str(raw).unwrap();
    assert_eq!(node.id, "node-1");
    assert_eq!(node.method, HttpMethod::Put);
    assert_eq!(node.document_id, "orders");
    assert_eq!(node.content["qty"], 2);
    assert_eq!(node.status, NodeStatus::Idle);
  }

  #[test]
  fn omitted_fields_default() {
    let node: NodeDef = serde_json::from_str(r#"{"id": "a", "method": "GET"}"#).unwrap();
    assert!(node.document_id.is_empty());
    assert!(node.content.is_null());
    assert_eq!(node.status, NodeStatus::Idle);
    assert!(node.response.is_none());
  }
}
