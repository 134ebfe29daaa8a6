use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

/// A workflow definition as produced by the editor or stored by the
/// persistence layer: the node set plus the directed edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  #[serde(default)]
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_editor_payload() {
    let raw = r#"{
      "nodes": [
        {"id": "a", "method": "POST", "documentId": "doc-1", "content": {"v": 1}},
        {"id": "b", "method": "GET", "documentId": "doc-1"}
      ],
      "edges": [{"id": "e1", "source": "a", "target": "b"}]
    }"#;

    let def: WorkflowDef = serde_json::from_str(raw).unwrap();
    assert_eq!(def.nodes.len(), 2);
    assert_eq!(def.edges.len(), 1);
    assert_eq!(def.edges[0].source, "a");
    assert_eq!(def.edges[0].target, "b");
  }
}
