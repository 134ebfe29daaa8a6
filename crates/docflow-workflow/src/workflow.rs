use std::collections::HashMap;

use docflow_config::{HttpMethod, WorkflowDef};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::Graph;

/// A single HTTP-operation node in a validated workflow.
///
/// This is the execution-facing shape: the editor's run-scoped presentation
/// fields are stripped at validation time. The Run owns its own per-node
/// status/response table; it never mutates these definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: String,
  pub method: HttpMethod,
  pub document_id: String,
  pub content: serde_json::Value,
}

/// A validated workflow ready for planning and execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub nodes: HashMap<String, Node>,
  pub edges: Vec<(String, String)>,
}

impl Workflow {
  /// Lock a raw definition into a validated workflow.
  ///
  /// Rejects duplicate node ids and edges referencing unknown nodes; content
  /// shape is not checked here.
  pub fn validate(def: WorkflowDef) -> Result<Self, GraphError> {
    let mut nodes = HashMap::with_capacity(def.nodes.len());
    for node_def in def.nodes {
      let node = Node {
        id: node_def.id.clone(),
        method: node_def.method,
        document_id: node_def.document_id,
        content: node_def.content,
      };
      if nodes.insert(node_def.id.clone(), node).is_some() {
        return Err(GraphError::DuplicateNode {
          node_id: node_def.id,
        });
      }
    }

    let mut edges = Vec::with_capacity(def.edges.len());
    for edge in def.edges {
      if !nodes.contains_key(&edge.source) || !nodes.contains_key(&edge.target) {
        return Err(GraphError::DanglingEdge {
          source_node: edge.source,
          target: edge.target,
        });
      }
      edges.push((edge.source, edge.target));
    }

    Ok(Self { nodes, edges })
  }

  /// Build the adjacency structure for traversal.
  pub fn graph(&self) -> Graph {
    Graph::new(&self.nodes, &self.edges)
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.get(node_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use docflow_config::{EdgeDef, NodeDef, NodeStatus};

  fn node_def(id: &str, method: HttpMethod) -> NodeDef {
    NodeDef {
      id: id.to_string(),
      method,
      document_id: format!("doc-{id}"),
      content: serde_json::Value::Null,
      status: NodeStatus::Idle,
      response: None,
    }
  }

  #[test]
  fn validate_builds_workflow() {
    let def = WorkflowDef {
      nodes: vec![node_def("a", HttpMethod::Get), node_def("b", HttpMethod::Put)],
      edges: vec![EdgeDef::new("a", "b")],
    };

    let workflow = Workflow::validate(def).unwrap();
    assert_eq!(workflow.nodes.len(), 2);
    assert_eq!(workflow.edges, vec![("a".to_string(), "b".to_string())]);
    assert_eq!(workflow.get_node("a").unwrap().method, HttpMethod::Get);
  }

  #[test]
  fn validate_strips_run_scoped_fields() {
    let mut stale = node_def("a", HttpMethod::Get);
    stale.status = NodeStatus::Error;
    stale.response = Some(serde_json::json!({"left": "over"}));

    let workflow = Workflow::validate(WorkflowDef {
      nodes: vec![stale],
      edges: vec![],
    })
    .unwrap();

    // Only the execution-facing fields survive.
    let node = workflow.get_node("a").unwrap();
    assert_eq!(node.document_id, "doc-a");
    assert!(node.content.is_null());
  }

  #[test]
  fn validate_rejects_dangling_edge() {
    let def = WorkflowDef {
      nodes: vec![node_def("a", HttpMethod::Get)],
      edges: vec![EdgeDef::new("a", "ghost")],
    };

    let err = Workflow::validate(def).unwrap_err();
    assert!(matches!(err, GraphError::DanglingEdge { .. }));
  }

  #[test]
  fn validate_rejects_duplicate_node_id() {
    let def = WorkflowDef {
      nodes: vec![node_def("a", HttpMethod::Get), node_def("a", HttpMethod::Post)],
      edges: vec![],
    };

    let err = Workflow::validate(def).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateNode { node_id } if node_id == "a"));
  }
}
