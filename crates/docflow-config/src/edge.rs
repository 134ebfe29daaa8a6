use serde::{Deserialize, Serialize};

/// A directed edge between two nodes.
///
/// Direction encodes both dependency (target waits for source) and, for PUT
/// targets, data propagation of the source's response into the request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDef {
  /// Editor-assigned edge id; irrelevant to execution.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  pub source: String,
  pub target: String,
}

impl EdgeDef {
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      id: None,
      source: source.into(),
      target: target.into(),
    }
  }
}
