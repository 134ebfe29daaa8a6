use std::fmt;

use serde::{Deserialize, Serialize};

/// The HTTP-style operation a node performs against the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
  Get,
  Post,
  Put,
  Delete,
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      HttpMethod::Get => "GET",
      HttpMethod::Post => "POST",
      HttpMethod::Put => "PUT",
      HttpMethod::Delete => "DELETE",
    };
    f.write_str(s)
  }
}

/// Run-scoped state of a node.
///
/// `Success` and `Error` are terminal; a node never leaves a terminal status
/// within the same run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
  #[default]
  Idle,
  Running,
  Success,
  Error,
}

impl NodeStatus {
  /// Whether this status is terminal for the run.
  pub fn is_terminal(&self) -> bool {
    matches!(self, NodeStatus::Success | NodeStatus::Error)
  }
}

impl fmt::Display for NodeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      NodeStatus::Idle => "idle",
      NodeStatus::Running => "running",
      NodeStatus::Success => "success",
      NodeStatus::Error => "error",
    };
    f.write_str(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn method_serializes_uppercase() {
    assert_eq!(
      serde_json::to_string(&HttpMethod::Delete).unwrap(),
      r#""DELETE""#
    );
    let parsed: HttpMethod = serde_json::from_str(r#""GET""#).unwrap();
    assert_eq!(parsed, HttpMethod::Get);
  }

  #[test]
  fn status_serializes_lowercase() {
    assert_eq!(
      serde_json::to_string(&NodeStatus::Running).unwrap(),
      r#""running""#
    );
    assert!(NodeStatus::Error.is_terminal());
    assert!(!NodeStatus::Idle.is_terminal());
  }
}
