use thiserror::Error;

/// Errors that reject a graph before any node executes.
#[derive(Debug, Error)]
pub enum GraphError {
  /// An edge references a node id that does not exist.
  #[error("edge references unknown node: source='{source_node}', target='{target}'")]
  DanglingEdge { source_node: String, target: String },

  /// Two nodes share the same id.
  #[error("duplicate node id '{node_id}'")]
  DuplicateNode { node_id: String },

  /// The reachable subgraph contains a dependency cycle.
  #[error("dependency cycle among nodes: {}", node_ids.join(", "))]
  CycleDetected { node_ids: Vec<String> },

  /// A PUT node has more than one content-producing edge feeding it.
  #[error("node '{node_id}' has multiple incoming content-producing edges")]
  AmbiguousInput { node_id: String },
}
