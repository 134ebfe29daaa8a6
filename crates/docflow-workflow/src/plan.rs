use std::collections::{HashMap, HashSet};

use docflow_config::HttpMethod;
use tracing::warn;

use crate::error::GraphError;
use crate::workflow::Workflow;

/// The resolved partial order for one run.
///
/// Layers are sufficient to run all members of a layer concurrently once
/// their predecessors complete; the coordinator dispatches opportunistically
/// (a node starts the instant its own predecessors finish), so layers are a
/// proof of acyclicity and a progress order, not a synchronization barrier.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
  layers: Vec<Vec<String>>,
  start_nodes: Vec<String>,
  members: HashSet<String>,
  lenient_start: bool,
}

impl ExecutionPlan {
  /// Topological layers over the reachable subgraph.
  pub fn layers(&self) -> &[Vec<String>] {
    &self.layers
  }

  /// The effective start nodes after any fallback.
  pub fn start_nodes(&self) -> &[String] {
    &self.start_nodes
  }

  /// Whether `node_id` participates in this run. Nodes outside the plan are
  /// unreachable from the start set and stay idle.
  pub fn contains(&self, node_id: &str) -> bool {
    self.members.contains(node_id)
  }

  /// Ids of all nodes in the plan.
  pub fn members(&self) -> impl Iterator<Item = &String> {
    self.members.iter()
  }

  /// Number of nodes that will execute.
  pub fn len(&self) -> usize {
    self.members.len()
  }

  pub fn is_empty(&self) -> bool {
    self.members.is_empty()
  }

  /// True when no start nodes were supplied and the planner fell back to a
  /// default start set to guarantee forward progress.
  pub fn lenient_start(&self) -> bool {
    self.lenient_start
  }
}

/// Compute the execution order for a run of `workflow` from `start_node_ids`.
///
/// Nodes unreachable from the start set are excluded (not an error). An empty
/// start set falls back to every node with zero incoming edges; if that set
/// is empty too (a graph with edges but no source), it falls back once more
/// to a single arbitrary node (deterministically the first id in sorted
/// order) so malformed graphs still make progress. Both fallbacks are
/// diagnostics, not errors.
pub fn plan(workflow: &Workflow, start_node_ids: &[String]) -> Result<ExecutionPlan, GraphError> {
  let graph = workflow.graph();

  let mut start_nodes: Vec<String> = start_node_ids
    .iter()
    .filter(|id| workflow.nodes.contains_key(*id))
    .cloned()
    .collect();

  let mut lenient_start = false;
  if start_nodes.is_empty() && !workflow.nodes.is_empty() {
    lenient_start = true;
    start_nodes = graph.entry_points().to_vec();
    if start_nodes.is_empty() {
      // Every node has an incoming edge; pick one node so the run can move.
      let mut ids: Vec<&String> = workflow.nodes.keys().collect();
      ids.sort();
      start_nodes = vec![ids[0].clone()];
    }
    warn!(
      start_nodes = ?start_nodes,
      "no start nodes supplied; falling back to a default start set"
    );
  }

  let members = graph.reachable_from(&start_nodes);

  // A PUT node fed by more than one edge has no defined propagation
  // semantics; fail the run before any document store work happens.
  for node_id in &members {
    let node = match workflow.get_node(node_id) {
      Some(node) => node,
      None => continue,
    };
    if node.method == HttpMethod::Put {
      let producers = graph
        .upstream(node_id)
        .iter()
        .filter(|up| members.contains(*up))
        .count();
      if producers > 1 {
        return Err(GraphError::AmbiguousInput {
          node_id: node_id.clone(),
        });
      }
    }
  }

  // Kahn peeling restricted to the reachable subgraph: nodes are removed
  // from `remaining` as they peel; anything left over sits on a cycle.
  let mut remaining: HashMap<String, usize> = members
    .iter()
    .map(|id| {
      let degree = graph
        .upstream(id)
        .iter()
        .filter(|up| members.contains(*up))
        .count();
      (id.clone(), degree)
    })
    .collect();

  let mut current: Vec<String> = remaining
    .iter()
    .filter(|(_, degree)| **degree == 0)
    .map(|(id, _)| id.clone())
    .collect();
  current.sort();
  for id in &current {
    remaining.remove(id);
  }

  let mut layers: Vec<Vec<String>> = Vec::new();
  while !current.is_empty() {
    for id in &current {
      for next in graph.downstream(id) {
        if let Some(degree) = remaining.get_mut(next) {
          *degree -= 1;
        }
      }
    }

    let mut next_layer: Vec<String> = remaining
      .iter()
      .filter(|(_, degree)| **degree == 0)
      .map(|(id, _)| id.clone())
      .collect();
    next_layer.sort();
    for id in &next_layer {
      remaining.remove(id);
    }

    layers.push(std::mem::replace(&mut current, next_layer));
  }

  if !remaining.is_empty() {
    let mut node_ids: Vec<String> = remaining.into_keys().collect();
    node_ids.sort();
    return Err(GraphError::CycleDetected { node_ids });
  }

  start_nodes.sort();
  start_nodes.dedup();

  Ok(ExecutionPlan {
    layers,
    start_nodes,
    members,
    lenient_start,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use docflow_config::{EdgeDef, NodeDef, WorkflowDef};

  fn workflow(nodes: &[(&str, HttpMethod)], edges: &[(&str, &str)]) -> Workflow {
    let def = WorkflowDef {
      nodes: nodes
        .iter()
        .map(|(id, method)| NodeDef {
          id: id.to_string(),
          method: *method,
          document_id: id.to_string(),
          content: serde_json::Value::Null,
          status: Default::default(),
          response: None,
        })
        .collect(),
      edges: edges.iter().map(|(s, t)| EdgeDef::new(*s, *t)).collect(),
    };
    Workflow::validate(def).unwrap()
  }

  fn starts(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn layers_follow_dependencies() {
    let wf = workflow(
      &[
        ("a", HttpMethod::Get),
        ("b", HttpMethod::Get),
        ("c", HttpMethod::Get),
        ("d", HttpMethod::Get),
      ],
      &[("a", "c"), ("b", "c"), ("c", "d")],
    );

    let plan = plan(&wf, &starts(&["a", "b"])).unwrap();
    assert_eq!(
      plan.layers(),
      &[
        vec!["a".to_string(), "b".to_string()],
        vec!["c".to_string()],
        vec!["d".to_string()],
      ]
    );
    assert!(!plan.lenient_start());
  }

  #[test]
  fn unreachable_nodes_are_excluded() {
    let wf = workflow(
      &[
        ("a", HttpMethod::Get),
        ("b", HttpMethod::Get),
        ("x", HttpMethod::Get),
        ("y", HttpMethod::Get),
      ],
      &[("a", "b"), ("x", "y")],
    );

    let plan = plan(&wf, &starts(&["a"])).unwrap();
    assert_eq!(plan.len(), 2);
    assert!(plan.contains("b"));
    assert!(!plan.contains("x"));
    assert!(!plan.contains("y"));
  }

  #[test]
  fn cycle_is_detected() {
    let wf = workflow(
      &[
        ("a", HttpMethod::Get),
        ("b", HttpMethod::Get),
        ("c", HttpMethod::Get),
      ],
      &[("a", "b"), ("b", "c"), ("c", "b")],
    );

    let err = plan(&wf, &starts(&["a"])).unwrap_err();
    match err {
      GraphError::CycleDetected { node_ids } => {
        assert_eq!(node_ids, vec!["b".to_string(), "c".to_string()]);
      }
      other => panic!("expected CycleDetected, got {other:?}"),
    }
  }

  #[test]
  fn cycle_outside_reachable_subgraph_is_ignored() {
    let wf = workflow(
      &[
        ("a", HttpMethod::Get),
        ("x", HttpMethod::Get),
        ("y", HttpMethod::Get),
      ],
      &[("x", "y"), ("y", "x")],
    );

    let plan = plan(&wf, &starts(&["a"])).unwrap();
    assert_eq!(plan.len(), 1);
  }

  #[test]
  fn multi_fed_put_is_ambiguous_at_plan_time() {
    let wf = workflow(
      &[
        ("a", HttpMethod::Get),
        ("b", HttpMethod::Get),
        ("p", HttpMethod::Put),
      ],
      &[("a", "p"), ("b", "p")],
    );

    let err = plan(&wf, &starts(&["a", "b"])).unwrap_err();
    assert!(matches!(err, GraphError::AmbiguousInput { node_id } if node_id == "p"));
  }

  #[test]
  fn multi_fed_non_put_is_allowed() {
    let wf = workflow(
      &[
        ("a", HttpMethod::Get),
        ("b", HttpMethod::Get),
        ("g", HttpMethod::Get),
      ],
      &[("a", "g"), ("b", "g")],
    );

    assert!(plan(&wf, &starts(&["a", "b"])).is_ok());
  }

  #[test]
  fn empty_start_set_falls_back_to_entry_points() {
    let wf = workflow(
      &[("a", HttpMethod::Get), ("b", HttpMethod::Get)],
      &[("a", "b")],
    );

    let plan = plan(&wf, &[]).unwrap();
    assert!(plan.lenient_start());
    assert_eq!(plan.start_nodes(), &["a".to_string()]);
    assert_eq!(plan.len(), 2);
  }

  #[test]
  fn sourceless_graph_falls_back_to_single_node() {
    // Every node has an incoming edge, so there is no entry point; the
    // planner still picks one node, which then trips cycle detection.
    let wf = workflow(
      &[("a", HttpMethod::Get), ("b", HttpMethod::Get)],
      &[("a", "b"), ("b", "a")],
    );

    let err = plan(&wf, &[]).unwrap_err();
    assert!(matches!(err, GraphError::CycleDetected { .. }));
  }

  #[test]
  fn unknown_start_ids_are_dropped() {
    let wf = workflow(&[("a", HttpMethod::Get)], &[]);

    let plan = plan(&wf, &starts(&["ghost", "a"])).unwrap();
    assert_eq!(plan.start_nodes(), &["a".to_string()]);
    assert!(!plan.lenient_start());
  }

  #[test]
  fn empty_graph_plans_empty() {
    let wf = workflow(&[], &[]);
    let plan = plan(&wf, &[]).unwrap();
    assert!(plan.is_empty());
    assert!(plan.layers().is_empty());
  }
}
