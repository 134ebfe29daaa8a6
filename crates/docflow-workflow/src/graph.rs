use std::collections::{HashMap, HashSet, VecDeque};

use crate::workflow::Node;

/// Adjacency structure for graph traversal, built once per workflow and read
/// many times during planning and execution.
#[derive(Debug, Clone)]
pub struct Graph {
  /// node_id -> downstream node_ids.
  adjacency: HashMap<String, Vec<String>>,
  /// node_id -> upstream node_ids.
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// Nodes with no incoming edges.
  entry_points: Vec<String>,
}

impl Graph {
  pub fn new(nodes: &HashMap<String, Node>, edges: &[(String, String)]) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    for node_id in nodes.keys() {
      adjacency.entry(node_id.clone()).or_default();
      reverse_adjacency.entry(node_id.clone()).or_default();
    }

    for (source, target) in edges {
      adjacency
        .entry(source.clone())
        .or_default()
        .push(target.clone());
      reverse_adjacency
        .entry(target.clone())
        .or_default()
        .push(source.clone());
    }

    let mut entry_points: Vec<String> = nodes
      .keys()
      .filter(|id| reverse_adjacency.get(*id).is_none_or(|v| v.is_empty()))
      .cloned()
      .collect();
    entry_points.sort();

    Self {
      adjacency,
      reverse_adjacency,
      entry_points,
    }
  }

  /// Nodes with no incoming edges, in sorted order.
  pub fn entry_points(&self) -> &[String] {
    &self.entry_points
  }

  /// Downstream nodes of `node_id`.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Upstream nodes of `node_id`.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// All nodes reachable from `start_ids` by following edges forward,
  /// including the start nodes themselves.
  pub fn reachable_from(&self, start_ids: &[String]) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    for id in start_ids {
      if self.adjacency.contains_key(id) && seen.insert(id.clone()) {
        queue.push_back(id);
      }
    }

    while let Some(id) = queue.pop_front() {
      for next in self.downstream(id) {
        if seen.insert(next.clone()) {
          queue.push_back(next);
        }
      }
    }

    seen
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use docflow_config::HttpMethod;

  fn build(node_ids: &[&str], edges: &[(&str, &str)]) -> Graph {
    let nodes: HashMap<String, Node> = node_ids
      .iter()
      .map(|id| {
        (
          id.to_string(),
          Node {
            id: id.to_string(),
            method: HttpMethod::Get,
            document_id: id.to_string(),
            content: serde_json::Value::Null,
          },
        )
      })
      .collect();
    let edges: Vec<(String, String)> = edges
      .iter()
      .map(|(s, t)| (s.to_string(), t.to_string()))
      .collect();
    Graph::new(&nodes, &edges)
  }

  #[test]
  fn adjacency_both_directions() {
    let graph = build(&["a", "b", "c"], &[("a", "b"), ("a", "c"), ("b", "c")]);

    let mut down = graph.downstream("a").to_vec();
    down.sort();
    assert_eq!(down, vec!["b", "c"]);

    let mut up = graph.upstream("c").to_vec();
    up.sort();
    assert_eq!(up, vec!["a", "b"]);
    assert!(graph.upstream("a").is_empty());
  }

  #[test]
  fn entry_points_are_sourceless_nodes() {
    let graph = build(&["a", "b", "c"], &[("a", "b")]);
    assert_eq!(graph.entry_points(), &["a".to_string(), "c".to_string()]);
  }

  #[test]
  fn reachability_follows_edges_forward() {
    let graph = build(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c")]);

    let reachable = graph.reachable_from(&["a".to_string()]);
    assert_eq!(reachable.len(), 3);
    assert!(reachable.contains("c"));
    assert!(!reachable.contains("d"));
  }

  #[test]
  fn reachability_ignores_unknown_start_ids() {
    let graph = build(&["a"], &[]);
    let reachable = graph.reachable_from(&["ghost".to_string()]);
    assert!(reachable.is_empty());
  }
}
