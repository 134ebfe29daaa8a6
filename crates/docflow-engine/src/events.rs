//! Execution events and notifiers for observability.
//!
//! One event is emitted per node-state transition: `running` when a node is
//! dispatched, then exactly one terminal `success`/`error` event carrying the
//! node's response. Consumers decide what to do with them (stream to a
//! client, log, collect, ignore).

use docflow_config::NodeStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Diagnostic attached to a node's terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Diagnostic {
  /// The node's producing predecessor failed, so it ran with its static
  /// content instead of propagated data.
  PropagationSkipped,
}

/// One node-state transition, as streamed to the caller.
///
/// Serializes as `{"nodeId": ..., "status": ..., "response": ...}`;
/// `response` is always present (null while running), `diagnostic` only when
/// set, so consumers of the minimal record shape parse unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
  pub node_id: String,
  pub status: NodeStatus,
  pub response: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub diagnostic: Option<Diagnostic>,
}

impl StatusEvent {
  /// Event marking a node as dispatched, emitted before its store call.
  pub fn running(node_id: &str) -> Self {
    Self {
      node_id: node_id.to_string(),
      status: NodeStatus::Running,
      response: None,
      diagnostic: None,
    }
  }

  /// Terminal event for a node.
  pub fn terminal(
    node_id: &str,
    status: NodeStatus,
    response: Option<Value>,
    diagnostic: Option<Diagnostic>,
  ) -> Self {
    Self {
      node_id: node_id.to_string(),
      status,
      response,
      diagnostic,
    }
  }
}

/// Trait for receiving execution events.
///
/// The engine calls `notify` for each event. The return value is the
/// consumer's liveness: `false` means nobody is listening anymore, and the
/// coordinator stops dispatching new nodes (in-flight calls still finish).
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: StatusEvent) -> bool;
}

/// A no-op notifier that discards all events.
///
/// Useful for CLI summaries or tests where only the run result matters.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: StatusEvent) -> bool {
    true
  }
}

/// A notifier that sends events to an unbounded channel.
///
/// Unbounded so a slow consumer never blocks coordinator bookkeeping; the
/// event volume is bounded by two events per node.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<StatusEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: StatusEvent) -> bool {
    self.sender.send(event).is_ok()
  }
}
