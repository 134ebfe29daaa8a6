//! Workflow execution engine.
//!
//! The `Engine` plans a validated workflow and drives one run: every node
//! whose predecessors are all terminal is dispatched immediately, without
//! waiting for siblings in its layer.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use docflow_config::{HttpMethod, NodeStatus};
use docflow_docstore::DocumentStore;
use docflow_workflow::{ExecutionPlan, Node, Workflow, plan};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ExecutionError;
use crate::events::{Diagnostic, ExecutionNotifier, NoopNotifier, StatusEvent};
use crate::executor::{NodeError, ResolvedInput, execute_node, resolve_target};

/// Configuration for the workflow engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Bound on each document store call.
  pub request_timeout: Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      request_timeout: Duration::from_secs(30),
    }
  }
}

/// Terminal outcome of one node within a run.
#[derive(Debug, Clone)]
pub struct NodeOutcome {
  pub status: NodeStatus,
  pub response: Option<Value>,
  pub diagnostic: Option<Diagnostic>,
}

/// Result of a complete run. Nodes that never dispatched (unreachable, or
/// left idle after cancellation) are absent.
#[derive(Debug)]
pub struct RunSummary {
  pub run_id: String,
  pub nodes: HashMap<String, NodeOutcome>,
}

/// The workflow execution engine.
///
/// Generic over `N: ExecutionNotifier` to allow different event delivery
/// strategies. Use [`Engine::new`] for a default engine that discards
/// events, or [`Engine::with_notifier`] to observe them.
pub struct Engine<N: ExecutionNotifier = NoopNotifier> {
  store: Arc<dyn DocumentStore>,
  config: EngineConfig,
  notifier: N,
}

impl Engine<NoopNotifier> {
  /// Create an engine that discards status events.
  pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
    Self::with_notifier(store, config, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> Engine<N> {
  /// Create an engine with a custom notifier.
  pub fn with_notifier(store: Arc<dyn DocumentStore>, config: EngineConfig, notifier: N) -> Self {
    Self {
      store,
      config,
      notifier,
    }
  }

  /// Execute one run of `workflow` from `start_node_ids`.
  ///
  /// Graph-level errors reject the run before any node executes; node-local
  /// failures flow out as `error` events and never abort siblings. The run
  /// completes when every reachable node is terminal.
  pub async fn execute(
    &self,
    workflow: &Workflow,
    start_node_ids: &[String],
    cancel: CancellationToken,
  ) -> Result<RunSummary, ExecutionError> {
    let run_id = Uuid::new_v4().to_string();
    let plan = plan(workflow, start_node_ids)?;

    info!(
      run_id = %run_id,
      nodes = plan.len(),
      start_nodes = ?plan.start_nodes(),
      "run_started"
    );

    let mut run = Run::new(
      &run_id,
      workflow,
      &plan,
      self.store.clone(),
      self.config.request_timeout,
      &self.notifier,
    );
    let summary = run.drive(&cancel).await;

    if cancel.is_cancelled() {
      warn!(run_id = %run_id, executed = summary.nodes.len(), "run_cancelled");
      return Err(ExecutionError::Cancelled);
    }

    info!(run_id = %run_id, executed = summary.nodes.len(), "run_completed");
    Ok(summary)
  }
}

type Completion = (String, Result<Value, NodeError>);

/// Bookkeeping for one run.
///
/// The run-scoped state table is owned exclusively by this struct, and every
/// write happens on the coordinator loop: spawned node tasks only report
/// back over the completion channel. Serializing completions this way is
/// what makes the all-predecessors-terminal check on a shared downstream
/// node race-free: a node leaves `idle` exactly once.
struct Run<'a, N: ExecutionNotifier> {
  run_id: &'a str,
  workflow: &'a Workflow,
  plan: &'a ExecutionPlan,
  store: Arc<dyn DocumentStore>,
  timeout: Duration,
  notifier: &'a N,
  /// In-plan predecessors per node.
  predecessors: HashMap<String, Vec<String>>,
  /// In-plan successors per node.
  successors: HashMap<String, Vec<String>>,
  states: HashMap<String, NodeStatus>,
  outcomes: HashMap<String, NodeOutcome>,
  pending_diagnostics: HashMap<String, Diagnostic>,
  inflight: usize,
  /// Cleared on cancellation or consumer disconnect; in-flight calls still
  /// finish, but no new node is dispatched.
  dispatching: bool,
  /// Cleared when the consumer disconnects.
  emitting: bool,
}

impl<'a, N: ExecutionNotifier> Run<'a, N> {
  fn new(
    run_id: &'a str,
    workflow: &'a Workflow,
    plan: &'a ExecutionPlan,
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
    notifier: &'a N,
  ) -> Self {
    let graph = workflow.graph();
    let mut predecessors = HashMap::with_capacity(plan.len());
    let mut successors = HashMap::with_capacity(plan.len());
    let mut states = HashMap::with_capacity(plan.len());

    for node_id in plan.members() {
      let in_plan = |ids: &[String]| -> Vec<String> {
        ids.iter().filter(|id| plan.contains(id)).cloned().collect()
      };
      predecessors.insert(node_id.clone(), in_plan(graph.upstream(node_id)));
      successors.insert(node_id.clone(), in_plan(graph.downstream(node_id)));
      states.insert(node_id.clone(), NodeStatus::Idle);
    }

    Self {
      run_id,
      workflow,
      plan,
      store,
      timeout,
      notifier,
      predecessors,
      successors,
      states,
      outcomes: HashMap::new(),
      pending_diagnostics: HashMap::new(),
      inflight: 0,
      dispatching: true,
      emitting: true,
    }
  }

  async fn drive(&mut self, cancel: &CancellationToken) -> RunSummary {
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

    if cancel.is_cancelled() {
      self.dispatching = false;
    }

    // Seed with the nodes that have no in-plan predecessors (the first
    // topological layer); everything else unlocks through completions.
    let mut ready: VecDeque<String> = self
      .plan
      .layers()
      .first()
      .map(|layer| layer.iter().cloned().collect())
      .unwrap_or_default();

    loop {
      while self.dispatching {
        let Some(node_id) = ready.pop_front() else { break };
        self.dispatch(&node_id, &tx, &mut ready);
      }

      if self.inflight == 0 {
        break;
      }

      tokio::select! {
        completion = rx.recv() => {
          if let Some((node_id, result)) = completion {
            self.inflight -= 1;
            self.finish(&node_id, result, &mut ready);
          }
        }
        _ = cancel.cancelled(), if self.dispatching => {
          debug!(run_id = %self.run_id, "cancellation requested; draining in-flight nodes");
          self.dispatching = false;
        }
      }
    }

    RunSummary {
      run_id: self.run_id.to_string(),
      nodes: std::mem::take(&mut self.outcomes),
    }
  }

  /// Move a node out of `idle`: either straight to `error` when no target
  /// document id resolves, or to `running` with a spawned store call.
  fn dispatch(
    &mut self,
    node_id: &str,
    tx: &mpsc::UnboundedSender<Completion>,
    ready: &mut VecDeque<String>,
  ) {
    if self.states.get(node_id) != Some(&NodeStatus::Idle) {
      return;
    }
    let Some(node) = self.workflow.get_node(node_id) else {
      return;
    };

    let input = self.resolve_input(node);
    if input.propagation_skipped {
      self
        .pending_diagnostics
        .insert(node_id.to_string(), Diagnostic::PropagationSkipped);
    }

    if resolve_target(node, &input).is_none() {
      // No target and no producer to supply one: the node fails without
      // ever reporting `running` or touching the store.
      self.finish(node_id, Err(NodeError::MissingTarget), ready);
      return;
    }

    debug!(
      run_id = %self.run_id,
      node_id = %node_id,
      method = %node.method,
      "node_started"
    );
    self.states.insert(node_id.to_string(), NodeStatus::Running);
    self.emit(StatusEvent::running(node_id));

    self.inflight += 1;
    let store = self.store.clone();
    let node = node.clone();
    let timeout = self.timeout;
    let tx = tx.clone();
    let id = node_id.to_string();
    tokio::spawn(async move {
      let result = execute_node(store.as_ref(), &node, &input, timeout).await;
      let _ = tx.send((id, result));
    });
  }

  /// Record a node's terminal state, emit its event, and queue downstream
  /// nodes whose predecessors are now all terminal.
  fn finish(
    &mut self,
    node_id: &str,
    result: Result<Value, NodeError>,
    ready: &mut VecDeque<String>,
  ) {
    let diagnostic = self.pending_diagnostics.remove(node_id);
    let outcome = match result {
      Ok(payload) => {
        debug!(run_id = %self.run_id, node_id = %node_id, "node_succeeded");
        NodeOutcome {
          status: NodeStatus::Success,
          response: Some(payload),
          diagnostic,
        }
      }
      Err(err) => {
        warn!(
          run_id = %self.run_id,
          node_id = %node_id,
          kind = err.kind(),
          error = %err,
          "node_failed"
        );
        NodeOutcome {
          status: NodeStatus::Error,
          response: Some(err.to_response()),
          diagnostic,
        }
      }
    };

    self.states.insert(node_id.to_string(), outcome.status);
    self.emit(StatusEvent::terminal(
      node_id,
      outcome.status,
      outcome.response.clone(),
      outcome.diagnostic,
    ));
    self.outcomes.insert(node_id.to_string(), outcome);

    if !self.dispatching {
      return;
    }
    let successors = self.successors.get(node_id).cloned().unwrap_or_default();
    for succ in successors {
      let eligible = self.states.get(&succ) == Some(&NodeStatus::Idle)
        && self
          .predecessors
          .get(&succ)
          .is_some_and(|preds| preds.iter().all(|p| self.is_terminal(p)));
      if eligible {
        ready.push_back(succ);
      }
    }
  }

  fn is_terminal(&self, node_id: &str) -> bool {
    self
      .states
      .get(node_id)
      .is_some_and(|status| status.is_terminal())
  }

  /// Gather the input a node receives from its upstream edges.
  ///
  /// Propagation is defined for PUT with a single producing edge only; the
  /// planner has already rejected multi-fed PUT nodes. A failed producer
  /// yields no data: the node falls back to its static content and carries
  /// a `propagationSkipped` diagnostic instead of failing.
  fn resolve_input(&self, node: &Node) -> ResolvedInput {
    if node.method != HttpMethod::Put {
      return ResolvedInput::default();
    }
    let Some(producer_id) = self.predecessors.get(&node.id).and_then(|p| p.first()) else {
      return ResolvedInput::default();
    };

    match self.outcomes.get(producer_id) {
      Some(outcome) if outcome.status == NodeStatus::Success => {
        let payload = outcome.response.clone();
        let document_id = payload
          .as_ref()
          .and_then(|value| value.get("documentId"))
          .and_then(|value| value.as_str())
          .map(String::from);
        ResolvedInput {
          payload,
          document_id,
          propagation_skipped: false,
        }
      }
      _ => ResolvedInput {
        payload: None,
        document_id: None,
        propagation_skipped: true,
      },
    }
  }

  fn emit(&mut self, event: StatusEvent) {
    if !self.emitting {
      return;
    }
    if !self.notifier.notify(event) {
      debug!(
        run_id = %self.run_id,
        "status consumer disconnected; halting new dispatch"
      );
      self.emitting = false;
      self.dispatching = false;
    }
  }
}
