use docflow_workflow::GraphError;
use thiserror::Error;

/// Errors that fail a whole run.
///
/// Node-local failures are not represented here; they mark the node `error`
/// and flow out as status events without aborting the run.
#[derive(Debug, Error)]
pub enum ExecutionError {
  /// The graph was rejected before any node executed.
  #[error(transparent)]
  Graph(#[from] GraphError),

  /// The run was cancelled; in-flight store calls were allowed to finish.
  #[error("execution cancelled")]
  Cancelled,
}
