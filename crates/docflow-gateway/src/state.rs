use std::sync::Arc;

use docflow_docstore::DocumentStore;
use docflow_engine::EngineConfig;
use docflow_store::Store;

/// Shared state handed to every request handler.
pub struct AppState {
  /// Document store the engine executes against.
  pub documents: Arc<dyn DocumentStore>,
  /// Persistence for saved workflow graphs.
  pub workflows: Arc<dyn Store>,
  /// Per-run engine configuration.
  pub engine: EngineConfig,
}
