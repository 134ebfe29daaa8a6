use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;

/// Configuration for the gateway server.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
  /// Address to bind, e.g. `127.0.0.1:3000`.
  pub bind: String,
}

/// Build the gateway router over the given state.
///
/// CORS is permissive: the canvas editor is served from its own origin
/// during development.
pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/api/health", get(routes::health))
    .route("/api/workflows/execute", post(routes::execute_workflow))
    .route(
      "/api/workflows",
      get(routes::list_workflows).post(routes::save_workflow),
    )
    .route(
      "/api/documents/{id}",
      get(routes::get_document)
        .post(routes::create_document)
        .put(routes::update_document)
        .delete(routes::delete_document),
    )
    .layer(CorsLayer::permissive())
    .with_state(state)
}

/// HTTP gateway server built on axum.
pub struct GatewayServer {
  config: GatewayConfig,
  state: Arc<AppState>,
}

impl GatewayServer {
  pub fn new(config: GatewayConfig, state: Arc<AppState>) -> Self {
    Self { config, state }
  }

  /// Run the gateway until the cancellation token is triggered.
  pub async fn run(&self, shutdown: CancellationToken) -> std::io::Result<()> {
    let app = router(self.state.clone());

    let listener = TcpListener::bind(&self.config.bind).await?;
    info!(bind = %self.config.bind, "gateway listening");

    axum::serve(listener, app)
      .with_graceful_shutdown(async move { shutdown.cancelled().await })
      .await
  }
}
