//! Docflow Gateway
//!
//! HTTP boundary for the execution engine, built on axum. Exposes:
//!
//! - `POST /api/workflows/execute` - run a graph; the response body is a
//!   newline-delimited JSON stream of per-node status events, flushed as
//!   they happen. End-of-stream signals run completion.
//! - `POST /api/workflows` / `GET /api/workflows` - save and load graphs.
//! - `GET|POST|PUT|DELETE /api/documents/{id}` - document CRUD for the
//!   self-contained serving mode.
//! - `GET /api/health`

mod routes;
mod server;
mod state;

pub use routes::ExecuteRequest;
pub use server::{GatewayConfig, GatewayServer, router};
pub use state::AppState;
