//! Docflow Engine
//!
//! The graph execution engine: takes a validated workflow and a start set,
//! resolves the dependency order, performs per-node document operations with
//! data propagation along edges, and emits one status event per node-state
//! transition.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │  - execute(workflow, start_node_ids, cancel)                │
//! │  - plans the graph, rejects cycles/ambiguity up front       │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Run (coordinator)                       │
//! │  - single-writer state table: idle → running → terminal     │
//! │  - spawns a task per dispatched node, gathers completions   │
//! │    over a channel, unlocks downstream nodes as predecessors │
//! │    turn terminal                                            │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       execute_node                          │
//! │  - one document store call per node, bounded by a timeout   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events flow out through an [`ExecutionNotifier`]; the gateway drains a
//! [`ChannelNotifier`] into a newline-delimited JSON response body.

mod engine;
mod error;
mod events;
mod executor;

pub use engine::{Engine, EngineConfig, NodeOutcome, RunSummary};
pub use error::ExecutionError;
pub use events::{ChannelNotifier, Diagnostic, ExecutionNotifier, NoopNotifier, StatusEvent};
pub use executor::{NodeError, ResolvedInput, execute_node, resolve_target};
