//! Docflow Workflow
//!
//! Validated, read-only workflow representation plus execution planning.
//!
//! [`Workflow::validate`] locks a raw [`docflow_config::WorkflowDef`] into an
//! immutable graph: run-scoped presentation fields are stripped, duplicate
//! node ids and edges referencing unknown nodes are rejected. [`plan`] then
//! resolves the dependency order for one run: Kahn-style topological layers
//! over the subgraph reachable from the chosen start set, with cycle and
//! ambiguous-input detection up front so a run fails before any document
//! store work happens.

mod error;
mod graph;
mod plan;
mod workflow;

pub use error::GraphError;
pub use graph::Graph;
pub use plan::{ExecutionPlan, plan};
pub use workflow::{Node, Workflow};
