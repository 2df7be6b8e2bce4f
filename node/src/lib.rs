//! Badge node: wires one party's identity, ledger, uniqueness service and
//! network into the issue and show flows.
//!
//! The node is the entry point that:
//! - Loads its configuration and sets up structured logging
//! - Runs issue and show invocations on behalf of its party
//! - Answers signature requests and finality notices from other parties
//! - Counts what happened in Prometheus metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod tracing_spans;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::FlowMetrics;
pub use node::{BadgeNode, NodeDeps};
