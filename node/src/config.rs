//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use badge_contracts::{BadgeContract, DEFAULT_ISSUING_AUTHORITY};
use badge_flows::FlowTimeouts;
use badge_types::PartyName;

use crate::{LogFormat, NodeError};

/// Configuration for a badge node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This node's well-known party name.
    #[serde(default = "default_node_name")]
    pub node_name: String,

    /// The only party allowed to issue badges.
    #[serde(default = "default_issuing_authority")]
    pub issuing_authority: String,

    /// Upper bound on collecting every counterparty signature, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub collection_timeout_ms: u64,

    /// Upper bound on each finality acknowledgement, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub finality_timeout_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_node_name() -> String {
    "O=PartyA, L=London, C=GB".to_string()
}

fn default_issuing_authority() -> String {
    DEFAULT_ISSUING_AUTHORITY.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }

    pub fn party_name(&self) -> Result<PartyName, NodeError> {
        PartyName::new(self.node_name.as_str())
            .map_err(|e| NodeError::Config(format!("node_name: {e}")))
    }

    /// The contract, bound to the configured issuing authority.
    pub fn contract(&self) -> Result<BadgeContract, NodeError> {
        let authority = PartyName::new(self.issuing_authority.as_str())
            .map_err(|e| NodeError::Config(format!("issuing_authority: {e}")))?;
        Ok(BadgeContract::new(authority))
    }

    pub fn timeouts(&self) -> FlowTimeouts {
        FlowTimeouts {
            collection: Duration::from_millis(self.collection_timeout_ms),
            finality: Duration::from_millis(self.finality_timeout_ms),
        }
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        match self.log_format.as_str() {
            "human" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(NodeError::Config(format!("unknown log_format {other:?}"))),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            issuing_authority: default_issuing_authority(),
            collection_timeout_ms: default_timeout_ms(),
            finality_timeout_ms: default_timeout_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
