//! Node and network configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use fungible_finality::FinalityTimeouts;
use fungible_selection::ClaimConfig;
use fungible_types::params::{
    DEFAULT_CLAIM_LEASE_SECS, DEFAULT_MAX_CLAIM_RETRIES, DEFAULT_TOKEN_SCALE,
    DEFAULT_VALIDITY_WINDOW_SECS,
};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for one ledger party.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Fixed-point scale of every token amount.
    #[serde(default = "default_token_scale")]
    pub token_scale: u8,

    /// How long a proposed transaction stays valid, in seconds.
    #[serde(default = "default_validity_window_secs")]
    pub validity_window_secs: u64,

    /// How long a claim on unspent tokens is honoured, in seconds.
    #[serde(default = "default_claim_lease_secs")]
    pub claim_lease_secs: u64,

    /// Fresh-snapshot retries when selection races with a commit.
    #[serde(default = "default_max_claim_retries")]
    pub max_claim_retries: u32,

    /// Budget for collecting every counterparty reply.
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,

    /// Budget for the notary round trip.
    #[serde(default = "default_notary_timeout_ms")]
    pub notary_timeout_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// An in-process network: one notary plus the parties it serves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Name of the single notary.
    pub notary: String,

    /// Names of the ledger parties, each of which gets its own node.
    pub parties: Vec<String>,

    /// Secret every party's signing key is derived from.
    #[serde(default = "default_network_secret")]
    pub network_secret: String,

    /// Settings shared by every node.
    #[serde(default)]
    pub node: NodeConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_token_scale() -> u8 {
    DEFAULT_TOKEN_SCALE
}

fn default_validity_window_secs() -> u64 {
    DEFAULT_VALIDITY_WINDOW_SECS
}

fn default_claim_lease_secs() -> u64 {
    DEFAULT_CLAIM_LEASE_SECS
}

fn default_max_claim_retries() -> u32 {
    DEFAULT_MAX_CLAIM_RETRIES
}

fn default_session_timeout_ms() -> u64 {
    30_000
}

fn default_notary_timeout_ms() -> u64 {
    30_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_network_secret() -> String {
    "fungible-dev-network".to_string()
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
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.token_scale > fungible_types::amount::MAX_SCALE {
            return Err(NodeError::Config(format!(
                "token_scale {} exceeds {}",
                self.token_scale,
                fungible_types::amount::MAX_SCALE
            )));
        }
        if self.validity_window_secs == 0 {
            return Err(NodeError::Config("validity_window_secs must be positive".into()));
        }
        if self.claim_lease_secs == 0 {
            return Err(NodeError::Config("claim_lease_secs must be positive".into()));
        }
        self.log_format.parse::<LogFormat>()?;
        Ok(())
    }

    pub fn claim_config(&self) -> ClaimConfig {
        ClaimConfig {
            scale: self.token_scale,
            lease_secs: self.claim_lease_secs,
            max_retries: self.max_claim_retries,
        }
    }

    pub fn timeouts(&self) -> FinalityTimeouts {
        FinalityTimeouts {
            session: Duration::from_millis(self.session_timeout_ms),
            notary: Duration::from_millis(self.notary_timeout_ms),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            token_scale: default_token_scale(),
            validity_window_secs: default_validity_window_secs(),
            claim_lease_secs: default_claim_lease_secs(),
            max_claim_retries: default_max_claim_retries(),
            session_timeout_ms: default_session_timeout_ms(),
            notary_timeout_ms: default_notary_timeout_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl NetworkConfig {
    /// Load a network description from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.node.validate()?;
        if config.notary.trim().is_empty() {
            return Err(NodeError::Config("notary name is empty".into()));
        }
        if config.parties.is_empty() {
            return Err(NodeError::Config("network has no parties".into()));
        }
        let mut names: Vec<&str> = config.parties.iter().map(|p| p.trim()).collect();
        names.push(config.notary.trim());
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(NodeError::Config(format!("duplicate party name '{}'", pair[0])));
        }
        Ok(config)
    }
}
