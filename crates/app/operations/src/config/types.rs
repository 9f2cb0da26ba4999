//! Configuration types for a node running the admission pipeline.

use serde::Deserialize;
use tollgate_ante::ChainPolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub chain: ChainConfig,

    /// Admission policy handed to the ante handler. Every field defaults.
    #[serde(default)]
    pub ante: ChainPolicy,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl NodeConfig {
    /// The policy the handler is built with.
    pub fn policy(&self) -> ChainPolicy {
        self.ante.clone()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Chain identifier of the form `{name}_{eip155}-{version}`.
    pub chain_id: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Log level: trace, debug, info, warn, error. Default: info.
    #[serde(default = "ObservabilityConfig::default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty. Default: json.
    #[serde(default = "ObservabilityConfig::default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            log_format: Self::default_log_format(),
        }
    }
}

impl ObservabilityConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_log_format() -> String {
        "json".to_string()
    }
}
