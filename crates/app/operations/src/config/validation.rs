//! Configuration validation.
//!
//! Validates configuration and collects all errors before returning,
//! enabling users to fix multiple issues in a single iteration.

use tollgate_tx::parse_chain_id;

use crate::config::types::{NodeConfig, ObservabilityConfig};
use crate::errors::ConfigError;

const VALID_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];
const VALID_FORMATS: [&str; 4] = ["json", "pretty", "text", "human"];

/// Validate the entire node configuration.
pub fn validate_config(config: &NodeConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_chain_id(&config.chain.chain_id, &mut errors);
    if let Err(policy_errors) = config.ante.validate() {
        errors.extend(policy_errors.into_iter().map(|err| format!("ante.{err}")));
    }
    validate_observability_config(&config.observability, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(errors))
    }
}

fn validate_chain_id(chain_id: &str, errors: &mut Vec<String>) {
    if chain_id.trim().is_empty() {
        errors.push("chain.chain_id cannot be empty".to_string());
        return;
    }
    if let Err(err) = parse_chain_id(chain_id) {
        errors.push(format!("chain.chain_id '{chain_id}' is invalid: {}", err.reason()));
    }
}

fn validate_observability_config(config: &ObservabilityConfig, errors: &mut Vec<String>) {
    if !VALID_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "observability.log_level '{}' is invalid. Valid levels: trace, debug, info, warn, error",
            config.log_level
        ));
    }

    if !VALID_FORMATS.contains(&config.log_format.to_lowercase().as_str()) {
        errors.push(format!(
            "observability.log_format '{}' is invalid. Valid formats: json, pretty",
            config.log_format
        ));
    }
}
