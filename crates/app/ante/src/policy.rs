//! Chain-wide admission policy.

use serde::{Deserialize, Serialize};
use tollgate_core::Dec;
use tollgate_tx_eth::ForkSchedule;

pub const DEFAULT_EVM_DENOM: &str = "aISLM";

/// Which top-level EVM operations may be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AccessControl {
    pub enable_create: bool,
    pub enable_call: bool,
}

impl Default for AccessControl {
    fn default() -> Self {
        Self {
            enable_create: true,
            enable_call: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AuthParams {
    pub max_memo_characters: u64,
    pub tx_sig_limit: u64,
    pub tx_size_cost_per_byte: u64,
    pub sig_verify_cost_ed25519: u64,
    pub sig_verify_cost_eth_secp256k1: u64,
}

impl Default for AuthParams {
    fn default() -> Self {
        Self {
            max_memo_characters: 256,
            tx_sig_limit: 7,
            tx_size_cost_per_byte: 10,
            sig_verify_cost_ed25519: 590,
            sig_verify_cost_eth_secp256k1: 21_000,
        }
    }
}

/// Immutable policy shared by every chain of the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ChainPolicy {
    /// Denomination fees and EVM values are paid in.
    pub evm_denom: String,
    /// Global minimum gas price; zero waives the check.
    pub min_gas_price: Dec,
    /// Check-mode cap on each message's gas wanted; zero disables it.
    pub max_gas_wanted: u64,
    pub allow_unprotected_txs: bool,
    pub access_control: AccessControl,
    pub forks: ForkSchedule,
    pub auth: AuthParams,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self {
            evm_denom: DEFAULT_EVM_DENOM.to_string(),
            min_gas_price: Dec::ZERO,
            max_gas_wanted: 0,
            allow_unprotected_txs: false,
            access_control: AccessControl::default(),
            forks: ForkSchedule::default(),
            auth: AuthParams::default(),
        }
    }
}

impl ChainPolicy {
    /// Check the policy for internal consistency, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.evm_denom.trim().is_empty() {
            errors.push("evm_denom cannot be empty".to_string());
        }
        if self.auth.tx_sig_limit == 0 {
            errors.push("auth.tx_sig_limit must be positive".to_string());
        }
        if self.auth.max_memo_characters == 0 {
            errors.push("auth.max_memo_characters must be positive".to_string());
        }
        if let Err(err) = self.forks.validate() {
            errors.push(format!("forks: {err}"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
