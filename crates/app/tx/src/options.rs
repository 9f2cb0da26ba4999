//! Extension options attached to a transaction body.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

pub const ETHEREUM_TX_OPTION_TYPE_URL: &str = "/ethermint.evm.v1.ExtensionOptionsEthereumTx";
pub const WEB3_TX_OPTION_TYPE_URL: &str = "/ethermint.types.v1.ExtensionOptionsWeb3Tx";
pub const DYNAMIC_FEE_TX_OPTION_TYPE_URL: &str = "/ethermint.types.v1.ExtensionOptionDynamicFeeTx";

/// Fee payer signature produced by an EIP-712 wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Web3TxOption {
    pub typed_data_chain_id: u64,
    pub fee_payer: Address,
    pub fee_payer_sig: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionOption {
    EthereumTx,
    Web3Tx(Web3TxOption),
    /// Caps the tip paid on top of the base fee by a native transaction.
    DynamicFeeTx { max_priority_price: U256 },
    /// Any option this node does not understand, by type url.
    Unknown(String),
}

impl ExtensionOption {
    pub fn type_url(&self) -> &str {
        match self {
            Self::EthereumTx => ETHEREUM_TX_OPTION_TYPE_URL,
            Self::Web3Tx(_) => WEB3_TX_OPTION_TYPE_URL,
            Self::DynamicFeeTx { .. } => DYNAMIC_FEE_TX_OPTION_TYPE_URL,
            Self::Unknown(type_url) => type_url,
        }
    }
}
