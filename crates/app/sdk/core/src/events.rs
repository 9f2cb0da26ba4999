//! Ledger events emitted into the execution context for downstream indexing.

use serde::Serialize;

pub const EVENT_TYPE_TX: &str = "tx";
pub const EVENT_TYPE_ETHEREUM_TX: &str = "ethereum_tx";
pub const EVENT_TYPE_CLAIM_STAKING_REWARDS: &str = "claim_staking_rewards";

pub const ATTRIBUTE_KEY_FEE: &str = "fee";
pub const ATTRIBUTE_KEY_FEE_PAYER: &str = "fee_payer";
pub const ATTRIBUTE_KEY_ACC_SEQ: &str = "acc_seq";
pub const ATTRIBUTE_KEY_SIGNATURE: &str = "signature";
pub const ATTRIBUTE_KEY_DELEGATOR: &str = "delegator";
pub const ATTRIBUTE_KEY_AMOUNT: &str = "amount";
pub const ATTRIBUTE_KEY_ETH_TX_HASH: &str = "ethereum_tx_hash";
pub const ATTRIBUTE_KEY_TX_INDEX: &str = "tx_index";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push(EventAttribute {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}
