//! Builders for signed Ethereum messages and native wrapper transactions.

use alloy_consensus::{SignableTransaction, TxEip1559, TxEip2930, TxLegacy};
use alloy_primitives::{Address, Bytes, TxKind, U256};
use tollgate_core::{Coins, IntoAmount};
use tollgate_tx::eip712::typed_data_hash;
use tollgate_tx::sign_doc::sign_hash;
use tollgate_tx::{
    ExtensionOption, Message, SignMode, SignerData, SignerInfo, Tx, Web3TxOption,
};
use tollgate_tx_eth::{EthereumMsg, TypedTransaction};

use crate::keys::TestKey;
use crate::ledger::{TEST_CHAIN_ID, TEST_DENOM, TEST_EIP155_CHAIN_ID};

/// Default recipient of built Ethereum messages.
pub const RECIPIENT: Address = Address::repeat_byte(0x42);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pricing {
    Legacy { gas_price: u128 },
    AccessList { gas_price: u128 },
    Dynamic { fee_cap: u128, tip_cap: u128 },
}

/// A plain transfer to [`RECIPIENT`]: legacy, EIP-155 protected, nonce 0,
/// 21000 gas at price 1, no value. Setters override one field each.
#[derive(Debug, Clone)]
pub struct EthMsgBuilder {
    chain_id: Option<u64>,
    nonce: u64,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
    pricing: Pricing,
}

impl Default for EthMsgBuilder {
    fn default() -> Self {
        Self {
            chain_id: Some(TEST_EIP155_CHAIN_ID),
            nonce: 0,
            gas_limit: 21_000,
            to: TxKind::Call(RECIPIENT),
            value: U256::ZERO,
            input: Bytes::new(),
            pricing: Pricing::Legacy { gas_price: 1 },
        }
    }
}

impl EthMsgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn value(mut self, value: impl IntoAmount) -> Self {
        self.value = value.into_amount();
        self
    }

    pub fn to(mut self, to: Address) -> Self {
        self.to = TxKind::Call(to);
        self
    }

    pub fn create(mut self, init_code: impl Into<Bytes>) -> Self {
        self.to = TxKind::Create;
        self.input = init_code.into();
        self
    }

    pub fn input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = input.into();
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Sign with the pre-EIP-155 hash. Legacy pricing only.
    pub fn unprotected(mut self) -> Self {
        self.chain_id = None;
        self
    }

    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.pricing = Pricing::Legacy { gas_price };
        self
    }

    pub fn access_list(mut self, gas_price: u128) -> Self {
        self.pricing = Pricing::AccessList { gas_price };
        self
    }

    pub fn dynamic_fee(mut self, fee_cap: u128, tip_cap: u128) -> Self {
        self.pricing = Pricing::Dynamic { fee_cap, tip_cap };
        self
    }

    pub fn sign(&self, key: &TestKey) -> EthereumMsg {
        let chain_id = self.chain_id.unwrap_or(TEST_EIP155_CHAIN_ID);
        match self.pricing {
            Pricing::Legacy { gas_price } => {
                let tx = TxLegacy {
                    chain_id: self.chain_id,
                    nonce: self.nonce,
                    gas_price,
                    gas_limit: self.gas_limit,
                    to: self.to,
                    value: self.value,
                    input: self.input.clone(),
                };
                let sig = key.sign_hash(tx.signature_hash());
                EthereumMsg::new(tx.into_signed(sig))
            }
            Pricing::AccessList { gas_price } => {
                let tx = TxEip2930 {
                    chain_id,
                    nonce: self.nonce,
                    gas_price,
                    gas_limit: self.gas_limit,
                    to: self.to,
                    value: self.value,
                    access_list: Default::default(),
                    input: self.input.clone(),
                };
                let sig = key.sign_hash(tx.signature_hash());
                EthereumMsg::new(tx.into_signed(sig))
            }
            Pricing::Dynamic { fee_cap, tip_cap } => {
                let tx = TxEip1559 {
                    chain_id,
                    nonce: self.nonce,
                    gas_limit: self.gas_limit,
                    max_fee_per_gas: fee_cap,
                    max_priority_fee_per_gas: tip_cap,
                    to: self.to,
                    value: self.value,
                    access_list: Default::default(),
                    input: self.input.clone(),
                };
                let sig = key.sign_hash(tx.signature_hash());
                EthereumMsg::new(tx.into_signed(sig))
            }
        }
    }
}

/// Wrap Ethereum messages in a well-formed envelope: the Ethereum option,
/// a fee equal to the summed message fees and the summed gas limit.
pub fn eth_tx(msgs: Vec<EthereumMsg>) -> Tx {
    let fee = msgs
        .iter()
        .fold(U256::ZERO, |acc, msg| acc.saturating_add(msg.data().fee()));
    let gas = msgs
        .iter()
        .fold(0u64, |acc, msg| acc.saturating_add(msg.data().gas_limit()));
    let mut tx = Tx::default();
    tx.body.messages = msgs.into_iter().map(Message::from).collect();
    tx.body.extension_options = vec![ExtensionOption::EthereumTx];
    tx.auth_info.fee.amount = Coins::single(TEST_DENOM, fee);
    tx.auth_info.fee.gas_limit = gas;
    tx
}

/// One signer of a native transaction with its on-ledger account state.
#[derive(Debug, Clone, Copy)]
pub struct Signer<'a> {
    pub key: &'a TestKey,
    pub account_number: u64,
    pub sequence: u64,
}

impl<'a> Signer<'a> {
    pub fn new(key: &'a TestKey, account_number: u64, sequence: u64) -> Self {
        Self {
            key,
            account_number,
            sequence,
        }
    }

    fn signer_data(&self, chain_id: &str) -> SignerData {
        SignerData {
            chain_id: chain_id.to_string(),
            account_number: self.account_number,
            sequence: self.sequence,
        }
    }
}

/// Builds native wrapper transactions.
#[derive(Debug, Clone)]
pub struct NativeTxBuilder {
    tx: Tx,
    chain_id: String,
}

impl NativeTxBuilder {
    pub fn new(msgs: impl IntoIterator<Item = Message>) -> Self {
        let mut tx = Tx::default();
        tx.body.messages = msgs.into_iter().collect();
        tx.auth_info.fee.gas_limit = 200_000;
        Self {
            tx,
            chain_id: TEST_CHAIN_ID.to_string(),
        }
    }

    pub fn chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    pub fn fee(mut self, amount: impl IntoAmount, gas_limit: u64) -> Self {
        self.tx.auth_info.fee.amount = Coins::single(TEST_DENOM, amount);
        self.tx.auth_info.fee.gas_limit = gas_limit;
        self
    }

    pub fn fee_coins(mut self, amount: Coins) -> Self {
        self.tx.auth_info.fee.amount = amount;
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.tx.body.memo = memo.into();
        self
    }

    pub fn timeout_height(mut self, height: u64) -> Self {
        self.tx.body.timeout_height = height;
        self
    }

    pub fn payer(mut self, payer: Address) -> Self {
        self.tx.auth_info.fee.payer = Some(payer);
        self
    }

    pub fn granter(mut self, granter: Address) -> Self {
        self.tx.auth_info.fee.granter = Some(granter);
        self
    }

    pub fn extension_option(mut self, option: ExtensionOption) -> Self {
        self.tx.body.extension_options.push(option);
        self
    }

    /// The transaction without signer infos or signatures.
    pub fn unsigned(self) -> Tx {
        self.tx
    }

    /// Sign for every signer in order with `mode`.
    pub fn sign(self, mode: SignMode, signers: &[Signer<'_>]) -> Tx {
        let mut tx = self.tx;
        tx.auth_info.signer_infos = signers
            .iter()
            .map(|signer| SignerInfo {
                pubkey: Some(signer.key.pubkey()),
                sign_mode: mode,
                sequence: signer.sequence,
            })
            .collect();
        tx.signatures.clear();
        let mut signatures = Vec::with_capacity(signers.len());
        for signer in signers {
            let hash = sign_hash(mode, &tx, &signer.signer_data(&self.chain_id))
                .expect("sign doc encodes");
            signatures.push(signer.key.sign_hash_rsv(hash));
        }
        tx.signatures = signatures;
        tx
    }

    /// Sign as an EIP-712 wallet: the fee payer signature travels in the
    /// `Web3Tx` option and the native signature stays empty.
    pub fn sign_eip712(self, signer: Signer<'_>, typed_data_chain_id: u64) -> Tx {
        let mut tx = self.tx;
        let fee_payer = signer.key.address();
        tx.auth_info.signer_infos = vec![SignerInfo {
            pubkey: Some(signer.key.pubkey()),
            sign_mode: SignMode::LegacyAminoJson,
            sequence: signer.sequence,
        }];
        tx.signatures = vec![Bytes::new()];
        tx.body.extension_options = vec![ExtensionOption::Web3Tx(Web3TxOption {
            typed_data_chain_id,
            fee_payer,
            fee_payer_sig: Bytes::new(),
        })];
        let hash = typed_data_hash(
            &tx,
            &signer.signer_data(&self.chain_id),
            typed_data_chain_id,
            fee_payer,
        )
        .expect("typed data encodes");
        tx.body.extension_options = vec![ExtensionOption::Web3Tx(Web3TxOption {
            typed_data_chain_id,
            fee_payer,
            fee_payer_sig: signer.key.sign_hash_rsv(hash),
        })];
        tx
    }
}
