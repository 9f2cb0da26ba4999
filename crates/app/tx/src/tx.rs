//! The wrapper transaction envelope.

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use tollgate_core::{ante_err, AnteResult, Coins};
use tollgate_tx_eth::EthereumMsg;

use crate::msgs::Message;
use crate::options::ExtensionOption;
use crate::pubkey::PubKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignMode {
    Direct,
    LegacyAminoJson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    pub pubkey: Option<PubKey>,
    pub sign_mode: SignMode,
    pub sequence: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Coins,
    pub gas_limit: u64,
    pub payer: Option<Address>,
    pub granter: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TxBody {
    pub messages: Vec<Message>,
    pub memo: String,
    pub timeout_height: u64,
    pub extension_options: Vec<ExtensionOption>,
    pub non_critical_extension_options: Vec<ExtensionOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub signatures: Vec<Bytes>,
}

impl Tx {
    pub fn messages(&self) -> &[Message] {
        &self.body.messages
    }

    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.body.messages
    }

    pub fn fee(&self) -> &Coins {
        &self.auth_info.fee.amount
    }

    pub fn gas(&self) -> u64 {
        self.auth_info.fee.gas_limit
    }

    pub fn fee_granter(&self) -> Option<Address> {
        self.auth_info.fee.granter
    }

    /// Unique signers across all messages, in order of first appearance.
    /// An explicit fee payer that signs no message is appended last: it is
    /// charged, so it must sign.
    pub fn signers(&self) -> Vec<Address> {
        let mut signers: Vec<Address> = Vec::new();
        let payer = self.auth_info.fee.payer;
        for signer in self
            .body
            .messages
            .iter()
            .flat_map(Message::signers)
            .chain(payer)
        {
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
        signers
    }

    /// The explicit fee payer, or the first signer.
    pub fn fee_payer(&self) -> Option<Address> {
        self.auth_info
            .fee
            .payer
            .or_else(|| self.signers().first().copied())
    }

    pub fn pubkeys(&self) -> Vec<Option<&PubKey>> {
        self.auth_info
            .signer_infos
            .iter()
            .map(|info| info.pubkey.as_ref())
            .collect()
    }

    pub fn ethereum_msgs(&self) -> impl Iterator<Item = &EthereumMsg> {
        self.body.messages.iter().filter_map(Message::as_ethereum)
    }

    pub fn ethereum_msgs_mut(&mut self) -> impl Iterator<Item = &mut EthereumMsg> {
        self.body
            .messages
            .iter_mut()
            .filter_map(Message::as_ethereum_mut)
    }

    /// Length of the canonical encoding, used for size-based gas.
    pub fn encoded_len(&self) -> AnteResult<usize> {
        serde_json::to_vec(self)
            .map(|bytes| bytes.len())
            .map_err(|err| ante_err!(InvalidRequest, "failed to encode tx: {err}"))
    }
}
