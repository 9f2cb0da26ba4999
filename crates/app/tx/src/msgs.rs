//! Messages carried by a wrapper transaction.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tollgate_core::{ante_err, ensure, AnteResult, Coins};
use tollgate_tx_eth::{EthereumMsg, MSG_ETHEREUM_TX_TYPE_URL};

pub const MSG_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const MSG_EXEC_TYPE_URL: &str = "/cosmos.authz.v1beta1.MsgExec";
pub const MSG_GRANT_TYPE_URL: &str = "/cosmos.authz.v1beta1.MsgGrant";
pub const MSG_CREATE_VESTING_ACCOUNT_TYPE_URL: &str =
    "/cosmos.vesting.v1beta1.MsgCreateVestingAccount";
pub const MSG_RECV_PACKET_TYPE_URL: &str = "/ibc.core.channel.v1.MsgRecvPacket";
pub const MSG_ACKNOWLEDGEMENT_TYPE_URL: &str = "/ibc.core.channel.v1.MsgAcknowledgement";
pub const MSG_TIMEOUT_TYPE_URL: &str = "/ibc.core.channel.v1.MsgTimeout";
pub const MSG_UPDATE_CLIENT_TYPE_URL: &str = "/ibc.core.client.v1.MsgUpdateClient";

/// What a grantee may do on the granter's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authorization {
    Generic { msg_type_url: String },
    Send { spend_limit: Coins },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    Recv,
    Acknowledgement,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    pub sequence: u64,
}

/// Native ledger messages the admission pipeline needs to look inside.
///
/// Everything else travels as [`NativeMsg::Other`] with its type url and
/// signers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeMsg {
    Send {
        from: Address,
        to: Address,
        amount: Coins,
    },
    Exec {
        grantee: Address,
        msgs: Vec<Message>,
    },
    Grant {
        granter: Address,
        grantee: Address,
        authorization: Authorization,
    },
    CreateVestingAccount {
        from: Address,
        to: Address,
        amount: Coins,
    },
    Packet {
        kind: PacketKind,
        packet: Packet,
        signer: Address,
    },
    UpdateClient {
        client_id: String,
        signer: Address,
    },
    Other {
        type_url: String,
        signers: Vec<Address>,
    },
}

impl NativeMsg {
    pub fn type_url(&self) -> &str {
        match self {
            Self::Send { .. } => MSG_SEND_TYPE_URL,
            Self::Exec { .. } => MSG_EXEC_TYPE_URL,
            Self::Grant { .. } => MSG_GRANT_TYPE_URL,
            Self::CreateVestingAccount { .. } => MSG_CREATE_VESTING_ACCOUNT_TYPE_URL,
            Self::Packet { kind, .. } => match kind {
                PacketKind::Recv => MSG_RECV_PACKET_TYPE_URL,
                PacketKind::Acknowledgement => MSG_ACKNOWLEDGEMENT_TYPE_URL,
                PacketKind::Timeout => MSG_TIMEOUT_TYPE_URL,
            },
            Self::UpdateClient { .. } => MSG_UPDATE_CLIENT_TYPE_URL,
            Self::Other { type_url, .. } => type_url,
        }
    }

    pub fn signers(&self) -> Vec<Address> {
        match self {
            Self::Send { from, .. } | Self::CreateVestingAccount { from, .. } => vec![*from],
            Self::Exec { grantee, .. } => vec![*grantee],
            Self::Grant { granter, .. } => vec![*granter],
            Self::Packet { signer, .. } | Self::UpdateClient { signer, .. } => vec![*signer],
            Self::Other { signers, .. } => signers.clone(),
        }
    }

    /// Stateless checks on the message itself.
    pub fn validate_basic(&self) -> AnteResult<()> {
        match self {
            Self::Send { amount, .. } | Self::CreateVestingAccount { amount, .. } => {
                ensure!(
                    !amount.is_empty(),
                    ante_err!(InvalidRequest, "{}: amount must be positive", self.type_url())
                );
            }
            Self::Exec { msgs, .. } => {
                ensure!(
                    !msgs.is_empty(),
                    ante_err!(InvalidRequest, "messages cannot be empty")
                );
            }
            Self::Grant {
                granter, grantee, ..
            } => {
                ensure!(
                    granter != grantee,
                    ante_err!(InvalidRequest, "granter and grantee cannot be same")
                );
            }
            Self::Other { signers, type_url } => {
                ensure!(
                    !signers.is_empty(),
                    ante_err!(InvalidRequest, "{type_url}: no signers")
                );
            }
            Self::Packet { .. } | Self::UpdateClient { .. } => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    Native(NativeMsg),
    Ethereum(EthereumMsg),
}

impl Message {
    pub fn type_url(&self) -> &str {
        match self {
            Self::Native(msg) => msg.type_url(),
            Self::Ethereum(_) => MSG_ETHEREUM_TX_TYPE_URL,
        }
    }

    /// Signers of the message. An Ethereum message has one once its sender
    /// is verified, and none before.
    pub fn signers(&self) -> Vec<Address> {
        match self {
            Self::Native(msg) => msg.signers(),
            Self::Ethereum(msg) => msg.from().into_iter().collect(),
        }
    }

    pub fn as_ethereum(&self) -> Option<&EthereumMsg> {
        match self {
            Self::Ethereum(msg) => Some(msg),
            Self::Native(_) => None,
        }
    }

    pub fn as_ethereum_mut(&mut self) -> Option<&mut EthereumMsg> {
        match self {
            Self::Ethereum(msg) => Some(msg),
            Self::Native(_) => None,
        }
    }

    pub fn as_native(&self) -> Option<&NativeMsg> {
        match self {
            Self::Native(msg) => Some(msg),
            Self::Ethereum(_) => None,
        }
    }

    /// Legacy amino JSON rendering: `{"type": <type url>, "value": <msg>}`.
    pub fn amino_json(&self) -> AnteResult<serde_json::Value> {
        let value = serde_json::to_value(self)
            .map_err(|err| ante_err!(InvalidRequest, "failed to encode message: {err}"))?;
        Ok(serde_json::json!({ "type": self.type_url(), "value": value }))
    }
}

impl From<NativeMsg> for Message {
    fn from(msg: NativeMsg) -> Self {
        Self::Native(msg)
    }
}

impl From<EthereumMsg> for Message {
    fn from(msg: EthereumMsg) -> Self {
        Self::Ethereum(msg)
    }
}
