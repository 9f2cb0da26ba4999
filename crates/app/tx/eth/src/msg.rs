//! The Ethereum message carried inside a wrapper transaction.

use alloy_primitives::{Address, B256};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::envelope::EthTxData;
use crate::error::SignerError;
use crate::signer::EthSigner;
use crate::traits::TypedTransaction;

pub const MSG_ETHEREUM_TX_TYPE_URL: &str = "/ethermint.evm.v1.MsgEthereumTx";

/// Whether the message's sender has been derived from its signature yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    Unverified,
    Verified(Address),
}

/// An Ethereum transaction wrapped as a ledger message.
///
/// The sender is never taken from the wire. A freshly decoded message is
/// [`SenderState::Unverified`] and only [`EthereumMsg::verify_sender`] moves
/// it to [`SenderState::Verified`], recovering the address from the signature
/// on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct EthereumMsg {
    data: EthTxData,
    sender: SenderState,
}

impl EthereumMsg {
    pub fn new(data: impl Into<EthTxData>) -> Self {
        Self {
            data: data.into(),
            sender: SenderState::Unverified,
        }
    }

    pub fn data(&self) -> &EthTxData {
        &self.data
    }

    pub fn sender_state(&self) -> SenderState {
        self.sender
    }

    /// The verified sender, if signature verification already ran.
    pub fn from(&self) -> Option<Address> {
        match self.sender {
            SenderState::Verified(address) => Some(address),
            SenderState::Unverified => None,
        }
    }

    pub fn hash(&self) -> B256 {
        self.data.tx_hash()
    }

    /// Recover the sender under `signer` and record it on the message.
    ///
    /// A message that is already verified is re-derived; a mismatch with the
    /// recorded sender is an error.
    pub fn verify_sender(&mut self, signer: &EthSigner) -> Result<Address, SignerError> {
        let recovered = signer.sender(&self.data)?;
        if let SenderState::Verified(existing) = self.sender {
            if existing != recovered {
                return Err(SignerError::SenderAlreadySet(existing));
            }
        }
        self.sender = SenderState::Verified(recovered);
        Ok(recovered)
    }
}

impl Serialize for EthereumMsg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EthereumMsg", 4)?;
        state.serialize_field("type", &self.data.tx_type())?;
        state.serialize_field("hash", &self.data.tx_hash())?;
        state.serialize_field("nonce", &self.data.nonce())?;
        state.serialize_field("from", &self.from())?;
        state.end()
    }
}
