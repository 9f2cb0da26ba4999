//! Public keys declared in signer infos.

use alloy_primitives::{Address, FixedBytes};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tollgate_core::{ante_err, AnteResult};
use tollgate_tx_eth::ethereum::address_from_sec1;

pub const ETH_SECP256K1_TYPE_URL: &str = "/ethermint.crypto.v1.ethsecp256k1.PubKey";
pub const ED25519_TYPE_URL: &str = "/cosmos.crypto.ed25519.PubKey";

/// Public key of a native signer.
///
/// `EthSecp256k1` keys are compressed SEC1 points and derive Ethereum-style
/// addresses, so a native account and its EOA are the same account. Ed25519
/// keys are recognised for gas accounting but cannot sign transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "key", rename_all = "snake_case")]
pub enum PubKey {
    EthSecp256k1(FixedBytes<33>),
    Ed25519(FixedBytes<32>),
}

impl PubKey {
    pub fn type_url(&self) -> &'static str {
        match self {
            Self::EthSecp256k1(_) => ETH_SECP256K1_TYPE_URL,
            Self::Ed25519(_) => ED25519_TYPE_URL,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::EthSecp256k1(key) => key.as_slice(),
            Self::Ed25519(key) => key.as_slice(),
        }
    }

    pub fn address(&self) -> AnteResult<Address> {
        match self {
            Self::EthSecp256k1(key) => address_from_sec1(key.as_slice())
                .map_err(|err| ante_err!(InvalidPubKey, "eth_secp256k1 key: {err}")),
            Self::Ed25519(key) => {
                let digest = Sha256::digest(key.as_slice());
                let bytes = digest
                    .get(..20)
                    .ok_or_else(|| ante_err!(Internal, "short sha256 digest"))?;
                Ok(Address::from_slice(bytes))
            }
        }
    }
}
