//! Throwaway secp256k1 keys.

use alloy_primitives::{Address, Bytes, FixedBytes, PrimitiveSignature, B256, U256};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use tollgate_tx::PubKey;
use tollgate_tx_eth::ethereum::address_from_sec1;

/// A random signing key with its Ethereum address.
#[derive(Clone)]
pub struct TestKey {
    signing: SigningKey,
    address: Address,
}

impl std::fmt::Debug for TestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestKey").field("address", &self.address).finish()
    }
}

impl TestKey {
    pub fn random() -> Self {
        let signing = SigningKey::random(&mut OsRng);
        let point = signing.verifying_key().to_encoded_point(false);
        let address = address_from_sec1(point.as_bytes()).expect("k256 point is valid sec1");
        Self { signing, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The compressed eth_secp256k1 public key.
    pub fn pubkey(&self) -> PubKey {
        let point = self.signing.verifying_key().to_encoded_point(true);
        PubKey::EthSecp256k1(FixedBytes::from_slice(point.as_bytes()))
    }

    /// Sign a prehashed message, returning the recoverable signature.
    pub fn sign_hash(&self, hash: B256) -> PrimitiveSignature {
        let (sig, recid) = self
            .signing
            .sign_prehash_recoverable(hash.as_slice())
            .expect("sign 32-byte digest");
        let r = U256::from_be_slice(&sig.r().to_bytes());
        let s = U256::from_be_slice(&sig.s().to_bytes());
        PrimitiveSignature::new(r, s, recid.is_y_odd())
    }

    /// `[R || S || V]` with `V` in `{27, 28}`, as wallets produce it.
    pub fn sign_hash_rsv(&self, hash: B256) -> Bytes {
        let sig = self.sign_hash(hash);
        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&sig.r().to_be_bytes::<32>());
        out.extend_from_slice(&sig.s().to_be_bytes::<32>());
        out.push(27 + u8::from(sig.v()));
        Bytes::from(out)
    }
}
