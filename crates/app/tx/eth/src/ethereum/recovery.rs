use alloy_primitives::{keccak256, Address, PrimitiveSignature, B256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use secp256k1::{All, Message, PublicKey, Secp256k1};
use std::sync::OnceLock;

use crate::error::SignerError;

/// Length of an `[R || S || V]` signature.
pub const SIGNATURE_LENGTH: usize = 65;

pub fn recover_sender_from_signature_hash(
    signature_hash: B256,
    signature: &PrimitiveSignature,
) -> Result<Address, SignerError> {
    let pubkey = recover_pubkey(signature_hash, signature)?;
    address_from_pubkey(&pubkey)
}

/// Recover the secp256k1 public key that produced `signature` over `signature_hash`.
pub fn recover_pubkey(
    signature_hash: B256,
    signature: &PrimitiveSignature,
) -> Result<PublicKey, SignerError> {
    let mut compact = [0u8; 64];
    let r = signature.r().to_be_bytes::<32>();
    let s = signature.s().to_be_bytes::<32>();
    compact[..32].copy_from_slice(&r);
    compact[32..].copy_from_slice(&s);

    let recid = RecoveryId::from_i32(if signature.v() { 1 } else { 0 })
        .map_err(|_| SignerError::InvalidSignature)?;
    let recoverable = RecoverableSignature::from_compact(&compact, recid)
        .map_err(|_| SignerError::InvalidSignature)?;

    let msg = Message::from_digest_slice(signature_hash.as_slice())
        .map_err(|_| SignerError::InvalidSignature)?;
    secp()
        .recover_ecdsa(&msg, &recoverable)
        .map_err(|_| SignerError::InvalidSignature)
}

/// Parse a `[R || S || V]` signature, accepting both `V ∈ {0, 1}` and the
/// wallet convention `V ∈ {27, 28}`.
pub fn parse_rsv_signature(bytes: &[u8]) -> Result<PrimitiveSignature, SignerError> {
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(SignerError::InvalidSignature);
    }
    let (rs, v) = bytes.split_at(64);
    let parity = match v.first().copied() {
        Some(0) | Some(27) => false,
        Some(1) | Some(28) => true,
        _ => return Err(SignerError::InvalidSignature),
    };
    let (r, s) = rs.split_at(32);
    Ok(PrimitiveSignature::new(
        alloy_primitives::U256::from_be_slice(r),
        alloy_primitives::U256::from_be_slice(s),
        parity,
    ))
}

/// Ethereum address of a public key: last 20 bytes of keccak256 of the
/// uncompressed point without its prefix byte.
pub fn address_from_pubkey(pubkey: &PublicKey) -> Result<Address, SignerError> {
    let uncompressed = pubkey.serialize_uncompressed();
    let payload = uncompressed.get(1..).ok_or(SignerError::InvalidPublicKey)?;
    let hash = keccak256(payload);
    let address_bytes = hash.as_slice().get(12..).ok_or(SignerError::InvalidPublicKey)?;
    Ok(Address::from_slice(address_bytes))
}

/// Ethereum address of a SEC1-encoded (compressed or uncompressed) key.
pub fn address_from_sec1(bytes: &[u8]) -> Result<Address, SignerError> {
    let pubkey = PublicKey::from_slice(bytes).map_err(|_| SignerError::InvalidPublicKey)?;
    address_from_pubkey(&pubkey)
}

/// Compressed SEC1 encoding of a public key.
pub fn compress_pubkey(pubkey: &PublicKey) -> [u8; 33] {
    pubkey.serialize()
}

/// Verify a 64-byte `[R || S]` signature over `hash` with a SEC1 key.
///
/// High-S signatures are rejected.
pub fn verify_prehash(pubkey: &[u8], hash: B256, signature: &[u8]) -> bool {
    let Some(rs) = signature.get(..64) else {
        return false;
    };
    let Ok(pubkey) = PublicKey::from_slice(pubkey) else {
        return false;
    };
    let Ok(sig) = Signature::from_compact(rs) else {
        return false;
    };
    let Ok(msg) = Message::from_digest_slice(hash.as_slice()) else {
        return false;
    };
    secp().verify_ecdsa(&msg, &sig, &pubkey).is_ok()
}

fn secp() -> &'static Secp256k1<All> {
    static SECP: OnceLock<Secp256k1<All>> = OnceLock::new();
    SECP.get_or_init(Secp256k1::new)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use k256::ecdsa::{signature::hazmat::PrehashSigner, SigningKey, VerifyingKey};
    use rand::rngs::OsRng;

    fn sign_hash(signing_key: &SigningKey, hash: B256) -> PrimitiveSignature {
        let (sig, recovery_id) = signing_key.sign_prehash(hash.as_ref()).expect("sign");
        let r = U256::from_be_slice(&sig.r().to_bytes());
        let s = U256::from_be_slice(&sig.s().to_bytes());
        PrimitiveSignature::new(r, s, recovery_id.is_y_odd())
    }

    fn get_address(signing_key: &SigningKey) -> Address {
        let verifying_key = VerifyingKey::from(signing_key);
        let public_key = verifying_key.to_encoded_point(false);
        let public_key_bytes = &public_key.as_bytes()[1..];
        let hash = keccak256(public_key_bytes);
        Address::from_slice(&hash[12..])
    }

    fn rsv_bytes(signature: &PrimitiveSignature, v: u8) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
        bytes[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
        bytes[64] = v;
        bytes
    }

    fn compressed(signing_key: &SigningKey) -> Vec<u8> {
        VerifyingKey::from(signing_key)
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    #[test]
    fn test_recover_sender_from_valid_signature_hash() {
        let signing_key = SigningKey::random(&mut OsRng);
        let signature_hash = keccak256(b"eth-sender-recovery-test");
        let signature = sign_hash(&signing_key, signature_hash);

        let recovered =
            recover_sender_from_signature_hash(signature_hash, &signature).expect("recover");

        assert_eq!(recovered, get_address(&signing_key));
    }

    #[test]
    fn test_recover_sender_rejects_invalid_signature_components() {
        let signature_hash = keccak256(b"invalid-signature-components");
        let invalid = PrimitiveSignature::new(U256::MAX, U256::MAX, false);

        let err = recover_sender_from_signature_hash(signature_hash, &invalid).unwrap_err();
        assert_eq!(err, SignerError::InvalidSignature);
    }

    #[test]
    fn test_recover_sender_detects_forged_recovery_id() {
        let signing_key = SigningKey::random(&mut OsRng);
        let signature_hash = keccak256(b"forged-recovery-id");
        let valid = sign_hash(&signing_key, signature_hash);
        let forged = PrimitiveSignature::new(valid.r(), valid.s(), !valid.v());

        let recovered_valid =
            recover_sender_from_signature_hash(signature_hash, &valid).expect("recover valid");
        let recovered_forged =
            recover_sender_from_signature_hash(signature_hash, &forged).expect("recover forged");

        assert_ne!(recovered_valid, recovered_forged);
    }

    #[test]
    fn test_address_from_compressed_key_matches_uncompressed() {
        let signing_key = SigningKey::random(&mut OsRng);
        let address = address_from_sec1(&compressed(&signing_key)).unwrap();
        assert_eq!(address, get_address(&signing_key));
    }

    #[test]
    fn test_verify_prehash() {
        let signing_key = SigningKey::random(&mut OsRng);
        let hash = keccak256(b"verify-prehash");
        let signature = sign_hash(&signing_key, hash);
        let bytes = rsv_bytes(&signature, signature.v() as u8);

        assert!(verify_prehash(&compressed(&signing_key), hash, &bytes[..64]));
        assert!(!verify_prehash(
            &compressed(&signing_key),
            keccak256(b"other"),
            &bytes[..64]
        ));
        assert!(!verify_prehash(&[0u8; 33], hash, &bytes[..64]));
    }

    #[test]
    fn test_parse_rsv_signature_normalizes_wallet_v() {
        let signing_key = SigningKey::random(&mut OsRng);
        let hash = keccak256(b"wallet-v");
        let signature = sign_hash(&signing_key, hash);
        let bytes = rsv_bytes(&signature, 27 + signature.v() as u8);

        let parsed = parse_rsv_signature(&bytes).unwrap();
        assert_eq!(parsed, signature);
        assert!(parse_rsv_signature(&bytes[..64]).is_err());
    }
}
