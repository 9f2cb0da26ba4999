//! Wallet-side signing against the sign bytes and typed-data hash.

use alloy_primitives::{Address, FixedBytes, PrimitiveSignature, B256, U256};
use k256::ecdsa::{signature::hazmat::PrehashSigner, RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use tollgate_core::Coins;
use tollgate_tx::eip712::typed_data_hash;
use tollgate_tx::sign_doc::sign_hash;
use tollgate_tx::{AuthInfo, Fee, NativeMsg, PubKey, SignMode, SignerData, SignerInfo, Tx, TxBody};
use tollgate_tx_eth::ethereum::{recover_pubkey, verify_prehash};

fn sign(key: &SigningKey, hash: B256) -> (Signature, RecoveryId) {
    key.sign_prehash(hash.as_ref()).unwrap()
}

fn pubkey(key: &SigningKey) -> PubKey {
    let point = VerifyingKey::from(key).to_encoded_point(true);
    PubKey::EthSecp256k1(FixedBytes::from_slice(point.as_bytes()))
}

fn tx_from(signer: Address, pubkey: PubKey, mode: SignMode) -> Tx {
    Tx {
        body: TxBody {
            messages: vec![NativeMsg::Send {
                from: signer,
                to: Address::repeat_byte(0xaa),
                amount: Coins::single("aISLM", 100u64),
            }
            .into()],
            ..Default::default()
        },
        auth_info: AuthInfo {
            signer_infos: vec![SignerInfo {
                pubkey: Some(pubkey),
                sign_mode: mode,
                sequence: 0,
            }],
            fee: Fee {
                amount: Coins::single("aISLM", 5_000u64),
                gas_limit: 200_000,
                ..Default::default()
            },
        },
        signatures: vec![],
    }
}

fn signer_data() -> SignerData {
    SignerData {
        chain_id: "haqq_11235-1".into(),
        account_number: 12,
        sequence: 0,
    }
}

#[test]
fn test_native_signature_verifies_in_both_modes() {
    let key = SigningKey::random(&mut OsRng);
    let pk = pubkey(&key);
    let address = pk.address().unwrap();

    for mode in [SignMode::Direct, SignMode::LegacyAminoJson] {
        let tx = tx_from(address, pk.clone(), mode);
        let hash = sign_hash(mode, &tx, &signer_data()).unwrap();
        let (sig, _) = sign(&key, hash);
        assert!(verify_prehash(pk.as_bytes(), hash, &sig.to_bytes()));

        let other_account = SignerData {
            account_number: 13,
            ..signer_data()
        };
        let other = sign_hash(mode, &tx, &other_account).unwrap();
        assert!(!verify_prehash(pk.as_bytes(), other, &sig.to_bytes()));
    }
}

#[test]
fn test_sequence_is_committed_per_sign_mode() {
    let key = SigningKey::random(&mut OsRng);
    let pk = pubkey(&key);
    let address = pk.address().unwrap();

    // Direct commits to the sequence through the signer infos.
    let tx = tx_from(address, pk.clone(), SignMode::Direct);
    let hash = sign_hash(SignMode::Direct, &tx, &signer_data()).unwrap();
    let mut bumped = tx.clone();
    bumped.auth_info.signer_infos[0].sequence += 1;
    let other = sign_hash(SignMode::Direct, &bumped, &signer_data()).unwrap();
    assert_ne!(hash, other);

    // Amino JSON takes it from the signer data.
    let tx = tx_from(address, pk, SignMode::LegacyAminoJson);
    let hash = sign_hash(SignMode::LegacyAminoJson, &tx, &signer_data()).unwrap();
    let next = SignerData {
        sequence: 1,
        ..signer_data()
    };
    let other = sign_hash(SignMode::LegacyAminoJson, &tx, &next).unwrap();
    assert_ne!(hash, other);
}

#[test]
fn test_typed_data_signature_recovers_wallet_key() {
    let key = SigningKey::random(&mut OsRng);
    let pk = pubkey(&key);
    let address = pk.address().unwrap();
    let tx = tx_from(address, pk.clone(), SignMode::LegacyAminoJson);

    let hash = typed_data_hash(&tx, &signer_data(), 11235, address).unwrap();
    let (sig, recid) = sign(&key, hash);
    let alloy_sig = PrimitiveSignature::new(
        U256::from_be_slice(&sig.r().to_bytes()),
        U256::from_be_slice(&sig.s().to_bytes()),
        recid.is_y_odd(),
    );

    let recovered = recover_pubkey(hash, &alloy_sig).unwrap();
    assert_eq!(recovered.serialize().as_slice(), pk.as_bytes());
}
