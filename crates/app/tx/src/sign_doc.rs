//! Bytes a native signer commits to.
//!
//! Two modes are supported. `Direct` signs the body and auth info as encoded,
//! bound to the chain id and the signer's account number. `LegacyAminoJson`
//! signs a canonical, key-sorted JSON document with every number rendered as
//! a decimal string; it is also the message that EIP-712 wallets present.

use alloy_primitives::{keccak256, B256};
use serde::Serialize;
use serde_json::{json, Value};
use tollgate_core::{ante_err, AnteResult, Coins};

use crate::tx::{AuthInfo, Fee, SignMode, Tx, TxBody};

/// Per-signer data bound into the sign bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerData {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
}

#[derive(Serialize)]
struct DirectSignDoc<'a> {
    body: &'a TxBody,
    auth_info: &'a AuthInfo,
    chain_id: &'a str,
    account_number: u64,
}

pub fn direct_sign_bytes(tx: &Tx, signer: &SignerData) -> AnteResult<Vec<u8>> {
    let doc = DirectSignDoc {
        body: &tx.body,
        auth_info: &tx.auth_info,
        chain_id: &signer.chain_id,
        account_number: signer.account_number,
    };
    serde_json::to_vec(&doc).map_err(|err| ante_err!(InvalidRequest, "sign doc: {err}"))
}

pub(crate) fn amino_coins(coins: &Coins) -> Value {
    Value::Array(
        coins
            .iter()
            .map(|coin| json!({ "amount": coin.amount.to_string(), "denom": coin.denom }))
            .collect(),
    )
}

fn amino_fee(fee: &Fee) -> Value {
    let mut value = json!({
        "amount": amino_coins(&fee.amount),
        "gas": fee.gas_limit.to_string(),
    });
    if let Some(obj) = value.as_object_mut() {
        if let Some(payer) = fee.payer {
            obj.insert("payer".into(), Value::String(payer.to_string()));
        }
        if let Some(granter) = fee.granter {
            obj.insert("granter".into(), Value::String(granter.to_string()));
        }
    }
    value
}

/// The legacy amino JSON sign document as a JSON value.
pub fn amino_json_sign_doc(tx: &Tx, signer: &SignerData) -> AnteResult<Value> {
    let msgs = tx
        .body
        .messages
        .iter()
        .map(|msg| msg.amino_json())
        .collect::<AnteResult<Vec<_>>>()?;

    Ok(json!({
        "account_number": signer.account_number.to_string(),
        "chain_id": signer.chain_id,
        "fee": amino_fee(&tx.auth_info.fee),
        "memo": tx.body.memo,
        "msgs": msgs,
        "sequence": signer.sequence.to_string(),
        "timeout_height": tx.body.timeout_height.to_string(),
    }))
}

pub fn amino_json_sign_bytes(tx: &Tx, signer: &SignerData) -> AnteResult<Vec<u8>> {
    let doc = amino_json_sign_doc(tx, signer)?;
    serde_json::to_vec(&doc).map_err(|err| ante_err!(InvalidRequest, "sign doc: {err}"))
}

pub fn sign_bytes(mode: SignMode, tx: &Tx, signer: &SignerData) -> AnteResult<Vec<u8>> {
    match mode {
        SignMode::Direct => direct_sign_bytes(tx, signer),
        SignMode::LegacyAminoJson => amino_json_sign_bytes(tx, signer),
    }
}

/// Digest an eth_secp256k1 key signs: keccak256 of the sign bytes.
pub fn sign_hash(mode: SignMode, tx: &Tx, signer: &SignerData) -> AnteResult<B256> {
    Ok(keccak256(sign_bytes(mode, tx, signer)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::msgs::NativeMsg;
    use crate::tx::TxBody;
    use alloy_primitives::Address;

    fn tx() -> Tx {
        Tx {
            body: TxBody {
                messages: vec![NativeMsg::Send {
                    from: Address::repeat_byte(1),
                    to: Address::repeat_byte(2),
                    amount: Coins::single("aISLM", 7u64),
                }
                .into()],
                memo: "hi".into(),
                ..Default::default()
            },
            auth_info: AuthInfo {
                signer_infos: vec![],
                fee: Fee {
                    amount: Coins::single("aISLM", 1_000u64),
                    gas_limit: 200_000,
                    ..Default::default()
                },
            },
            signatures: vec![],
        }
    }

    fn signer() -> SignerData {
        SignerData {
            chain_id: "haqq_11235-1".into(),
            account_number: 4,
            sequence: 2,
        }
    }

    #[test]
    fn test_amino_json_is_sorted_and_stringified() {
        let bytes = amino_json_sign_bytes(&tx(), &signer()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#"{"account_number":"4","chain_id":"haqq_11235-1","fee":{"amount":[{"amount":"1000","denom":"aISLM"}],"gas":"200000"}"#));
        assert!(text.ends_with(r#""sequence":"2","timeout_height":"0"}"#));
    }

    #[test]
    fn test_sign_bytes_bind_signer_data() {
        let tx = tx();
        let base = signer();
        let other_chain = SignerData {
            chain_id: "haqq_54211-3".into(),
            ..base.clone()
        };
        let other_account = SignerData {
            account_number: 5,
            ..base.clone()
        };
        for mode in [SignMode::Direct, SignMode::LegacyAminoJson] {
            let hash = sign_hash(mode, &tx, &base).unwrap();
            assert_ne!(hash, sign_hash(mode, &tx, &other_chain).unwrap());
            assert_ne!(hash, sign_hash(mode, &tx, &other_account).unwrap());
        }
        assert_ne!(
            sign_hash(SignMode::Direct, &tx, &base).unwrap(),
            sign_hash(SignMode::LegacyAminoJson, &tx, &base).unwrap()
        );
    }
}
