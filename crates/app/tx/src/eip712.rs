//! EIP-712 typed-data hashing of the legacy amino sign document.
//!
//! Wallets sign `keccak256(0x19 0x01 || domainSeparator || hashStruct(Tx))`
//! with the domain
//! `{name: "Cosmos Web3", version: "1.0.0", chainId, verifyingContract: "cosmos", salt: "0"}`
//! and the message types below. Every leaf is a string, so the document
//! keeps the decimal-string rendering of the amino JSON sign doc.

use alloy_primitives::{keccak256, Address, B256, U256};
use tollgate_core::AnteResult;

use crate::sign_doc::SignerData;
use crate::tx::Tx;

pub const DOMAIN_NAME: &str = "Cosmos Web3";
pub const DOMAIN_VERSION: &str = "1.0.0";
pub const DOMAIN_VERIFYING_CONTRACT: &str = "cosmos";
pub const DOMAIN_SALT: &str = "0";

const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version,uint256 chainId,string verifyingContract,string salt)";
const COIN_TYPE: &str = "Coin(string denom,string amount)";
const FEE_TYPE: &str = "Fee(string feePayer,Coin[] amount,string gas)";
const MSG_TYPE: &str = "Msg(string type,string value)";
const TX_TYPE: &str = "Tx(string account_number,string chain_id,Fee fee,string memo,Msg[] msgs,string sequence,string timeout_height)";

fn type_hash(primary: &str, referenced: &[&str]) -> B256 {
    let mut encoded = primary.to_string();
    for ty in referenced {
        encoded.push_str(ty);
    }
    keccak256(encoded.as_bytes())
}

fn hash_words(words: &[B256]) -> B256 {
    let mut buf = Vec::with_capacity(words.len() * 32);
    for word in words {
        buf.extend_from_slice(word.as_slice());
    }
    keccak256(buf)
}

fn hash_str(value: &str) -> B256 {
    keccak256(value.as_bytes())
}

pub fn domain_separator(chain_id: u64) -> B256 {
    hash_words(&[
        type_hash(DOMAIN_TYPE, &[]),
        hash_str(DOMAIN_NAME),
        hash_str(DOMAIN_VERSION),
        B256::from(U256::from(chain_id).to_be_bytes::<32>()),
        hash_str(DOMAIN_VERIFYING_CONTRACT),
        hash_str(DOMAIN_SALT),
    ])
}

fn hash_fee(tx: &Tx, fee_payer: Address) -> B256 {
    let coin_type = type_hash(COIN_TYPE, &[]);
    let coins: Vec<B256> = tx
        .auth_info
        .fee
        .amount
        .iter()
        .map(|coin| {
            hash_words(&[
                coin_type,
                hash_str(&coin.denom),
                hash_str(&coin.amount.to_string()),
            ])
        })
        .collect();

    hash_words(&[
        type_hash(FEE_TYPE, &[COIN_TYPE]),
        hash_str(&fee_payer.to_string()),
        hash_words(&coins),
        hash_str(&tx.auth_info.fee.gas_limit.to_string()),
    ])
}

fn hash_msgs(tx: &Tx) -> AnteResult<B256> {
    let msg_type = type_hash(MSG_TYPE, &[]);
    let mut hashes = Vec::with_capacity(tx.body.messages.len());
    for msg in &tx.body.messages {
        let amino = msg.amino_json()?;
        let value = amino.get("value").map(ToString::to_string).unwrap_or_default();
        hashes.push(hash_words(&[
            msg_type,
            hash_str(msg.type_url()),
            hash_str(&value),
        ]));
    }
    Ok(hash_words(&hashes))
}

/// Hash of the `Tx` struct for `signer`, paid by `fee_payer`.
pub fn hash_struct(tx: &Tx, signer: &SignerData, fee_payer: Address) -> AnteResult<B256> {
    Ok(hash_words(&[
        type_hash(TX_TYPE, &[COIN_TYPE, FEE_TYPE, MSG_TYPE]),
        hash_str(&signer.account_number.to_string()),
        hash_str(&signer.chain_id),
        hash_fee(tx, fee_payer),
        hash_str(&tx.body.memo),
        hash_msgs(tx)?,
        hash_str(&signer.sequence.to_string()),
        hash_str(&tx.body.timeout_height.to_string()),
    ]))
}

/// The digest an EIP-712 wallet signs for this transaction.
pub fn typed_data_hash(
    tx: &Tx,
    signer: &SignerData,
    eip155_chain_id: u64,
    fee_payer: Address,
) -> AnteResult<B256> {
    let mut buf = Vec::with_capacity(66);
    buf.extend_from_slice(&[0x19, 0x01]);
    buf.extend_from_slice(domain_separator(eip155_chain_id).as_slice());
    buf.extend_from_slice(hash_struct(tx, signer, fee_payer)?.as_slice());
    Ok(keccak256(buf))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::msgs::NativeMsg;
    use crate::tx::TxBody;
    use tollgate_core::Coins;

    fn signer() -> SignerData {
        SignerData {
            chain_id: "haqq_11235-1".into(),
            account_number: 1,
            sequence: 0,
        }
    }

    fn tx(memo: &str) -> Tx {
        let mut tx = Tx {
            body: TxBody {
                messages: vec![NativeMsg::Send {
                    from: Address::repeat_byte(1),
                    to: Address::repeat_byte(2),
                    amount: Coins::single("aISLM", 1u64),
                }
                .into()],
                memo: memo.into(),
                ..Default::default()
            },
            ..Default::default()
        };
        tx.auth_info.fee.gas_limit = 100_000;
        tx
    }

    #[test]
    fn test_message_order_is_bound() {
        let mut forward = tx("");
        forward.body.messages.push(
            NativeMsg::Send {
                from: Address::repeat_byte(1),
                to: Address::repeat_byte(3),
                amount: Coins::single("aISLM", 2u64),
            }
            .into(),
        );
        let mut reversed = forward.clone();
        reversed.body.messages.reverse();

        let payer = Address::repeat_byte(1);
        assert_ne!(
            hash_struct(&forward, &signer(), payer).unwrap(),
            hash_struct(&reversed, &signer(), payer).unwrap()
        );
    }

    #[test]
    fn test_hash_binds_chain_payer_and_content() {
        let payer = Address::repeat_byte(1);
        let base = typed_data_hash(&tx(""), &signer(), 11235, payer).unwrap();

        assert_ne!(base, typed_data_hash(&tx(""), &signer(), 1, payer).unwrap());
        assert_ne!(
            base,
            typed_data_hash(&tx(""), &signer(), 11235, Address::repeat_byte(2)).unwrap()
        );
        assert_ne!(base, typed_data_hash(&tx("memo"), &signer(), 11235, payer).unwrap());
        assert_eq!(base, typed_data_hash(&tx(""), &signer(), 11235, payer).unwrap());
    }

    #[test]
    fn test_domain_separator_depends_on_chain_id() {
        assert_ne!(domain_separator(1), domain_separator(2));
    }
}
