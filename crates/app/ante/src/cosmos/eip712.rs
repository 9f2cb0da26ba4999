//! Signature verification for native transactions signed by EIP-712
//! wallets through the `Web3Tx` extension option.

use std::sync::Arc;

use tollgate_core::{ante_err, AnteError, AnteResult, ErrorKind};
use tollgate_tx::eip712::typed_data_hash;
use tollgate_tx::{parse_chain_id, ExtensionOption, PubKey, SignMode, SignerData, Tx};
use tollgate_tx_eth::ethereum::{
    address_from_pubkey, compress_pubkey, parse_rsv_signature, recover_pubkey, verify_prehash,
    SIGNATURE_LENGTH,
};

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::AccountKeeper;

use super::sigverify::{signer_account, signing_account_number};

/// Check the fee payer's typed-data signature carried in the `Web3Tx`
/// option against the signer account's key.
pub fn verify_eip712_signature(
    tx: &Tx,
    account_pubkey: Option<&PubKey>,
    signer_data: &SignerData,
    sign_mode: SignMode,
    cosmos_signature: &[u8],
) -> AnteResult<()> {
    if sign_mode != SignMode::LegacyAminoJson {
        return Err(ante_err!(
            NotSupported,
            "unexpected sign mode {sign_mode:?}; EIP712 requires legacy amino JSON"
        ));
    }
    if !cosmos_signature.is_empty() {
        return Err(ante_err!(
            TooManySignatures,
            "invalid signature value; EIP712 must have the cosmos transaction signature empty"
        ));
    }
    if tx.messages().is_empty() {
        return Err(ante_err!(
            NoSignatures,
            "tx doesn't contain any msgs to verify signature"
        ));
    }

    let chain_id = parse_chain_id(&signer_data.chain_id)
        .map_err(|err| err.wrap("failed to parse chain-id"))?;

    let option = match tx.body.extension_options.as_slice() {
        [ExtensionOption::Web3Tx(option)] => option,
        [_] => {
            return Err(ante_err!(UnknownExtensionOptions, "unknown extension option"));
        }
        _ => {
            return Err(ante_err!(
                UnknownExtensionOptions,
                "tx doesnt contain expected amount of extension options"
            ));
        }
    };
    if option.typed_data_chain_id != chain_id.eip155 {
        return Err(ante_err!(
            InvalidChainId,
            "invalid chain-id; typed data {} != {}",
            option.typed_data_chain_id,
            chain_id.eip155
        ));
    }

    let hash = typed_data_hash(tx, signer_data, option.typed_data_chain_id, option.fee_payer)?;

    let signature = option.fee_payer_sig.as_ref();
    if signature.len() != SIGNATURE_LENGTH {
        return Err(ante_err!(
            InvalidSigner,
            "signature length doesn't match typical [R||S||V] signature"
        ));
    }
    let parsed = parse_rsv_signature(signature).map_err(|err| {
        AnteError::new(ErrorKind::InvalidSigner, err.to_string())
            .wrap("failed to recover delegated fee payer from sig")
    })?;
    let recovered = recover_pubkey(hash, &parsed).map_err(|err| {
        AnteError::new(ErrorKind::InvalidSigner, err.to_string())
            .wrap("failed to recover delegated fee payer from sig")
    })?;

    let compressed = compress_pubkey(&recovered);
    let Some(pubkey) = account_pubkey else {
        return Err(ante_err!(InvalidPubKey, "pubkey on account is not set"));
    };
    if pubkey.as_bytes() != compressed.as_slice() {
        return Err(ante_err!(
            InvalidPubKey,
            "feePayer pubkey {} is different from transaction pubkey {}",
            alloy_primitives::hex::encode(compressed),
            alloy_primitives::hex::encode(pubkey.as_bytes())
        ));
    }

    let recovered_payer = address_from_pubkey(&recovered)
        .map_err(|err| AnteError::new(ErrorKind::InvalidSigner, err.to_string()))?;
    if recovered_payer != option.fee_payer {
        return Err(ante_err!(
            InvalidSigner,
            "failed to verify delegated fee payer {recovered_payer} signature"
        ));
    }

    if !verify_prehash(pubkey.as_bytes(), hash, signature) {
        return Err(ante_err!(
            InvalidSigner,
            "unable to verify signer signature of EIP712 typed data"
        ));
    }
    Ok(())
}

/// Replaces [`super::SigVerification`] on the legacy EIP-712 chain.
///
/// Exactly one signer is allowed, and the signature lives in the `Web3Tx`
/// option rather than in the transaction's signature list.
pub struct LegacyEip712SigVerification {
    accounts: Arc<dyn AccountKeeper>,
}

impl LegacyEip712SigVerification {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for LegacyEip712SigVerification {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if ctx.is_recheck_tx() {
            return next.run(ctx, tx, simulate);
        }

        if tx.signatures.len() != 1 {
            return Err(ante_err!(
                TooManySignatures,
                "invalid number of signers ({}); EIP712 signatures allows just one signature",
                tx.signatures.len()
            ));
        }
        let signers = tx.signers();
        let (Some(signer), Some(signature), Some(info)) = (
            signers.first(),
            tx.signatures.first(),
            tx.auth_info.signer_infos.first(),
        ) else {
            return Err(ante_err!(
                Unauthorized,
                "invalid number of signer; expected: {}, got {}",
                signers.len(),
                tx.signatures.len()
            ));
        };
        if signers.len() != 1 {
            return Err(ante_err!(
                Unauthorized,
                "invalid number of signer; expected: {}, got 1",
                signers.len()
            ));
        }

        let account = signer_account(self.accounts.as_ref(), *signer)?;
        if !simulate && account.pubkey.is_none() {
            return Err(ante_err!(InvalidPubKey, "pubkey on account is not set"));
        }
        if info.sequence != account.sequence {
            return Err(ante_err!(
                InvalidSequence,
                "account sequence mismatch, expected {}, got {}",
                account.sequence,
                info.sequence
            ));
        }
        if simulate {
            return next.run(ctx, tx, simulate);
        }

        let account_number = signing_account_number(&ctx, &account);
        let signer_data = SignerData {
            chain_id: ctx.chain_id.clone(),
            account_number,
            sequence: account.sequence,
        };
        verify_eip712_signature(
            tx,
            account.pubkey.as_ref(),
            &signer_data,
            info.sign_mode,
            signature,
        )
        .map_err(|err| {
            ante_err!(
                Unauthorized,
                "signature verification failed; please verify account number ({account_number}) and chain-id ({}): {err}",
                ctx.chain_id
            )
        })?;

        next.run(ctx, tx, simulate)
    }
}
