//! Public key binding and signature checks for native signers.

use std::sync::Arc;

use alloy_primitives::{hex, Address};
use tollgate_core::events::{ATTRIBUTE_KEY_ACC_SEQ, ATTRIBUTE_KEY_SIGNATURE, EVENT_TYPE_TX};
use tollgate_core::{ante_err, AnteResult, Event};
use tollgate_tx::sign_doc::sign_hash;
use tollgate_tx::{PubKey, SignMode, SignerData, Tx};
use tollgate_tx_eth::ethereum::verify_prehash;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::gas::GasMeter;
use crate::keepers::{Account, AccountKeeper};
use crate::policy::{AuthParams, ChainPolicy};

pub(crate) fn signer_account(accounts: &dyn AccountKeeper, address: Address) -> AnteResult<Account> {
    accounts
        .get_account(address)
        .ok_or_else(|| ante_err!(UnknownAddress, "account {address} does not exist"))
}

/// Account number bound into sign bytes; zero for genesis transactions.
pub(crate) fn signing_account_number(ctx: &Context, account: &Account) -> u64 {
    if ctx.is_genesis() {
        0
    } else {
        account.account_number
    }
}

/// Binds declared public keys to signer accounts on first use.
pub struct SetPubKey {
    accounts: Arc<dyn AccountKeeper>,
}

impl SetPubKey {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for SetPubKey {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let signers = tx.signers();
        let infos = &tx.auth_info.signer_infos;
        if infos.len() != signers.len() {
            return Err(ante_err!(
                Unauthorized,
                "invalid number of pubkeys; expected: {}, got {}",
                signers.len(),
                infos.len()
            ));
        }

        for (i, (info, signer)) in infos.iter().zip(&signers).enumerate() {
            let Some(pubkey) = &info.pubkey else {
                continue;
            };
            if !simulate && pubkey.address()? != *signer {
                return Err(ante_err!(
                    InvalidPubKey,
                    "pubKey does not match signer address {signer} with signer index: {i}"
                ));
            }

            let mut account = signer_account(self.accounts.as_ref(), *signer)?;
            if account.pubkey.is_some() {
                continue;
            }
            account.pubkey = Some(pubkey.clone());
            self.accounts.set_account(account);
        }

        for (i, info) in infos.iter().enumerate() {
            let Some(signer) = signers.get(i) else {
                break;
            };
            ctx.emit_event(
                Event::new(EVENT_TYPE_TX)
                    .with_attribute(ATTRIBUTE_KEY_ACC_SEQ, format!("{signer}/{}", info.sequence)),
            );
            if let Some(sig) = tx.signatures.get(i) {
                ctx.emit_event(
                    Event::new(EVENT_TYPE_TX)
                        .with_attribute(ATTRIBUTE_KEY_SIGNATURE, hex::encode_prefixed(sig)),
                );
            }
        }

        next.run(ctx, tx, simulate)
    }
}

/// Caps the number of public keys a transaction may carry.
pub struct ValidateSigCount {
    policy: Arc<ChainPolicy>,
}

impl ValidateSigCount {
    pub fn new(policy: Arc<ChainPolicy>) -> Self {
        Self { policy }
    }
}

impl AnteDecorator for ValidateSigCount {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let count = tx.pubkeys().into_iter().flatten().count() as u64;
        let limit = self.policy.auth.tx_sig_limit;
        if count > limit {
            return Err(ante_err!(
                TooManySignatures,
                "signatures: {count}, limit: {limit}"
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

/// Gas charged for verifying one signature under `pubkey`.
///
/// Ed25519 keys are charged and then rejected.
pub fn consume_signature_gas(
    meter: &mut GasMeter,
    pubkey: Option<&PubKey>,
    params: &AuthParams,
) -> AnteResult<()> {
    match pubkey {
        Some(PubKey::EthSecp256k1(_)) => {
            meter.consume_gas(params.sig_verify_cost_eth_secp256k1, "ante verify: eth_secp256k1")
        }
        Some(PubKey::Ed25519(_)) => {
            meter.consume_gas(params.sig_verify_cost_ed25519, "ante verify: ed25519")?;
            Err(ante_err!(InvalidPubKey, "ED25519 public keys are unsupported"))
        }
        None => Err(ante_err!(InvalidPubKey, "unrecognized public key type: <nil>")),
    }
}

pub struct SigGasConsume {
    accounts: Arc<dyn AccountKeeper>,
    policy: Arc<ChainPolicy>,
}

impl SigGasConsume {
    pub fn new(accounts: Arc<dyn AccountKeeper>, policy: Arc<ChainPolicy>) -> Self {
        Self { accounts, policy }
    }
}

impl AnteDecorator for SigGasConsume {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        for signer in tx.signers() {
            let account = signer_account(self.accounts.as_ref(), signer)?;
            // the costliest key stands in for a missing one while simulating
            let pubkey = match (&account.pubkey, simulate) {
                (None, true) => Some(PubKey::EthSecp256k1(Default::default())),
                (pubkey, _) => pubkey.clone(),
            };
            consume_signature_gas(&mut ctx.gas_meter, pubkey.as_ref(), &self.policy.auth)?;
        }
        next.run(ctx, tx, simulate)
    }
}

/// Verifies every native signature against its signer's account.
pub struct SigVerification {
    accounts: Arc<dyn AccountKeeper>,
}

impl SigVerification {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for SigVerification {
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

        let signers = tx.signers();
        if tx.signatures.len() != signers.len() {
            return Err(ante_err!(
                Unauthorized,
                "invalid number of signer; expected: {}, got {}",
                signers.len(),
                tx.signatures.len()
            ));
        }

        for (i, signer) in signers.iter().enumerate() {
            let account = signer_account(self.accounts.as_ref(), *signer)?;
            let Some(info) = tx.auth_info.signer_infos.get(i) else {
                return Err(ante_err!(Unauthorized, "missing signer info for signer index: {i}"));
            };

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
                continue;
            }

            let account_number = signing_account_number(&ctx, &account);
            let signer_data = SignerData {
                chain_id: ctx.chain_id.clone(),
                account_number,
                sequence: account.sequence,
            };
            let verified = match (&account.pubkey, tx.signatures.get(i)) {
                (Some(PubKey::EthSecp256k1(key)), Some(sig)) if matches!(sig.len(), 64 | 65) => {
                    let hash = sign_hash(info.sign_mode, tx, &signer_data)?;
                    verify_prehash(key.as_slice(), hash, sig)
                }
                _ => false,
            };
            if !verified {
                return Err(match info.sign_mode {
                    SignMode::LegacyAminoJson => ante_err!(
                        Unauthorized,
                        "signature verification failed; please verify account number ({account_number}), sequence ({}) and chain-id ({})",
                        account.sequence,
                        ctx.chain_id
                    ),
                    SignMode::Direct => ante_err!(
                        Unauthorized,
                        "signature verification failed; please verify account number ({account_number}) and chain-id ({})",
                        ctx.chain_id
                    ),
                });
            }
        }

        next.run(ctx, tx, simulate)
    }
}

/// Bumps the sequence of every signer.
pub struct IncrementSequence {
    accounts: Arc<dyn AccountKeeper>,
}

impl IncrementSequence {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for IncrementSequence {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        for signer in tx.signers() {
            let mut account = signer_account(self.accounts.as_ref(), signer)?;
            account.sequence = account.sequence.saturating_add(1);
            self.accounts.set_account(account);
        }
        next.run(ctx, tx, simulate)
    }
}
