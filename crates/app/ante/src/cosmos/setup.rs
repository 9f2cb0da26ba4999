//! Envelope checks and context setup for native transactions.

use std::sync::Arc;

use tollgate_core::{ante_err, ensure, AnteResult};
use tollgate_tx::{ExtensionOption, Tx};
use tracing::debug;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::gas::GasMeter;
use crate::policy::ChainPolicy;

/// Bytes charged for each simulated signature when sizing the transaction.
const SIMULATED_SIGNATURE_BYTES: u64 = 65;

/// Rejects Ethereum messages outside the Ethereum chain.
pub struct RejectMessages;

impl AnteDecorator for RejectMessages {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if tx.ethereum_msgs().next().is_some() {
            return Err(ante_err!(
                InvalidTxType,
                "MsgEthereumTx needs to be contained within a tx with 'ExtensionOptionsEthereumTx' option"
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

/// Installs the transaction's gas meter.
///
/// Simulations and genesis transactions get an infinite meter; everything
/// else is metered against the declared gas limit.
pub struct SetUpContext;

impl AnteDecorator for SetUpContext {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let gas = tx.gas();
        let meter = if simulate || ctx.is_genesis() {
            GasMeter::infinite()
        } else {
            GasMeter::basic(gas)
        };

        if let Some(max) = ctx.max_block_gas {
            if max > 0 && gas > max {
                return Err(ante_err!(
                    InvalidGasLimit,
                    "tx gas limit {gas} over block limit {max}"
                ));
            }
        }

        next.run(ctx.with_gas_meter(meter), tx, simulate)
    }
}

/// Only the dynamic fee option may ride on a native transaction.
pub struct ExtensionOptions;

impl AnteDecorator for ExtensionOptions {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        for option in &tx.body.extension_options {
            if !matches!(option, ExtensionOption::DynamicFeeTx { .. }) {
                return Err(ante_err!(
                    UnknownExtensionOptions,
                    "rejecting tx with unsupported extension option: {}",
                    option.type_url()
                ));
            }
        }
        next.run(ctx, tx, simulate)
    }
}

/// Stateless checks on the transaction and its messages.
pub struct ValidateBasic;

impl AnteDecorator for ValidateBasic {
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

        ensure!(
            !tx.messages().is_empty(),
            ante_err!(InvalidRequest, "must contain at least one message")
        );
        ensure!(
            tx.gas() <= i64::MAX as u64,
            ante_err!(InvalidRequest, "invalid gas supplied; {} > {}", tx.gas(), i64::MAX)
        );
        ensure!(
            !tx.signatures.is_empty(),
            ante_err!(NoSignatures, "no signatures supplied")
        );
        let signers = tx.signers();
        ensure!(
            tx.signatures.len() == signers.len(),
            ante_err!(
                Unauthorized,
                "wrong number of signers; expected {}, got {}",
                signers.len(),
                tx.signatures.len()
            )
        );
        for msg in tx.messages() {
            if let Some(native) = msg.as_native() {
                native.validate_basic()?;
            }
        }

        next.run(ctx, tx, simulate)
    }
}

/// Rejects transactions whose timeout height has passed.
pub struct TxTimeoutHeight;

impl AnteDecorator for TxTimeoutHeight {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let timeout = tx.body.timeout_height;
        if timeout > 0 && ctx.height > timeout {
            return Err(ante_err!(
                TxTimeoutHeight,
                "block height: {}, timeout height: {timeout}",
                ctx.height
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

pub struct ValidateMemo {
    policy: Arc<ChainPolicy>,
}

impl ValidateMemo {
    pub fn new(policy: Arc<ChainPolicy>) -> Self {
        Self { policy }
    }
}

impl AnteDecorator for ValidateMemo {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let length = tx.body.memo.chars().count() as u64;
        let max = self.policy.auth.max_memo_characters;
        if length > max {
            return Err(ante_err!(
                MemoTooLarge,
                "maximum number of characters is {max} but received {length} characters"
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

/// Charges gas per byte of the encoded transaction.
pub struct ConsumeTxSizeGas {
    policy: Arc<ChainPolicy>,
}

impl ConsumeTxSizeGas {
    pub fn new(policy: Arc<ChainPolicy>) -> Self {
        Self { policy }
    }
}

impl AnteDecorator for ConsumeTxSizeGas {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let cost_per_byte = self.policy.auth.tx_size_cost_per_byte;
        let size = tx.encoded_len()? as u64;
        ctx.gas_meter
            .consume_gas(cost_per_byte.saturating_mul(size), "txSize")?;

        // signatures are empty or absent when simulating
        if simulate {
            let signers = tx.signers().len();
            let empty = tx.signatures.iter().filter(|sig| sig.is_empty()).count();
            let missing = (signers.saturating_sub(tx.signatures.len()) + empty) as u64;
            if missing > 0 {
                debug!(missing, "charging placeholder signature size");
                let placeholder = cost_per_byte
                    .saturating_mul(SIMULATED_SIGNATURE_BYTES)
                    .saturating_mul(missing);
                ctx.gas_meter.consume_gas(placeholder, "txSize")?;
            }
        }

        next.run(ctx, tx, simulate)
    }
}
