//! Fee floors for Ethereum messages.

use std::sync::Arc;

use alloy_primitives::U256;
use tollgate_core::{ante_err, AnteResult, Coins, Dec};
use tollgate_tx::Tx;
use tollgate_tx_eth::{intrinsic_gas, tx_type, EthTxData, TypedTransaction};

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::EvmKeeper;
use crate::policy::ChainPolicy;

use super::block_base_fee;

/// Intrinsic gas and base fee checks of one message, returning the fee it
/// pays at the block's base fee.
///
/// The intrinsic gas floor is only enforced in check mode. A zero fee is
/// returned as empty coins.
pub fn verify_fee(
    data: &EthTxData,
    denom: &str,
    base_fee: Option<U256>,
    homestead: bool,
    istanbul: bool,
    is_check_tx: bool,
) -> AnteResult<Coins> {
    let is_create = data.is_contract_creation();
    let gas_limit = data.gas_limit();
    let intrinsic = intrinsic_gas(data.input(), data.access_list(), is_create, homestead, istanbul)
        .map_err(|err| {
            err.wrap(format!(
                "failed to retrieve intrinsic gas, contract creation = {is_create}; homestead = {homestead}, istanbul = {istanbul}"
            ))
        })?;

    if is_check_tx && gas_limit < intrinsic {
        return Err(ante_err!(
            OutOfGas,
            "gas limit too low: {gas_limit} (gas limit) < {intrinsic} (intrinsic gas)"
        ));
    }

    if let Some(base) = base_fee {
        let cap = data.gas_fee_cap();
        if cap < base {
            return Err(ante_err!(
                InsufficientFee,
                "the tx gasfeecap is lower than the tx baseFee: {cap} (gasfeecap), {base} (basefee)"
            ));
        }
    }

    Ok(Coins::single(denom, data.effective_fee(base_fee)))
}

fn to_dec(amount: U256) -> AnteResult<Dec> {
    Ok(Dec::from_int(amount)?)
}

/// Enforces the global minimum gas price on every message.
///
/// Dynamic fee messages are judged by what they pay at the current base
/// fee rather than by their cap.
pub struct EthMinGasPrice {
    evm: Arc<dyn EvmKeeper>,
    policy: Arc<ChainPolicy>,
}

impl EthMinGasPrice {
    pub fn new(evm: Arc<dyn EvmKeeper>, policy: Arc<ChainPolicy>) -> Self {
        Self { evm, policy }
    }
}

impl AnteDecorator for EthMinGasPrice {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let min_gas_price = self.policy.min_gas_price;
        if min_gas_price.is_zero() {
            return next.run(ctx, tx, simulate);
        }

        let base_fee = block_base_fee(self.evm.as_ref(), &self.policy, ctx.height);
        for msg in tx.ethereum_msgs() {
            let data = msg.data();
            let fee = match (data.tx_type(), base_fee) {
                (tx_type::LEGACY | tx_type::EIP2930, _) => data.fee(),
                (_, base_fee) => data.effective_fee(base_fee),
            };
            let required = min_gas_price.checked_mul_int(U256::from(data.gas_limit()))?;
            let fee = to_dec(fee)?;
            if fee < required {
                return Err(ante_err!(
                    InsufficientFee,
                    "provided fee < minimum global fee ({} < {}). Please increase the priority tip (for EIP-1559 txs) or the gas prices (for access list or legacy txs)",
                    fee.trunc_int(),
                    required.trunc_int()
                ));
            }
        }

        next.run(ctx, tx, simulate)
    }
}

/// Validator-local minimum gas price, applied only in check mode and only
/// while no base fee is in force.
pub struct EthMempoolFee {
    evm: Arc<dyn EvmKeeper>,
    policy: Arc<ChainPolicy>,
}

impl EthMempoolFee {
    pub fn new(evm: Arc<dyn EvmKeeper>, policy: Arc<ChainPolicy>) -> Self {
        Self { evm, policy }
    }
}

impl AnteDecorator for EthMempoolFee {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !ctx.is_check_tx() || simulate {
            return next.run(ctx, tx, simulate);
        }
        if block_base_fee(self.evm.as_ref(), &self.policy, ctx.height).is_some() {
            return next.run(ctx, tx, simulate);
        }

        let min_gas_price = ctx.min_gas_prices.amount_of(&self.policy.evm_denom);
        for msg in tx.ethereum_msgs() {
            let data = msg.data();
            let fee = to_dec(data.fee())?;
            let required = min_gas_price.checked_mul_int(U256::from(data.gas_limit()))?;
            if fee < required {
                return Err(ante_err!(
                    InsufficientFee,
                    "insufficient fee; got: {fee} required: {required}"
                ));
            }
        }

        next.run(ctx, tx, simulate)
    }
}
