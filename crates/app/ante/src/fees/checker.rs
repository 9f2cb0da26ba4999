//! Effective fee and priority of native transactions.

use std::sync::Arc;

use alloy_primitives::U256;
use tollgate_core::{ante_err, AnteResult, Coin, Coins, Dec};
use tollgate_tx::{ExtensionOption, Tx};
use tollgate_tx_eth::PRIORITY_REDUCTION;

use crate::context::Context;
use crate::keepers::EvmKeeper;
use crate::policy::ChainPolicy;

/// Computes the fee a native transaction actually pays and its mempool
/// priority.
pub trait TxFeeChecker: Send + Sync {
    fn check_tx_fee(&self, ctx: &Context, tx: &Tx) -> AnteResult<(Coins, i64)>;
}

/// EIP-1559 style fee checking for native transactions.
///
/// Without a base fee (or at genesis) the declared fee is checked against
/// the validator's local minimum gas prices instead.
pub struct DynamicFeeChecker {
    evm: Arc<dyn EvmKeeper>,
    policy: Arc<ChainPolicy>,
}

impl DynamicFeeChecker {
    pub fn new(evm: Arc<dyn EvmKeeper>, policy: Arc<ChainPolicy>) -> Self {
        Self { evm, policy }
    }
}

impl TxFeeChecker for DynamicFeeChecker {
    fn check_tx_fee(&self, ctx: &Context, tx: &Tx) -> AnteResult<(Coins, i64)> {
        if ctx.is_genesis() {
            return check_with_validator_min_gas_prices(ctx, tx);
        }
        let base_fee = if self.policy.forks.is_london(ctx.height) {
            self.evm.base_fee()
        } else {
            None
        };
        let Some(base_fee) = base_fee else {
            return check_with_validator_min_gas_prices(ctx, tx);
        };

        let max_priority_price = tx
            .body
            .extension_options
            .iter()
            .find_map(|opt| match opt {
                ExtensionOption::DynamicFeeTx { max_priority_price } => Some(*max_priority_price),
                _ => None,
            })
            .unwrap_or(U256::from(i64::MAX as u64));

        let gas = tx.gas();
        if gas == 0 {
            return Err(ante_err!(InvalidGasLimit, "must provide positive gas"));
        }
        let denom = &self.policy.evm_denom;
        let fee_cap = tx.fee().amount_of(denom) / U256::from(gas);
        if fee_cap < base_fee {
            return Err(ante_err!(
                InsufficientFee,
                "gas prices too low, got: {fee_cap}{denom} required: {base_fee}{denom}. Please retry using a higher gas price or a higher fee"
            ));
        }

        let effective_price = base_fee.saturating_add(max_priority_price).min(fee_cap);
        let effective_fee = Coins::single(
            denom.clone(),
            effective_price.saturating_mul(U256::from(gas)),
        );
        let priority = (effective_price - base_fee) / U256::from(PRIORITY_REDUCTION);
        Ok((effective_fee, saturate_i64(priority)))
    }
}

fn saturate_i64(value: U256) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Fee check against the validator-local minimum gas prices.
///
/// Only enforced in check mode; the priority is the lowest per-denom gas
/// price of the declared fee.
pub fn check_with_validator_min_gas_prices(ctx: &Context, tx: &Tx) -> AnteResult<(Coins, i64)> {
    let fee = tx.fee();
    let gas = tx.gas();

    if ctx.is_check_tx() && !ctx.min_gas_prices.is_zero() {
        let mut required = Vec::new();
        for price in ctx.min_gas_prices.iter() {
            required.push(Coin::new(price.denom.clone(), required_fee(price.amount, gas)?));
        }
        let required = Coins::new(required);
        if !fee.is_any_gte(&required) {
            return Err(ante_err!(
                InsufficientFee,
                "insufficient fees; got: {fee} required: {required}"
            ));
        }
    }

    Ok((fee.clone(), tx_priority(fee, gas)))
}

/// Lowest gas price across the fee's denoms, saturated to `i64::MAX`.
pub fn tx_priority(fee: &Coins, gas: u64) -> i64 {
    if gas == 0 {
        return 0;
    }
    fee.iter()
        .map(|coin| saturate_i64(coin.amount / U256::from(gas)))
        .min()
        .unwrap_or(0)
}

/// `ceil(price × gas)` as a fee amount.
pub(crate) fn required_fee(price: Dec, gas: u64) -> AnteResult<U256> {
    Ok(price.checked_mul_int(U256::from(gas))?.ceil_int())
}
