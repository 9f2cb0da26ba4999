//! Fee deduction shared by the native and Ethereum chains.

pub mod checker;
pub mod claim;

use alloy_primitives::Address;
use tollgate_core::events::{
    ATTRIBUTE_KEY_AMOUNT, ATTRIBUTE_KEY_DELEGATOR, EVENT_TYPE_CLAIM_STAKING_REWARDS,
};
use tollgate_core::{AnteError, AnteResult, Coins, ErrorKind, Event};

use crate::context::Context;
use crate::keepers::{Keepers, FEE_COLLECTOR};

pub use checker::{DynamicFeeChecker, TxFeeChecker};
pub use claim::{FeeClaim, FeeClaimer};

/// Moves fees from a payer to the fee collector, topping the payer's
/// balance up from staking rewards first when it falls short.
pub struct FeeDeductor<'a> {
    keepers: &'a Keepers,
}

impl<'a> FeeDeductor<'a> {
    pub fn new(keepers: &'a Keepers) -> Self {
        Self { keepers }
    }

    /// Deduct `fees` from `payer`.
    ///
    /// Zero fees succeed without touching state. A reward withdrawal made to
    /// cover the fee is reported as a `claim_staking_rewards` event.
    ///
    /// # Errors
    ///
    /// - `InsufficientFee` when the fee is not in the bond denom
    /// - `InsufficientFundsAndRewards` when balance plus rewards fall short
    /// - `InsufficientFunds` when the transfer itself fails
    pub fn deduct(&self, ctx: &mut Context, payer: Address, fees: &Coins) -> AnteResult<()> {
        if fees.is_zero() {
            return Ok(());
        }

        let claimer = FeeClaimer::new(
            self.keepers.bank.as_ref(),
            self.keepers.staking.as_ref(),
            self.keepers.distribution.as_ref(),
        );
        if let Some(claim) = claimer.claim_if_needed(payer, fees)? {
            ctx.emit_event(
                Event::new(EVENT_TYPE_CLAIM_STAKING_REWARDS)
                    .with_attribute(ATTRIBUTE_KEY_DELEGATOR, claim.delegator)
                    .with_attribute(ATTRIBUTE_KEY_AMOUNT, &claim.withdrawn),
            );
        }

        self.keepers
            .bank
            .send_coins_from_account_to_module(payer, FEE_COLLECTOR, fees)
            .map_err(|err| AnteError::new(ErrorKind::InsufficientFunds, err.to_string()))
    }
}
