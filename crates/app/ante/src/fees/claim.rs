//! Staking reward fallback for fee payers with a short liquid balance.

use alloy_primitives::{Address, U256};
use tollgate_core::{ante_err, AnteResult, Coins};
use tracing::{debug, info};

use crate::keepers::{BankKeeper, DistributionKeeper, StakingKeeper};

/// Rewards withdrawn to cover a fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeClaim {
    pub delegator: Address,
    pub withdrawn: Coins,
    /// Validators whose rewards were withdrawn, in withdrawal order.
    pub validators: Vec<Address>,
}

pub struct FeeClaimer<'a> {
    bank: &'a dyn BankKeeper,
    staking: &'a dyn StakingKeeper,
    distribution: &'a dyn DistributionKeeper,
}

impl<'a> FeeClaimer<'a> {
    pub fn new(
        bank: &'a dyn BankKeeper,
        staking: &'a dyn StakingKeeper,
        distribution: &'a dyn DistributionKeeper,
    ) -> Self {
        Self {
            bank,
            staking,
            distribution,
        }
    }

    /// Withdraw staking rewards until `payer` can cover `fees`.
    ///
    /// Returns `None` when the liquid balance already suffices. Rewards are
    /// summed before anything is withdrawn, so a rejection leaves state
    /// untouched. Delegations are withdrawn in ascending validator address
    /// order, and each withdrawal takes the delegation's whole reward.
    pub fn claim_if_needed(&self, payer: Address, fees: &Coins) -> AnteResult<Option<FeeClaim>> {
        let bond_denom = self.staking.bond_denom();
        let Some(fee) = fees.find(&bond_denom) else {
            return Err(ante_err!(
                InsufficientFee,
                "wrong fee denomination; got: {fees}; required: {bond_denom}"
            ));
        };

        let balance = self.bank.balance(payer, &bond_denom);
        if balance >= fee.amount {
            return Ok(None);
        }
        let shortfall = fee.amount - balance;

        let mut validators: Vec<Address> = self
            .staking
            .delegations(payer)
            .into_iter()
            .map(|delegation| delegation.validator)
            .collect();
        validators.sort();
        validators.dedup();

        let mut pending = Vec::with_capacity(validators.len());
        let mut total = U256::ZERO;
        for validator in validators {
            let reward = self
                .distribution
                .delegation_rewards(payer, validator)
                .amount_of(&bond_denom);
            if reward.is_zero() {
                continue;
            }
            total = total.saturating_add(reward);
            pending.push(validator);
        }

        if total < shortfall {
            debug!(%payer, %shortfall, rewards = %total, "staking rewards cannot cover fee");
            return Err(ante_err!(
                InsufficientFundsAndRewards,
                "balance {balance}{bond_denom} and rewards {total}{bond_denom} cannot cover fee {fee}"
            ));
        }

        let mut withdrawn = Coins::empty();
        let mut used = Vec::new();
        for validator in pending {
            if withdrawn.amount_of(&bond_denom) >= shortfall {
                break;
            }
            let coins = self
                .distribution
                .withdraw_delegation_rewards(payer, validator)?;
            withdrawn = withdrawn.checked_add(&coins)?;
            used.push(validator);
        }

        if withdrawn.amount_of(&bond_denom) < shortfall {
            return Err(ante_err!(
                InsufficientFundsAndRewards,
                "withdrew {withdrawn} but fee {fee} needs {shortfall}{bond_denom} more"
            ));
        }

        info!(
            %payer,
            withdrawn = %withdrawn,
            validators = used.len(),
            "claimed staking rewards to pay fee"
        );
        Ok(Some(FeeClaim {
            delegator: payer,
            withdrawn,
            validators: used,
        }))
    }
}
