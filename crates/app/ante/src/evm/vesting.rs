use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tollgate_core::{ante_err, AnteResult};
use tollgate_tx::Tx;
use tollgate_tx_eth::TypedTransaction;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::{Account, AccountKeeper, BankKeeper, VestingSchedule};
use crate::policy::ChainPolicy;

use super::verified_sender;

/// Running spend of one vesting account across a transaction's messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExpenseTracker {
    total: U256,
    spendable: U256,
}

/// Keeps clawback vesting accounts from moving locked coins through the
/// EVM. The values of all messages from one account are judged together.
pub struct EthVesting {
    accounts: Arc<dyn AccountKeeper>,
    bank: Arc<dyn BankKeeper>,
    policy: Arc<ChainPolicy>,
}

impl EthVesting {
    pub fn new(
        accounts: Arc<dyn AccountKeeper>,
        bank: Arc<dyn BankKeeper>,
        policy: Arc<ChainPolicy>,
    ) -> Self {
        Self {
            accounts,
            bank,
            policy,
        }
    }

    fn add_expense(
        &self,
        ctx: &Context,
        trackers: &mut HashMap<Address, ExpenseTracker>,
        account: &Account,
        schedule: &VestingSchedule,
        value: U256,
    ) -> AnteResult<ExpenseTracker> {
        if let Some(tracker) = trackers.get_mut(&account.address) {
            tracker.total = tracker.total.saturating_add(value);
            return Ok(*tracker);
        }

        let denom = &self.policy.evm_denom;
        let balance = self.bank.balance(account.address, denom);
        if balance.is_zero() {
            return Err(ante_err!(
                InsufficientFunds,
                "account has no balance to execute transaction: {}",
                account.address
            ));
        }
        let locked = schedule.locked_coins(ctx.time).amount_of(denom);
        let tracker = ExpenseTracker {
            total: value,
            spendable: balance.saturating_sub(locked),
        };
        trackers.insert(account.address, tracker);
        Ok(tracker)
    }
}

impl AnteDecorator for EthVesting {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let mut trackers = HashMap::new();

        for msg in tx.ethereum_msgs() {
            let from = verified_sender(msg)?;
            let Some(account) = self.accounts.get_account(from) else {
                return Err(ante_err!(UnknownAddress, "account {from} does not exist"));
            };
            let Some(schedule) = &account.vesting else {
                continue;
            };

            let tracker =
                self.add_expense(&ctx, &mut trackers, &account, schedule, msg.data().value())?;
            if tracker.total > tracker.spendable {
                return Err(ante_err!(
                    InsufficientUnlockedVestingCoins,
                    "clawback vesting account has insufficient unlocked tokens to execute transaction: {} < {}",
                    tracker.spendable,
                    tracker.total
                ));
            }
        }

        next.run(ctx, tx, simulate)
    }
}
