//! Capability interfaces the pipeline consumes.
//!
//! Every ledger read and write made during admission goes through one of
//! these traits. Implementations own their own consistency; the pipeline
//! holds no locks. Callers run a chain against a revertible state scope and
//! commit only on success, since side effects of earlier decorators are not
//! undone when a later one rejects.

use std::sync::Arc;

use alloy_primitives::{b256, Address, B256, U256};
use tollgate_core::{AnteResult, Coin, Coins, Dec};
use tollgate_tx::{Message, Packet, PacketKind, PubKey};

/// Module account receiving transaction fees.
pub const FEE_COLLECTOR: &str = "fee_collector";

/// keccak256 of empty bytecode.
pub const KECCAK256_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// A lockup period of a clawback vesting schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    /// Seconds after the previous period ends.
    pub length: u64,
    pub amount: Coins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VestingSchedule {
    pub start_time: u64,
    pub original_vesting: Coins,
    pub lockup_periods: Vec<Period>,
}

impl VestingSchedule {
    /// Coins still locked at unix time `time`.
    pub fn locked_coins(&self, time: u64) -> Coins {
        let mut end = self.start_time;
        let mut unlocked = Coins::empty();
        for period in &self.lockup_periods {
            end = end.saturating_add(period.length);
            if end > time {
                break;
            }
            unlocked = match unlocked.checked_add(&period.amount) {
                Ok(sum) => sum,
                Err(_) => return Coins::empty(),
            };
        }
        Coins::new(self.original_vesting.iter().map(|coin| {
            let amount = coin.amount.saturating_sub(unlocked.amount_of(&coin.denom));
            Coin::new(coin.denom.clone(), amount)
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub account_number: u64,
    pub sequence: u64,
    pub pubkey: Option<PubKey>,
    pub vesting: Option<VestingSchedule>,
}

impl Account {
    pub fn is_vesting(&self) -> bool {
        self.vesting.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub delegator: Address,
    pub validator: Address,
    pub shares: Dec,
}

/// The EVM state view of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmAccount {
    pub nonce: u64,
    pub balance: U256,
    pub code_hash: B256,
}

impl EvmAccount {
    pub fn is_contract(&self) -> bool {
        self.code_hash != KECCAK256_EMPTY
    }
}

impl Default for EvmAccount {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::ZERO,
            code_hash: KECCAK256_EMPTY,
        }
    }
}

pub trait AccountKeeper: Send + Sync {
    fn get_account(&self, address: Address) -> Option<Account>;

    fn set_account(&self, account: Account);

    /// A fresh account with the next account number. Not stored until
    /// [`AccountKeeper::set_account`] is called.
    fn new_account_with_address(&self, address: Address) -> Account;

    fn module_address(&self, name: &str) -> Option<Address>;
}

pub trait BankKeeper: Send + Sync {
    fn balance(&self, address: Address, denom: &str) -> U256;

    fn send_coins_from_account_to_module(
        &self,
        from: Address,
        module: &str,
        amount: &Coins,
    ) -> AnteResult<()>;
}

pub trait StakingKeeper: Send + Sync {
    fn bond_denom(&self) -> String;

    fn delegations(&self, delegator: Address) -> Vec<Delegation>;
}

pub trait DistributionKeeper: Send + Sync {
    /// Pending rewards without withdrawing them.
    fn delegation_rewards(&self, delegator: Address, validator: Address) -> Coins;

    /// Withdraw every pending reward of the delegation to the delegator.
    fn withdraw_delegation_rewards(
        &self,
        delegator: Address,
        validator: Address,
    ) -> AnteResult<Coins>;
}

pub trait FeeGrantKeeper: Send + Sync {
    /// Charge `fee` against the allowance `granter` gave `grantee`.
    fn use_granted_fees(
        &self,
        granter: Address,
        grantee: Address,
        fee: &Coins,
        msgs: &[Message],
    ) -> AnteResult<()>;
}

pub trait EvmKeeper: Send + Sync {
    fn chain_id(&self) -> u64;

    /// Current base fee; `None` when the fee market is disabled.
    fn base_fee(&self) -> Option<U256>;

    fn reset_transient_gas_used(&self);

    /// Index of the next Ethereum transaction within the block.
    fn tx_index_transient(&self) -> u64;

    fn get_account(&self, address: Address) -> Option<EvmAccount>;
}

pub trait FeeMarketKeeper: Send + Sync {
    fn base_fee_enabled(&self) -> bool;

    /// Add to the block's gas wanted and return the new total.
    fn add_transient_gas_wanted(&self, gas: u64) -> AnteResult<u64>;
}

pub trait IbcKeeper: Send + Sync {
    /// Whether the packet message was already relayed.
    fn packet_redundant(&self, kind: PacketKind, packet: &Packet) -> AnteResult<bool>;

    /// Validate a client update before the rest of the relay is checked.
    fn check_update_client(&self, client_id: &str) -> AnteResult<()>;
}

/// Every capability a chain may use. `fee_grant` is optional: without it
/// fee granters are rejected.
#[derive(Clone)]
pub struct Keepers {
    pub account: Arc<dyn AccountKeeper>,
    pub bank: Arc<dyn BankKeeper>,
    pub staking: Arc<dyn StakingKeeper>,
    pub distribution: Arc<dyn DistributionKeeper>,
    pub fee_grant: Option<Arc<dyn FeeGrantKeeper>>,
    pub evm: Arc<dyn EvmKeeper>,
    pub fee_market: Arc<dyn FeeMarketKeeper>,
    pub ibc: Arc<dyn IbcKeeper>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> VestingSchedule {
        VestingSchedule {
            start_time: 1_000,
            original_vesting: Coins::single("aISLM", 300u64),
            lockup_periods: vec![
                Period {
                    length: 100,
                    amount: Coins::single("aISLM", 100u64),
                },
                Period {
                    length: 100,
                    amount: Coins::single("aISLM", 200u64),
                },
            ],
        }
    }

    #[test]
    fn test_locked_coins_follow_period_ends() {
        let s = schedule();
        assert_eq!(s.locked_coins(0).amount_of("aISLM"), U256::from(300u64));
        assert_eq!(s.locked_coins(1_099).amount_of("aISLM"), U256::from(300u64));
        assert_eq!(s.locked_coins(1_100).amount_of("aISLM"), U256::from(200u64));
        assert!(s.locked_coins(1_200).is_empty());
    }

    #[test]
    fn test_locked_coins_keep_other_denoms() {
        let mut s = schedule();
        s.original_vesting = Coins::new([Coin::new("aISLM", 300u64), Coin::new("uatom", 5u64)]);
        let locked = s.locked_coins(5_000);
        assert!(locked.amount_of("aISLM").is_zero());
        assert_eq!(locked.amount_of("uatom"), U256::from(5u64));
    }

    #[test]
    fn test_contract_detection() {
        assert!(!EvmAccount::default().is_contract());
        let contract = EvmAccount {
            code_hash: B256::repeat_byte(1),
            ..Default::default()
        };
        assert!(contract.is_contract());
    }
}
