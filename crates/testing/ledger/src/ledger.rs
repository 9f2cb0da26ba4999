//! An in-memory ledger implementing every keeper the pipeline consumes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use alloy_primitives::{keccak256, Address, B256, U256};
use parking_lot::RwLock;
use tollgate_ante::{
    Account, AccountKeeper, BankKeeper, Delegation, DistributionKeeper, EvmAccount, EvmKeeper,
    FeeGrantKeeper, FeeMarketKeeper, IbcKeeper, Keepers, StakingKeeper, VestingSchedule,
    FEE_COLLECTOR, KECCAK256_EMPTY,
};
use tollgate_core::{ante_err, AnteResult, Coin, Coins, Dec, IntoAmount};
use tollgate_tx::{Message, Packet, PacketKind};

pub const TEST_CHAIN_ID: &str = "haqq_11235-1";
pub const TEST_EIP155_CHAIN_ID: u64 = 11235;
pub const TEST_DENOM: &str = "aISLM";

/// Address of a module account: the low 20 bytes of keccak256 of its name.
pub fn module_address(name: &str) -> Address {
    Address::from_word(keccak256(name.as_bytes()))
}

type PacketKey = (u8, String, u64);

fn packet_key(kind: PacketKind, packet: &Packet) -> PacketKey {
    match kind {
        PacketKind::Recv => (0, packet.destination_channel.clone(), packet.sequence),
        PacketKind::Acknowledgement => (1, packet.source_channel.clone(), packet.sequence),
        PacketKind::Timeout => (2, packet.source_channel.clone(), packet.sequence),
    }
}

/// Everything the ledger holds. Cloned whole for snapshots.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    accounts: BTreeMap<Address, Account>,
    next_account_number: u64,
    balances: BTreeMap<(Address, String), U256>,
    modules: BTreeMap<String, Address>,
    contracts: BTreeMap<Address, B256>,
    delegations: Vec<Delegation>,
    rewards: BTreeMap<(Address, Address), Coins>,
    allowances: BTreeMap<(Address, Address), Option<Coins>>,
    relayed: BTreeSet<PacketKey>,
    frozen_clients: BTreeSet<String>,
    base_fee: Option<U256>,
    tx_index: u64,
    transient_gas_wanted: u64,
    gas_used_resets: u64,
}

/// Shared in-memory state behind every keeper trait.
///
/// Reads and writes take a `parking_lot` lock per call, so a handler may be
/// driven from several threads. [`MemoryLedger::snapshot`] and
/// [`MemoryLedger::restore`] give tests a revertible scope.
#[derive(Debug)]
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
    eip155_chain_id: u64,
    denom: String,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new(TEST_EIP155_CHAIN_ID, TEST_DENOM)
    }
}

impl MemoryLedger {
    /// An empty ledger with the fee collector module registered.
    pub fn new(eip155_chain_id: u64, denom: impl Into<String>) -> Self {
        let mut state = LedgerState::default();
        state
            .modules
            .insert(FEE_COLLECTOR.to_string(), module_address(FEE_COLLECTOR));
        Self {
            state: RwLock::new(state),
            eip155_chain_id,
            denom: denom.into(),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every keeper handle backed by this ledger, fee grants enabled.
    pub fn keepers(self: &Arc<Self>) -> Keepers {
        Keepers {
            account: self.clone(),
            bank: self.clone(),
            staking: self.clone(),
            distribution: self.clone(),
            fee_grant: Some(self.clone()),
            evm: self.clone(),
            fee_market: self.clone(),
            ibc: self.clone(),
        }
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }

    pub fn snapshot(&self) -> LedgerState {
        self.state.read().clone()
    }

    pub fn restore(&self, snapshot: LedgerState) {
        *self.state.write() = snapshot;
    }

    /// Store a fresh account for `address`, or return the existing one.
    pub fn create_account(&self, address: Address) -> Account {
        if let Some(existing) = AccountKeeper::get_account(self, address) {
            return existing;
        }
        let account = self.new_account_with_address(address);
        self.set_account(account.clone());
        account
    }

    pub fn fund(&self, address: Address, amount: impl IntoAmount) {
        let amount = amount.into_amount();
        let mut state = self.state.write();
        let entry = state
            .balances
            .entry((address, self.denom.clone()))
            .or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn module_balance(&self, name: &str) -> U256 {
        self.balance(module_address(name), &self.denom)
    }

    pub fn set_vesting(&self, address: Address, schedule: VestingSchedule) {
        let mut account = self.create_account(address);
        account.vesting = Some(schedule);
        self.set_account(account);
    }

    pub fn set_contract(&self, address: Address, code_hash: B256) {
        self.state.write().contracts.insert(address, code_hash);
    }

    /// Delegate to `validator` with `reward` pending in the ledger denom.
    pub fn delegate(&self, delegator: Address, validator: Address, reward: impl IntoAmount) {
        let mut state = self.state.write();
        state.delegations.push(Delegation {
            delegator,
            validator,
            shares: Dec::ONE,
        });
        state.rewards.insert(
            (delegator, validator),
            Coins::single(self.denom.clone(), reward),
        );
    }

    /// Let `grantee` spend `granter`'s balance on fees, up to `limit`.
    pub fn grant_allowance(&self, granter: Address, grantee: Address, limit: Option<Coins>) {
        self.state
            .write()
            .allowances
            .insert((granter, grantee), limit);
    }

    pub fn allowance(&self, granter: Address, grantee: Address) -> Option<Option<Coins>> {
        self.state.read().allowances.get(&(granter, grantee)).cloned()
    }

    pub fn set_base_fee(&self, base_fee: Option<u64>) {
        self.state.write().base_fee = base_fee.map(U256::from);
    }

    pub fn set_tx_index(&self, index: u64) {
        self.state.write().tx_index = index;
    }

    pub fn mark_relayed(&self, kind: PacketKind, packet: &Packet) {
        self.state.write().relayed.insert(packet_key(kind, packet));
    }

    pub fn freeze_client(&self, client_id: impl Into<String>) {
        self.state.write().frozen_clients.insert(client_id.into());
    }

    pub fn transient_gas_wanted(&self) -> u64 {
        self.state.read().transient_gas_wanted
    }

    pub fn gas_used_resets(&self) -> u64 {
        self.state.read().gas_used_resets
    }
}

impl AccountKeeper for MemoryLedger {
    fn get_account(&self, address: Address) -> Option<Account> {
        self.state.read().accounts.get(&address).cloned()
    }

    fn set_account(&self, account: Account) {
        let mut state = self.state.write();
        state.next_account_number = state
            .next_account_number
            .max(account.account_number.saturating_add(1));
        state.accounts.insert(account.address, account);
    }

    fn new_account_with_address(&self, address: Address) -> Account {
        let mut state = self.state.write();
        let account_number = state.next_account_number;
        state.next_account_number += 1;
        Account {
            address,
            account_number,
            sequence: 0,
            pubkey: None,
            vesting: None,
        }
    }

    fn module_address(&self, name: &str) -> Option<Address> {
        self.state.read().modules.get(name).copied()
    }
}

impl BankKeeper for MemoryLedger {
    fn balance(&self, address: Address, denom: &str) -> U256 {
        self.state
            .read()
            .balances
            .get(&(address, denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn send_coins_from_account_to_module(
        &self,
        from: Address,
        module: &str,
        amount: &Coins,
    ) -> AnteResult<()> {
        let mut state = self.state.write();
        let Some(to) = state.modules.get(module).copied() else {
            return Err(ante_err!(Internal, "module account {module} does not exist"));
        };
        for coin in amount.iter() {
            let held = state
                .balances
                .get(&(from, coin.denom.clone()))
                .copied()
                .unwrap_or_default();
            if held < coin.amount {
                return Err(ante_err!(
                    InsufficientFunds,
                    "spendable balance {held}{} is smaller than {coin}",
                    coin.denom
                ));
            }
        }
        for Coin { denom, amount: value } in amount.iter().cloned() {
            let from_entry = state.balances.entry((from, denom.clone())).or_default();
            *from_entry = from_entry.saturating_sub(value);
            let to_entry = state.balances.entry((to, denom)).or_default();
            *to_entry = to_entry.saturating_add(value);
        }
        Ok(())
    }
}

impl StakingKeeper for MemoryLedger {
    fn bond_denom(&self) -> String {
        self.denom.clone()
    }

    fn delegations(&self, delegator: Address) -> Vec<Delegation> {
        self.state
            .read()
            .delegations
            .iter()
            .filter(|d| d.delegator == delegator)
            .cloned()
            .collect()
    }
}

impl DistributionKeeper for MemoryLedger {
    fn delegation_rewards(&self, delegator: Address, validator: Address) -> Coins {
        self.state
            .read()
            .rewards
            .get(&(delegator, validator))
            .cloned()
            .unwrap_or_default()
    }

    fn withdraw_delegation_rewards(
        &self,
        delegator: Address,
        validator: Address,
    ) -> AnteResult<Coins> {
        let mut state = self.state.write();
        if !state
            .delegations
            .iter()
            .any(|d| d.delegator == delegator && d.validator == validator)
        {
            return Err(ante_err!(
                InvalidRequest,
                "no delegation for (address, validator) tuple"
            ));
        }
        let rewards = state
            .rewards
            .insert((delegator, validator), Coins::empty())
            .unwrap_or_default();
        for coin in rewards.iter() {
            let entry = state
                .balances
                .entry((delegator, coin.denom.clone()))
                .or_default();
            *entry = entry.saturating_add(coin.amount);
        }
        Ok(rewards)
    }
}

impl FeeGrantKeeper for MemoryLedger {
    fn use_granted_fees(
        &self,
        granter: Address,
        grantee: Address,
        fee: &Coins,
        _msgs: &[Message],
    ) -> AnteResult<()> {
        let mut state = self.state.write();
        let Some(limit) = state.allowances.get_mut(&(granter, grantee)) else {
            return Err(ante_err!(Unauthorized, "fee-grant not found"));
        };
        if let Some(remaining) = limit {
            *remaining = remaining
                .checked_sub(fee)
                .map_err(|err| err.wrap("basic allowance"))?;
        }
        Ok(())
    }
}

impl EvmKeeper for MemoryLedger {
    fn chain_id(&self) -> u64 {
        self.eip155_chain_id
    }

    fn base_fee(&self) -> Option<U256> {
        self.state.read().base_fee
    }

    fn reset_transient_gas_used(&self) {
        self.state.write().gas_used_resets += 1;
    }

    fn tx_index_transient(&self) -> u64 {
        self.state.read().tx_index
    }

    fn get_account(&self, address: Address) -> Option<EvmAccount> {
        let state = self.state.read();
        let account = state.accounts.get(&address)?;
        Some(EvmAccount {
            nonce: account.sequence,
            balance: state
                .balances
                .get(&(address, self.denom.clone()))
                .copied()
                .unwrap_or_default(),
            code_hash: state
                .contracts
                .get(&address)
                .copied()
                .unwrap_or(KECCAK256_EMPTY),
        })
    }
}

impl FeeMarketKeeper for MemoryLedger {
    fn base_fee_enabled(&self) -> bool {
        self.state.read().base_fee.is_some()
    }

    fn add_transient_gas_wanted(&self, gas: u64) -> AnteResult<u64> {
        let mut state = self.state.write();
        state.transient_gas_wanted = state
            .transient_gas_wanted
            .checked_add(gas)
            .ok_or_else(|| ante_err!(OutOfGas, "block gas wanted overflow"))?;
        Ok(state.transient_gas_wanted)
    }
}

impl IbcKeeper for MemoryLedger {
    fn packet_redundant(&self, kind: PacketKind, packet: &Packet) -> AnteResult<bool> {
        Ok(self.state.read().relayed.contains(&packet_key(kind, packet)))
    }

    fn check_update_client(&self, client_id: &str) -> AnteResult<()> {
        if self.state.read().frozen_clients.contains(client_id) {
            return Err(ante_err!(InvalidRequest, "client {client_id} is frozen"));
        }
        Ok(())
    }
}
