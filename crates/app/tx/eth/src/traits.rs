//! Core trait for typed Ethereum transactions.

use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, PrimitiveSignature, B256, U256};

/// Divisor turning a per-gas tip (in the smallest denom) into a mempool priority.
pub const PRIORITY_REDUCTION: u64 = 1_000_000;

/// Core trait that all Ethereum transaction types implement.
///
/// Pricing follows EIP-1559 semantics uniformly: legacy and access-list
/// transactions report their gas price as both fee cap and tip cap, so the
/// effective price of every type is `min(base_fee + tip_cap, fee_cap)`.
pub trait TypedTransaction {
    /// Returns the EIP-2718 transaction type byte.
    fn tx_type(&self) -> u8;

    /// Returns the transaction hash.
    fn tx_hash(&self) -> B256;

    /// Returns the chain ID for replay protection (EIP-155).
    ///
    /// Returns `None` for legacy transactions without EIP-155.
    fn chain_id(&self) -> Option<u64>;

    fn nonce(&self) -> u64;

    fn gas_limit(&self) -> u64;

    /// Returns the recipient address, or `None` for contract creation.
    fn to(&self) -> Option<Address>;

    /// Returns the value (in the smallest denom) being transferred.
    fn value(&self) -> U256;

    fn input(&self) -> &[u8];

    fn access_list(&self) -> Option<&AccessList>;

    /// Maximum price per gas the sender pays.
    fn gas_fee_cap(&self) -> U256;

    /// Maximum price per gas paid on top of the base fee.
    fn gas_tip_cap(&self) -> U256;

    fn signature(&self) -> &PrimitiveSignature;

    /// Hash the sender signed over, following the transaction's own type and
    /// replay protection.
    fn signature_hash(&self) -> B256;

    fn is_contract_creation(&self) -> bool {
        self.to().is_none()
    }

    /// Whether the signature commits to a chain id.
    fn is_protected(&self) -> bool {
        self.chain_id().is_some()
    }

    /// Upper bound on the fee: `fee_cap * gas_limit`.
    fn fee(&self) -> U256 {
        self.gas_fee_cap()
            .saturating_mul(U256::from(self.gas_limit()))
    }

    /// Upper bound on everything the sender can lose: fee plus value.
    fn cost(&self) -> U256 {
        self.fee().saturating_add(self.value())
    }

    fn effective_gas_price(&self, base_fee: Option<U256>) -> U256 {
        let cap = self.gas_fee_cap();
        match base_fee {
            Some(base) => base.saturating_add(self.gas_tip_cap()).min(cap),
            None => cap,
        }
    }

    fn effective_fee(&self, base_fee: Option<U256>) -> U256 {
        self.effective_gas_price(base_fee)
            .saturating_mul(U256::from(self.gas_limit()))
    }

    /// Mempool priority: the tip per gas above the base fee, reduced by
    /// [`PRIORITY_REDUCTION`] and saturated to `i64::MAX`.
    fn priority(&self, base_fee: Option<U256>) -> i64 {
        let mut tip = self.effective_gas_price(base_fee);
        if let Some(base) = base_fee {
            tip = tip.saturating_sub(base);
        }
        let reduced = tip / U256::from(PRIORITY_REDUCTION);
        i64::try_from(reduced).unwrap_or(i64::MAX)
    }
}
