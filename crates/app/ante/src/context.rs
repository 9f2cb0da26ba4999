//! Per-transaction execution context threaded through a decorator chain.

use tollgate_core::{DecCoins, Event};

use crate::gas::GasMeter;

/// Why the transaction is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// First admission into the mempool.
    Check,
    /// Re-validation of a mempool transaction after a block commit.
    ReCheck,
    /// Block execution.
    Deliver,
}

/// Block data and mutable scratch state for one transaction.
///
/// Decorators consume a `Context` and hand back a (possibly modified) one.
/// The gas meter is swapped rather than mutated in place when a chain
/// installs an infinite meter.
#[derive(Debug, Clone)]
pub struct Context {
    pub chain_id: String,
    pub height: u64,
    /// Block time in unix seconds.
    pub time: u64,
    pub mode: ExecMode,
    pub gas_meter: GasMeter,
    /// Consensus max block gas; `None` means unbounded.
    pub max_block_gas: Option<u64>,
    /// Validator-local minimum gas prices.
    pub min_gas_prices: DecCoins,
    pub priority: i64,
    pub events: Vec<Event>,
}

impl Context {
    pub fn new(chain_id: impl Into<String>, height: u64, time: u64, mode: ExecMode) -> Self {
        Self {
            chain_id: chain_id.into(),
            height,
            time,
            mode,
            gas_meter: GasMeter::infinite(),
            max_block_gas: None,
            min_gas_prices: DecCoins::default(),
            priority: 0,
            events: Vec::new(),
        }
    }

    pub fn is_check_tx(&self) -> bool {
        matches!(self.mode, ExecMode::Check | ExecMode::ReCheck)
    }

    pub fn is_recheck_tx(&self) -> bool {
        self.mode == ExecMode::ReCheck
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Block gas limit, `u64::MAX` when consensus sets none.
    pub fn block_gas_limit(&self) -> u64 {
        match self.max_block_gas {
            Some(max) if max > 0 => max,
            _ => u64::MAX,
        }
    }

    pub fn with_gas_meter(mut self, gas_meter: GasMeter) -> Self {
        self.gas_meter = gas_meter;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_block_gas(mut self, max_block_gas: Option<u64>) -> Self {
        self.max_block_gas = max_block_gas;
        self
    }

    pub fn with_min_gas_prices(mut self, min_gas_prices: DecCoins) -> Self {
        self.min_gas_prices = min_gas_prices;
        self
    }

    pub fn emit_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events of `kind` emitted so far, in order.
    pub fn events_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Event> {
        self.events.iter().filter(move |event| event.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_predicates() {
        let check = Context::new("haqq_11235-1", 5, 0, ExecMode::Check);
        assert!(check.is_check_tx());
        assert!(!check.is_recheck_tx());

        let recheck = Context::new("haqq_11235-1", 5, 0, ExecMode::ReCheck);
        assert!(recheck.is_check_tx());
        assert!(recheck.is_recheck_tx());

        let deliver = Context::new("haqq_11235-1", 5, 0, ExecMode::Deliver);
        assert!(!deliver.is_check_tx());
    }

    #[test]
    fn test_block_gas_limit_defaults_to_unbounded() {
        let ctx = Context::new("haqq_11235-1", 1, 0, ExecMode::Deliver);
        assert_eq!(ctx.block_gas_limit(), u64::MAX);
        assert_eq!(ctx.clone().with_max_block_gas(Some(0)).block_gas_limit(), u64::MAX);
        assert_eq!(ctx.with_max_block_gas(Some(30_000_000)).block_gas_limit(), 30_000_000);
    }
}
