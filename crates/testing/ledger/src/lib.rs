//! Test support for the admission pipeline: an in-memory ledger that
//! implements every keeper trait, throwaway keys and transaction builders.
#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod builders;
pub mod keys;
pub mod ledger;

pub use builders::{eth_tx, EthMsgBuilder, NativeTxBuilder, Signer, RECIPIENT};
pub use keys::TestKey;
pub use ledger::{
    module_address, LedgerState, MemoryLedger, TEST_CHAIN_ID, TEST_DENOM, TEST_EIP155_CHAIN_ID,
};

use tollgate_ante::{Context, ExecMode};

/// Block height used by [`context`].
pub const TEST_HEIGHT: u64 = 100;
/// Block time (unix seconds) used by [`context`].
pub const TEST_TIME: u64 = 1_700_000_000;

/// A context at [`TEST_HEIGHT`] and [`TEST_TIME`] on the test chain.
pub fn context(mode: ExecMode) -> Context {
    Context::new(TEST_CHAIN_ID, TEST_HEIGHT, TEST_TIME, mode)
}

/// Number of proptest cases: `TOLLGATE_PROPTEST_CASES` when set, fewer on CI.
pub fn proptest_cases() -> u32 {
    const DEFAULT_CASES: u32 = 64;
    const CI_CASES: u32 = 32;

    if let Ok(value) = std::env::var("TOLLGATE_PROPTEST_CASES") {
        if let Ok(parsed) = value.parse::<u32>() {
            if parsed > 0 {
                return parsed;
            }
        }
    }
    if std::env::var("CI").is_ok() {
        return CI_CASES;
    }
    DEFAULT_CASES
}
