//! Transaction admission for a chain carrying native and Ethereum
//! transactions.
//!
//! Every transaction passes through one of three fixed decorator chains
//! before it may execute:
//!
//! - **native**: signed wrapper transactions with their own fee, signer
//!   infos and signatures
//! - **ethereum**: wrapper transactions tagged `ExtensionOptionsEthereumTx`
//!   whose messages are signed Ethereum transactions
//! - **legacy_eip712**: native transactions signed by an Ethereum wallet over
//!   EIP-712 typed data, carried in the `Web3Tx` extension option
//!
//! [`AnteHandler`] picks the chain from the first extension option and runs
//! it. Each [`AnteDecorator`] either rejects with a typed
//! [`tollgate_core::AnteError`] or hands an updated [`Context`] to the next
//! one. Ledger state is reached only through the [`keepers`] traits; chain
//! policy comes from an immutable [`ChainPolicy`].
//!
//! ```ignore
//! let handler = AnteHandler::new(HandlerOptions::new(keepers, ChainPolicy::default()))?;
//! let ctx = handler.handle(Context::new("haqq_11235-1", height, time, ExecMode::Check), &mut tx, false)?;
//! ```

pub mod authz;
pub mod context;
pub mod cosmos;
pub mod decorator;
pub mod evm;
pub mod fees;
pub mod gas;
pub mod handler;
pub mod keepers;
pub mod policy;

pub use context::{Context, ExecMode};
pub use decorator::{AnteChain, AnteDecorator, Next};
pub use fees::{DynamicFeeChecker, FeeClaim, FeeClaimer, FeeDeductor, TxFeeChecker};
pub use gas::GasMeter;
pub use handler::{AnteHandler, HandlerOptions, TxFamily};
pub use keepers::{
    Account, AccountKeeper, BankKeeper, Delegation, DistributionKeeper, EvmAccount, EvmKeeper,
    FeeGrantKeeper, FeeMarketKeeper, IbcKeeper, Keepers, Period, StakingKeeper, VestingSchedule,
    FEE_COLLECTOR, KECCAK256_EMPTY,
};
pub use policy::{AccessControl, AuthParams, ChainPolicy, DEFAULT_EVM_DENOM};
