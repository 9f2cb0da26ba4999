//! Ethereum transactions carried inside ledger wrapper transactions.
//!
//! # Transaction Types
//!
//! - **Legacy (0x00)**: Pre-EIP-2718 transactions, optionally with EIP-155 replay protection
//! - **EIP-2930 (0x01)**: Access list transactions
//! - **EIP-1559 (0x02)**: Fee market transactions with base fee and priority fee
//!
//! # Architecture
//!
//! 1. [`TypedTransaction`] - Accessors and EIP-1559 pricing shared by all types
//! 2. [`EthTxData`] - Enum holding any supported signed transaction
//! 3. [`EthereumMsg`] - Ledger message whose sender is only set by verification
//! 4. [`EthSigner`] - Fork-aware sender recovery

pub mod envelope;
pub mod error;
pub mod ethereum;
pub mod forks;
pub mod intrinsic;
pub mod msg;
pub mod signer;
pub mod traits;

pub use envelope::{tx_type, EthTxData};
pub use error::SignerError;
pub use forks::ForkSchedule;
pub use intrinsic::intrinsic_gas;
pub use msg::{EthereumMsg, SenderState, MSG_ETHEREUM_TX_TYPE_URL};
pub use signer::EthSigner;
pub use traits::{TypedTransaction, PRIORITY_REDUCTION};
