//! Decorators of the native and legacy EIP-712 chains.

pub mod eip712;
pub mod fee;
pub mod gas_wanted;
pub mod ibc;
pub mod min_gas_price;
pub mod setup;
pub mod sigverify;

pub use eip712::LegacyEip712SigVerification;
pub use fee::DeductFee;
pub use gas_wanted::GasWanted;
pub use ibc::RedundantRelay;
pub use min_gas_price::MinGasPrice;
pub use setup::{
    ConsumeTxSizeGas, ExtensionOptions, RejectMessages, SetUpContext, TxTimeoutHeight,
    ValidateBasic, ValidateMemo,
};
pub use sigverify::{IncrementSequence, SetPubKey, SigGasConsume, SigVerification, ValidateSigCount};
