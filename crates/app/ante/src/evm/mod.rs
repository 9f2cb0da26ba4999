//! Decorators of the Ethereum chain.

use alloy_primitives::{Address, U256};
use tollgate_core::{ante_err, AnteResult};
use tollgate_tx_eth::EthereumMsg;

use crate::keepers::EvmKeeper;
use crate::policy::ChainPolicy;

pub mod account;
pub mod can_transfer;
pub mod fees;
pub mod gas;
pub mod setup;
pub mod sigverify;
pub mod validate;
pub mod vesting;

pub use account::{EthAccountVerification, EthIncrementSenderSequence};
pub use can_transfer::CanTransfer;
pub use fees::{verify_fee, EthMempoolFee, EthMinGasPrice};
pub use gas::EthGasConsume;
pub use setup::{EthEmitEvent, EthSetUpContext, RejectNativeMessages};
pub use sigverify::EthSigVerification;
pub use validate::EthValidateBasic;
pub use vesting::EthVesting;

/// The block base fee; absent before London or with the fee market off.
pub(crate) fn block_base_fee(evm: &dyn EvmKeeper, policy: &ChainPolicy, height: u64) -> Option<U256> {
    if policy.forks.is_london(height) {
        evm.base_fee()
    } else {
        None
    }
}

/// The sender recorded by signature verification.
pub(crate) fn verified_sender(msg: &EthereumMsg) -> AnteResult<Address> {
    msg.from().ok_or_else(|| {
        ante_err!(
            InvalidSigner,
            "sender of ethereum message {} is not verified",
            msg.hash()
        )
    })
}
