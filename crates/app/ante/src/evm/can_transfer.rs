use std::sync::Arc;

use alloy_primitives::U256;
use tollgate_core::{ante_err, AnteResult};
use tollgate_tx::Tx;
use tollgate_tx_eth::TypedTransaction;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::EvmKeeper;
use crate::policy::ChainPolicy;

use super::verified_sender;

/// Checks that each message's top-level value transfer is payable from the
/// sender's EVM balance and, after London, that its fee cap clears the
/// block base fee.
pub struct CanTransfer {
    evm: Arc<dyn EvmKeeper>,
    policy: Arc<ChainPolicy>,
}

impl CanTransfer {
    pub fn new(evm: Arc<dyn EvmKeeper>, policy: Arc<ChainPolicy>) -> Self {
        Self { evm, policy }
    }
}

impl AnteDecorator for CanTransfer {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let london = self.policy.forks.is_london(ctx.height);

        for msg in tx.ethereum_msgs() {
            let data = msg.data();
            if london {
                let Some(base_fee) = self.evm.base_fee() else {
                    return Err(ante_err!(
                        InvalidBaseFee,
                        "base fee is supported but evm block context value is nil"
                    ));
                };
                let cap = data.gas_fee_cap();
                if cap < base_fee {
                    return Err(ante_err!(
                        InsufficientFee,
                        "max fee per gas less than block base fee ({cap} < {base_fee})"
                    ));
                }
            }

            let value = data.value();
            if value.is_zero() {
                continue;
            }
            let from = verified_sender(msg)?;
            let balance = self
                .evm
                .get_account(from)
                .map_or(U256::ZERO, |account| account.balance);
            if balance < value {
                return Err(ante_err!(
                    InsufficientFunds,
                    "failed to transfer {value} from address {from} using the EVM block context transfer function"
                ));
            }
        }

        next.run(ctx, tx, simulate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::ExecMode;
    use crate::decorator::AnteChain;
    use crate::evm::fixtures::{envelope, MockEvm, Signer, CHAIN_ID};
    use tollgate_core::ErrorKind;
    use tollgate_tx_eth::{EthSigner, EthereumMsg, ForkSchedule};

    fn verified(mut msg: EthereumMsg) -> EthereumMsg {
        msg.verify_sender(&EthSigner::for_height(&ForkSchedule::default(), CHAIN_ID, 1))
            .unwrap();
        msg
    }

    fn run(evm: MockEvm, forks: ForkSchedule, msg: EthereumMsg) -> AnteResult<Context> {
        let policy = ChainPolicy {
            forks,
            ..Default::default()
        };
        let chain = AnteChain::new(
            "transfer",
            vec![Box::new(CanTransfer::new(Arc::new(evm), Arc::new(policy)))],
        );
        let mut tx = envelope(vec![verified(msg)], "aISLM");
        chain.run(Context::new("haqq_11235-1", 1, 0, ExecMode::Deliver), &mut tx, false)
    }

    #[test]
    fn test_london_requires_base_fee() {
        let signer = Signer::random();
        let err = run(MockEvm::default(), ForkSchedule::default(), signer.legacy(0, 10, 21_000, 0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBaseFee);

        let pre_london = ForkSchedule {
            london: None,
            ..Default::default()
        };
        assert!(run(MockEvm::default(), pre_london, signer.legacy(0, 10, 21_000, 0)).is_ok());
    }

    #[test]
    fn test_fee_cap_below_base_fee() {
        let signer = Signer::random();
        let err = run(
            MockEvm::with_base_fee(Some(11)),
            ForkSchedule::default(),
            signer.legacy(0, 10, 21_000, 0),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFee);
        assert_eq!(err.reason(), "max fee per gas less than block base fee (10 < 11)");
    }

    #[test]
    fn test_value_must_be_covered() {
        let signer = Signer::random();
        let evm = MockEvm::with_base_fee(Some(1));
        evm.fund(signer.address, 99);
        let err = run(evm, ForkSchedule::default(), signer.legacy(0, 10, 21_000, 100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);

        let evm = MockEvm::with_base_fee(Some(1));
        evm.fund(signer.address, 100);
        assert!(run(evm, ForkSchedule::default(), signer.legacy(0, 10, 21_000, 100)).is_ok());
    }
}
