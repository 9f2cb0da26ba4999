use std::sync::Arc;

use tollgate_core::{ante_err, AnteResult};
use tollgate_tx::Tx;
use tollgate_tx_eth::{EthSigner, TypedTransaction};
use tracing::warn;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::EvmKeeper;
use crate::policy::ChainPolicy;

/// Recovers and records the sender of every Ethereum message.
///
/// Runs in every mode, recheck included: later decorators rely on the
/// recovered sender and it is never carried over from an earlier pass.
pub struct EthSigVerification {
    evm: Arc<dyn EvmKeeper>,
    policy: Arc<ChainPolicy>,
}

impl EthSigVerification {
    pub fn new(evm: Arc<dyn EvmKeeper>, policy: Arc<ChainPolicy>) -> Self {
        Self { evm, policy }
    }
}

impl AnteDecorator for EthSigVerification {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let signer = EthSigner::for_height(&self.policy.forks, self.evm.chain_id(), ctx.height);
        let allow_unprotected = self.policy.allow_unprotected_txs;

        for msg in tx.ethereum_msgs_mut() {
            if !allow_unprotected && !msg.data().is_protected() {
                warn!(hash = %msg.hash(), "rejecting unprotected ethereum transaction");
                return Err(ante_err!(
                    NotSupported,
                    "rejected unprotected Ethereum transaction. Please EIP155 sign your transaction to protect it against replay-attacks"
                ));
            }
            msg.verify_sender(&signer)?;
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
    use crate::evm::fixtures::{envelope, MockEvm, Signer};
    use tollgate_core::ErrorKind;

    fn chain(allow_unprotected_txs: bool) -> AnteChain {
        let policy = ChainPolicy {
            allow_unprotected_txs,
            ..Default::default()
        };
        AnteChain::new(
            "sig",
            vec![Box::new(EthSigVerification::new(
                Arc::new(MockEvm::default()),
                Arc::new(policy),
            ))],
        )
    }

    fn ctx() -> Context {
        Context::new("haqq_11235-1", 10, 0, ExecMode::Check)
    }

    #[test]
    fn test_sender_is_recorded() {
        let signer = Signer::random();
        let mut tx = envelope(vec![signer.legacy(0, 1, 21_000, 0)], "aISLM");
        chain(false).run(ctx(), &mut tx, false).unwrap();
        assert_eq!(tx.signers(), vec![signer.address]);
    }

    #[test]
    fn test_unprotected_rejected_unless_allowed() {
        let signer = Signer::random();
        let msg = signer.legacy_with_chain(None, 0, 1, 21_000, 0);
        let mut tx = envelope(vec![msg], "aISLM");
        let err = chain(false).run(ctx(), &mut tx, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        assert!(tx.signers().is_empty());

        chain(true).run(ctx(), &mut tx, false).unwrap();
        assert_eq!(tx.signers(), vec![signer.address]);
    }

    #[test]
    fn test_foreign_chain_id_is_rejected() {
        let signer = Signer::random();
        let msg = signer.legacy_with_chain(Some(1), 0, 1, 21_000, 0);
        let mut tx = envelope(vec![msg], "aISLM");
        let err = chain(false).run(ctx(), &mut tx, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSigner);
    }
}
