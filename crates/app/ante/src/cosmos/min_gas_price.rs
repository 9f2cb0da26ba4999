use std::sync::Arc;

use tollgate_core::{ante_err, AnteResult, Coins};
use tollgate_tx::Tx;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::fees::checker::required_fee;
use crate::policy::ChainPolicy;

/// Enforces the chain-wide minimum gas price on native transactions.
pub struct MinGasPrice {
    policy: Arc<ChainPolicy>,
}

impl MinGasPrice {
    pub fn new(policy: Arc<ChainPolicy>) -> Self {
        Self { policy }
    }
}

impl AnteDecorator for MinGasPrice {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let min_gas_price = self.policy.min_gas_price;
        if min_gas_price.is_zero() || simulate {
            return next.run(ctx, tx, simulate);
        }

        let amount = required_fee(min_gas_price, tx.gas())?;
        let required = Coins::single(self.policy.evm_denom.clone(), amount);
        let fee = tx.fee();

        if fee.is_empty() {
            return Err(ante_err!(
                InsufficientFee,
                "fee not provided. Please use the --fees flag or the --gas-price flag along with the --gas flag to estimate the fee. The minimun global fee for this tx is: {required}"
            ));
        }
        if !fee.is_any_gte(&required) {
            return Err(ante_err!(
                InsufficientFee,
                "provided fee < minimum global fee ({fee} < {required}). Please increase the gas price."
            ));
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
    use tollgate_core::ErrorKind;

    fn chain(min: &str) -> AnteChain {
        let policy = ChainPolicy {
            min_gas_price: min.parse().unwrap(),
            ..Default::default()
        };
        AnteChain::new("min", vec![Box::new(MinGasPrice::new(Arc::new(policy)))])
    }

    fn tx(fee: u64) -> Tx {
        let mut tx = Tx::default();
        tx.auth_info.fee.amount = Coins::single("aISLM", fee);
        tx.auth_info.fee.gas_limit = 3;
        tx
    }

    fn ctx() -> Context {
        Context::new("haqq_11235-1", 1, 0, ExecMode::Deliver)
    }

    #[test]
    fn test_fee_below_minimum_is_rejected() {
        // ceil(1.5 * 3) = 5
        let err = chain("1.5").run(ctx(), &mut tx(4), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFee);
        assert!(err.reason().contains("provided fee < minimum global fee"));
        assert!(chain("1.5").run(ctx(), &mut tx(5), false).is_ok());
    }

    #[test]
    fn test_missing_fee_is_reported() {
        let err = chain("1").run(ctx(), &mut tx(0), false).unwrap_err();
        assert!(err.reason().starts_with("fee not provided"));
    }

    #[test]
    fn test_waived_when_zero_or_simulating() {
        assert!(chain("0").run(ctx(), &mut tx(0), false).is_ok());
        assert!(chain("10").run(ctx(), &mut tx(0), true).is_ok());
    }
}
