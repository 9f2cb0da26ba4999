use std::sync::Arc;

use tollgate_core::{ante_err, AnteResult};
use tollgate_tx::Tx;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::FeeMarketKeeper;
use crate::policy::ChainPolicy;

/// Records the transaction's gas wanted with the fee market once London is
/// active.
pub struct GasWanted {
    fee_market: Arc<dyn FeeMarketKeeper>,
    policy: Arc<ChainPolicy>,
}

impl GasWanted {
    pub fn new(fee_market: Arc<dyn FeeMarketKeeper>, policy: Arc<ChainPolicy>) -> Self {
        Self { fee_market, policy }
    }
}

impl AnteDecorator for GasWanted {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !self.policy.forks.is_london(ctx.height) {
            return next.run(ctx, tx, simulate);
        }

        let gas_wanted = tx.gas();
        let block_limit = ctx.block_gas_limit();
        if gas_wanted > block_limit {
            return Err(ante_err!(
                OutOfGas,
                "tx gas ({gas_wanted}) exceeds block gas limit ({block_limit})"
            ));
        }

        if self.fee_market.base_fee_enabled() {
            self.fee_market
                .add_transient_gas_wanted(gas_wanted)
                .map_err(|err| err.wrap("failed to add gas wanted to transient store"))?;
        }

        next.run(ctx, tx, simulate)
    }
}
