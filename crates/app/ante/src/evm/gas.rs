use std::sync::Arc;

use tollgate_core::events::{ATTRIBUTE_KEY_FEE, EVENT_TYPE_TX};
use tollgate_core::{ante_err, AnteResult, Event};
use tollgate_tx::Tx;
use tollgate_tx_eth::TypedTransaction;
use tracing::debug;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::fees::FeeDeductor;
use crate::gas::GasMeter;
use crate::keepers::Keepers;
use crate::policy::ChainPolicy;

use super::{block_base_fee, verified_sender, verify_fee};

/// Charges the full gas cost of every message up front and sets the
/// transaction's gas limit and priority.
///
/// The summed gas wanted is bounded by the block gas limit before any
/// balance is touched. On recheck nothing is charged and the meter limit
/// is zero, since the fees were taken when the transaction first entered
/// the mempool.
pub struct EthGasConsume {
    keepers: Keepers,
    policy: Arc<ChainPolicy>,
}

impl EthGasConsume {
    pub fn new(keepers: Keepers, policy: Arc<ChainPolicy>) -> Self {
        Self { keepers, policy }
    }

    fn gas_wanted(&self, ctx: &Context, tx: &Tx) -> u64 {
        let max_gas_wanted = self.policy.max_gas_wanted;
        let cap = ctx.is_check_tx() && max_gas_wanted != 0;
        tx.ethereum_msgs()
            .map(|msg| {
                let gas = msg.data().gas_limit();
                if cap {
                    gas.min(max_gas_wanted)
                } else {
                    gas
                }
            })
            .fold(0u64, u64::saturating_add)
    }
}

impl AnteDecorator for EthGasConsume {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if ctx.is_recheck_tx() {
            let ctx = ctx.with_gas_meter(GasMeter::infinite_with_limit(0));
            return next.run(ctx, tx, simulate);
        }

        let gas_wanted = self.gas_wanted(&ctx, tx);
        let block_limit = ctx.block_gas_limit();
        if gas_wanted > block_limit {
            return Err(ante_err!(
                OutOfGas,
                "tx gas ({gas_wanted}) exceeds block gas limit ({block_limit})"
            ));
        }

        let forks = &self.policy.forks;
        let homestead = forks.is_homestead(ctx.height);
        let istanbul = forks.is_istanbul(ctx.height);
        let base_fee = block_base_fee(self.keepers.evm.as_ref(), &self.policy, ctx.height);
        let is_check_tx = ctx.is_check_tx();
        let deductor = FeeDeductor::new(&self.keepers);
        let mut min_priority = i64::MAX;

        for msg in tx.ethereum_msgs() {
            let data = msg.data();
            let fees = verify_fee(
                data,
                &self.policy.evm_denom,
                base_fee,
                homestead,
                istanbul,
                is_check_tx,
            )
            .map_err(|err| err.wrap("failed to verify the fees"))?;

            let from = verified_sender(msg)?;
            deductor.deduct(&mut ctx, from, &fees).map_err(|err| {
                err.wrap(format!(
                    "failed to deduct full gas cost {fees} from the user {from} balance"
                ))
            })?;

            ctx.emit_event(Event::new(EVENT_TYPE_TX).with_attribute(ATTRIBUTE_KEY_FEE, &fees));
            min_priority = min_priority.min(data.priority(base_fee));
        }

        debug!(gas_wanted, priority = min_priority, "charged ethereum gas");
        let ctx = ctx
            .with_gas_meter(GasMeter::infinite_with_limit(gas_wanted))
            .with_priority(min_priority);
        next.run(ctx, tx, simulate)
    }
}
