use std::sync::Arc;

use tollgate_core::events::{ATTRIBUTE_KEY_FEE, ATTRIBUTE_KEY_FEE_PAYER, EVENT_TYPE_TX};
use tollgate_core::{ante_err, AnteResult, Coins, Event};
use tollgate_tx::Tx;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::fees::{FeeDeductor, TxFeeChecker};
use crate::keepers::{Keepers, FEE_COLLECTOR};

/// Deducts the native transaction fee from the fee payer, or from the fee
/// granter when one is set and has authorized the payer.
pub struct DeductFee {
    keepers: Keepers,
    checker: Arc<dyn TxFeeChecker>,
}

impl DeductFee {
    pub fn new(keepers: Keepers, checker: Arc<dyn TxFeeChecker>) -> Self {
        Self { keepers, checker }
    }

    fn check_and_deduct(&self, ctx: &mut Context, tx: &Tx, fee: &Coins) -> AnteResult<()> {
        let Some(payer) = tx.fee_payer() else {
            return Err(ante_err!(InvalidRequest, "tx has no fee payer"));
        };

        if self.keepers.account.module_address(FEE_COLLECTOR).is_none() {
            return Err(ante_err!(
                Internal,
                "{FEE_COLLECTOR} module account has not been set"
            ));
        }

        let mut deduct_from = payer;
        if let Some(granter) = tx.fee_granter() {
            let Some(fee_grant) = &self.keepers.fee_grant else {
                return Err(ante_err!(InvalidRequest, "fee grants are not enabled"));
            };
            if granter != payer {
                fee_grant
                    .use_granted_fees(granter, payer, fee, tx.messages())
                    .map_err(|err| {
                        ante_err!(
                            InvalidSigner,
                            "{granter} does not allow to pay fees for {payer}: {err}"
                        )
                    })?;
            }
            deduct_from = granter;
        }

        if self.keepers.account.get_account(deduct_from).is_none() {
            return Err(ante_err!(
                UnknownAddress,
                "fee payer address: {deduct_from} does not exist"
            ));
        }

        if !fee.is_zero() {
            FeeDeductor::new(&self.keepers).deduct(ctx, deduct_from, fee)?;
        }

        ctx.emit_event(
            Event::new(EVENT_TYPE_TX)
                .with_attribute(ATTRIBUTE_KEY_FEE, fee)
                .with_attribute(ATTRIBUTE_KEY_FEE_PAYER, deduct_from),
        );
        Ok(())
    }
}

impl AnteDecorator for DeductFee {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !simulate && !ctx.is_genesis() && tx.gas() == 0 {
            return Err(ante_err!(InvalidGasLimit, "must provide positive gas"));
        }

        let (fee, priority) = if simulate {
            (tx.fee().clone(), 0)
        } else {
            self.checker.check_tx_fee(&ctx, tx)?
        };

        self.check_and_deduct(&mut ctx, tx, &fee)?;
        let ctx = ctx.with_priority(priority);
        next.run(ctx, tx, simulate)
    }
}
