use std::sync::Arc;

use tollgate_core::events::{ATTRIBUTE_KEY_ETH_TX_HASH, ATTRIBUTE_KEY_TX_INDEX, EVENT_TYPE_ETHEREUM_TX};
use tollgate_core::{ante_err, AnteResult, Event};
use tollgate_tx::Tx;
use tollgate_tx_eth::MSG_ETHEREUM_TX_TYPE_URL;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::gas::GasMeter;
use crate::keepers::EvmKeeper;

/// Only Ethereum messages may ride in an Ethereum-tagged transaction.
pub struct RejectNativeMessages;

impl AnteDecorator for RejectNativeMessages {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if let Some(msg) = tx.messages().iter().find(|msg| msg.as_ethereum().is_none()) {
            return Err(ante_err!(
                InvalidTxType,
                "invalid message type {}, expected {MSG_ETHEREUM_TX_TYPE_URL}",
                msg.type_url()
            ));
        }
        next.run(ctx, tx, simulate)
    }
}

/// Installs an infinite gas meter and resets the block's transient gas
/// used. Gas is accounted by the EVM during execution instead.
pub struct EthSetUpContext {
    evm: Arc<dyn EvmKeeper>,
}

impl EthSetUpContext {
    pub fn new(evm: Arc<dyn EvmKeeper>) -> Self {
        Self { evm }
    }
}

impl AnteDecorator for EthSetUpContext {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let ctx = ctx.with_gas_meter(GasMeter::infinite());
        self.evm.reset_transient_gas_used();
        next.run(ctx, tx, simulate)
    }
}

/// Emits one `ethereum_tx` event per message with its hash and block index.
pub struct EthEmitEvent {
    evm: Arc<dyn EvmKeeper>,
}

impl EthEmitEvent {
    pub fn new(evm: Arc<dyn EvmKeeper>) -> Self {
        Self { evm }
    }
}

impl AnteDecorator for EthEmitEvent {
    fn ante_handle(
        &self,
        mut ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        let tx_index = self.evm.tx_index_transient();
        for (i, msg) in tx.ethereum_msgs().enumerate() {
            ctx.emit_event(
                Event::new(EVENT_TYPE_ETHEREUM_TX)
                    .with_attribute(ATTRIBUTE_KEY_ETH_TX_HASH, msg.hash())
                    .with_attribute(ATTRIBUTE_KEY_TX_INDEX, tx_index.saturating_add(i as u64)),
            );
        }
        next.run(ctx, tx, simulate)
    }
}
