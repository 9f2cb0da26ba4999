use std::sync::Arc;

use tollgate_core::{ante_err, AnteResult};
use tollgate_tx::{Message, NativeMsg, Tx};
use tracing::debug;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::IbcKeeper;

/// Drops relayer transactions whose packets were all relayed already.
///
/// Runs only in check mode and never while simulating. Any message other
/// than a packet or client update hands the transaction straight to the
/// next decorator.
pub struct RedundantRelay {
    ibc: Arc<dyn IbcKeeper>,
}

impl RedundantRelay {
    pub fn new(ibc: Arc<dyn IbcKeeper>) -> Self {
        Self { ibc }
    }
}

impl AnteDecorator for RedundantRelay {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !ctx.is_check_tx() || simulate {
            return next.run(ctx, tx, simulate);
        }

        let mut packets = 0usize;
        let mut redundancies = 0usize;
        for msg in tx.messages() {
            match msg {
                Message::Native(NativeMsg::Packet { kind, packet, .. }) => {
                    packets += 1;
                    if self.ibc.packet_redundant(*kind, packet)? {
                        redundancies += 1;
                    }
                }
                Message::Native(NativeMsg::UpdateClient { client_id, .. }) => {
                    self.ibc.check_update_client(client_id)?;
                }
                _ => return next.run(ctx, tx, simulate),
            }
        }

        if packets > 0 && redundancies == packets {
            debug!(packets, "rejecting fully redundant relay");
            return Err(ante_err!(RedundantTx, "packet messages are redundant"));
        }
        next.run(ctx, tx, simulate)
    }
}
