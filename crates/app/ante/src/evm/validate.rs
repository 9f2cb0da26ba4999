use std::sync::Arc;

use alloy_primitives::U256;
use tollgate_core::{ante_err, AnteResult, Coins};
use tollgate_tx::Tx;
use tollgate_tx_eth::{tx_type, TypedTransaction};

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::EvmKeeper;
use crate::policy::ChainPolicy;

use super::block_base_fee;

/// Stateless checks of an Ethereum-tagged envelope and its messages.
///
/// The envelope must carry nothing but the messages, a single extension
/// option and a fee equal to the sum over its messages. Skipped on recheck.
pub struct EthValidateBasic {
    evm: Arc<dyn EvmKeeper>,
    policy: Arc<ChainPolicy>,
}

impl EthValidateBasic {
    pub fn new(evm: Arc<dyn EvmKeeper>, policy: Arc<ChainPolicy>) -> Self {
        Self { evm, policy }
    }

    fn validate_envelope(tx: &Tx) -> AnteResult<()> {
        if tx.messages().is_empty() {
            return Err(ante_err!(InvalidRequest, "empty messages"));
        }
        let body = &tx.body;
        if !body.memo.is_empty()
            || body.timeout_height != 0
            || !body.non_critical_extension_options.is_empty()
        {
            return Err(ante_err!(
                InvalidRequest,
                "for eth tx body Memo TimeoutHeight NonCriticalExtensionOptions should be empty"
            ));
        }
        if body.extension_options.len() != 1 {
            return Err(ante_err!(
                InvalidRequest,
                "for eth tx length of ExtensionOptions should be 1"
            ));
        }
        if !tx.auth_info.signer_infos.is_empty() {
            return Err(ante_err!(
                InvalidRequest,
                "for eth tx AuthInfo SignerInfos should be empty"
            ));
        }
        if tx.auth_info.fee.payer.is_some() || tx.auth_info.fee.granter.is_some() {
            return Err(ante_err!(
                InvalidRequest,
                "for eth tx AuthInfo Fee payer and granter should be empty"
            ));
        }
        if !tx.signatures.is_empty() {
            return Err(ante_err!(InvalidRequest, "for eth tx Signatures should be empty"));
        }
        Ok(())
    }
}

impl AnteDecorator for EthValidateBasic {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if ctx.is_recheck_tx() {
            return next.run(ctx, tx, simulate);
        }

        Self::validate_envelope(tx)?;

        let base_fee = block_base_fee(self.evm.as_ref(), &self.policy, ctx.height);
        let access = &self.policy.access_control;
        let mut total_fee = U256::ZERO;
        let mut total_gas = 0u64;

        for msg in tx.ethereum_msgs() {
            if let Some(from) = msg.from() {
                return Err(ante_err!(
                    InvalidRequest,
                    "invalid from address; expected nil; got: {from}"
                ));
            }
            let data = msg.data();
            data.validate()
                .map_err(|err| err.wrap("tx basic validation failed"))?;

            if data.is_contract_creation() {
                if !access.enable_create {
                    return Err(ante_err!(CreateDisabled, "failed to create new contract"));
                }
            } else if !access.enable_call {
                return Err(ante_err!(CallDisabled, "failed to perform a call"));
            }

            if base_fee.is_none() && data.tx_type() == tx_type::EIP1559 {
                return Err(ante_err!(TxTypeNotSupported, "dynamic fee tx not supported"));
            }

            total_fee = total_fee.saturating_add(data.fee());
            total_gas = total_gas.saturating_add(data.gas_limit());
        }

        let expected_fee = Coins::single(self.policy.evm_denom.clone(), total_fee);
        if tx.fee() != &expected_fee {
            return Err(ante_err!(
                InvalidRequest,
                "invalid AuthInfo Fee Amount ({} != {expected_fee})",
                tx.fee()
            ));
        }
        if tx.gas() != total_gas {
            return Err(ante_err!(
                InvalidRequest,
                "invalid AuthInfo Fee GasLimit ({} != {total_gas})",
                tx.gas()
            ));
        }

        next.run(ctx, tx, simulate)
    }
}
