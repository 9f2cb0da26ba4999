//! Chain selection and assembly.

use std::sync::Arc;

use tollgate_core::{ante_err, AnteResult};
use tollgate_tx::{ExtensionOption, Tx};
use tracing::debug;

use crate::authz::AuthzLimiter;
use crate::context::Context;
use crate::cosmos::{
    ConsumeTxSizeGas, DeductFee, ExtensionOptions, GasWanted, IncrementSequence,
    LegacyEip712SigVerification, MinGasPrice, RedundantRelay, RejectMessages, SetPubKey,
    SetUpContext, SigGasConsume, SigVerification, TxTimeoutHeight, ValidateBasic, ValidateMemo,
    ValidateSigCount,
};
use crate::decorator::{AnteChain, AnteDecorator};
use crate::evm::{
    CanTransfer, EthAccountVerification, EthEmitEvent, EthGasConsume, EthIncrementSenderSequence,
    EthMempoolFee, EthMinGasPrice, EthSetUpContext, EthSigVerification, EthValidateBasic,
    EthVesting, RejectNativeMessages,
};
use crate::fees::{DynamicFeeChecker, TxFeeChecker};
use crate::keepers::Keepers;
use crate::policy::ChainPolicy;

/// Everything the handler's chains are built from.
#[derive(Clone)]
pub struct HandlerOptions {
    pub keepers: Keepers,
    pub policy: Arc<ChainPolicy>,
    /// Fee checker of the native chains; [`DynamicFeeChecker`] when unset.
    pub fee_checker: Option<Arc<dyn TxFeeChecker>>,
}

impl HandlerOptions {
    pub fn new(keepers: Keepers, policy: ChainPolicy) -> Self {
        Self {
            keepers,
            policy: Arc::new(policy),
            fee_checker: None,
        }
    }

    pub fn with_fee_checker(mut self, checker: Arc<dyn TxFeeChecker>) -> Self {
        self.fee_checker = Some(checker);
        self
    }
}

/// Which chain a transaction runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxFamily {
    Native,
    Ethereum,
    LegacyEip712,
}

impl TxFamily {
    /// Classify by the first extension option.
    pub fn of(tx: &Tx) -> AnteResult<Self> {
        match tx.body.extension_options.first() {
            None | Some(ExtensionOption::DynamicFeeTx { .. }) => Ok(Self::Native),
            Some(ExtensionOption::EthereumTx) => Ok(Self::Ethereum),
            Some(ExtensionOption::Web3Tx(_)) => Ok(Self::LegacyEip712),
            Some(ExtensionOption::Unknown(type_url)) => Err(ante_err!(
                UnknownExtensionOptions,
                "rejecting tx with unsupported extension option: {type_url}"
            )),
        }
    }
}

/// The admission pipeline: three fixed decorator chains and the rule
/// choosing between them.
pub struct AnteHandler {
    native: AnteChain,
    ethereum: AnteChain,
    legacy_eip712: AnteChain,
}

impl AnteHandler {
    /// Build every chain. Fails when the policy is inconsistent.
    pub fn new(options: HandlerOptions) -> AnteResult<Self> {
        options.policy.validate().map_err(|errors| {
            ante_err!(Internal, "invalid chain policy: {}", errors.join("; "))
        })?;

        let checker = options.fee_checker.clone().unwrap_or_else(|| {
            Arc::new(DynamicFeeChecker::new(
                options.keepers.evm.clone(),
                options.policy.clone(),
            ))
        });

        Ok(Self {
            native: AnteChain::new("native", native_decorators(&options, checker.clone(), false)),
            ethereum: AnteChain::new("ethereum", ethereum_decorators(&options)),
            legacy_eip712: AnteChain::new(
                "legacy_eip712",
                native_decorators(&options, checker, true),
            ),
        })
    }

    pub fn chain(&self, family: TxFamily) -> &AnteChain {
        match family {
            TxFamily::Native => &self.native,
            TxFamily::Ethereum => &self.ethereum,
            TxFamily::LegacyEip712 => &self.legacy_eip712,
        }
    }

    /// Admit `tx`, returning the context the execution layer continues
    /// with. The first rejecting decorator aborts the chain.
    pub fn handle(&self, ctx: Context, tx: &mut Tx, simulate: bool) -> AnteResult<Context> {
        let chain = self.chain(TxFamily::of(tx)?);
        debug!(chain = chain.name(), mode = ?ctx.mode, simulate, "running ante chain");
        chain.run(ctx, tx, simulate).inspect_err(|err| {
            debug!(chain = chain.name(), %err, "transaction rejected");
        })
    }
}

fn native_decorators(
    options: &HandlerOptions,
    checker: Arc<dyn TxFeeChecker>,
    legacy_eip712: bool,
) -> Vec<Box<dyn AnteDecorator>> {
    let keepers = &options.keepers;
    let policy = &options.policy;

    let mut decorators: Vec<Box<dyn AnteDecorator>> = vec![
        Box::new(RejectMessages),
        Box::new(AuthzLimiter::default()),
        Box::new(SetUpContext),
    ];
    if !legacy_eip712 {
        decorators.push(Box::new(ExtensionOptions));
    }
    decorators.extend([
        Box::new(ValidateBasic) as Box<dyn AnteDecorator>,
        Box::new(TxTimeoutHeight),
        Box::new(ValidateMemo::new(policy.clone())),
        Box::new(MinGasPrice::new(policy.clone())),
        Box::new(ConsumeTxSizeGas::new(policy.clone())),
        Box::new(DeductFee::new(keepers.clone(), checker)),
        Box::new(SetPubKey::new(keepers.account.clone())),
        Box::new(ValidateSigCount::new(policy.clone())),
        Box::new(SigGasConsume::new(keepers.account.clone(), policy.clone())),
    ]);
    if legacy_eip712 {
        decorators.push(Box::new(LegacyEip712SigVerification::new(keepers.account.clone())));
    } else {
        decorators.push(Box::new(SigVerification::new(keepers.account.clone())));
    }
    decorators.extend([
        Box::new(IncrementSequence::new(keepers.account.clone())) as Box<dyn AnteDecorator>,
        Box::new(RedundantRelay::new(keepers.ibc.clone())),
        Box::new(GasWanted::new(keepers.fee_market.clone(), policy.clone())),
    ]);
    decorators
}

fn ethereum_decorators(options: &HandlerOptions) -> Vec<Box<dyn AnteDecorator>> {
    let keepers = &options.keepers;
    let policy = &options.policy;
    vec![
        Box::new(RejectNativeMessages),
        Box::new(AuthzLimiter::default()),
        Box::new(EthSetUpContext::new(keepers.evm.clone())),
        Box::new(EthValidateBasic::new(keepers.evm.clone(), policy.clone())),
        Box::new(EthMinGasPrice::new(keepers.evm.clone(), policy.clone())),
        Box::new(EthMempoolFee::new(keepers.evm.clone(), policy.clone())),
        Box::new(EthSigVerification::new(keepers.evm.clone(), policy.clone())),
        Box::new(EthAccountVerification::new(
            keepers.account.clone(),
            keepers.evm.clone(),
        )),
        Box::new(EthGasConsume::new(keepers.clone(), policy.clone())),
        Box::new(EthVesting::new(
            keepers.account.clone(),
            keepers.bank.clone(),
            policy.clone(),
        )),
        Box::new(CanTransfer::new(keepers.evm.clone(), policy.clone())),
        Box::new(EthIncrementSenderSequence::new(keepers.account.clone())),
        Box::new(EthEmitEvent::new(keepers.evm.clone())),
    ]
}
